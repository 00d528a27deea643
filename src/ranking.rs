use std::cmp::Ordering;

use crate::models::Movie;

/// Sorts `movies` by rating ascending and assigns `rank = len - position`,
/// so the best-rated movie gets rank 1.
///
/// Unrated movies sort below every rated one. The sort is stable, so equal
/// ratings keep their incoming order.
pub fn assign_ranks(movies: &mut [Movie]) {
    movies.sort_by(|a, b| compare_ratings(a.rating, b.rating));

    let total = movies.len() as i32;
    for (i, movie) in movies.iter_mut().enumerate() {
        movie.rank = Some(total - i as i32);
    }
}

fn compare_ratings(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
