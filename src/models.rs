use serde::Deserialize;

use crate::{
    entities::movie,
    error::{AppError, AppResult},
};

/// Longest review the list accepts.
pub const MAX_REVIEW_LEN: usize = 250;

/// A movie on the list.
///
/// `rank` is derived by the ranking pass on every list view and is stale in
/// between.
#[derive(Clone, Debug, PartialEq)]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub year: i32,
    pub description: String,
    pub rating: Option<f64>,
    pub rank: Option<i32>,
    pub review: Option<String>,
    pub poster_url: String,
}

impl From<movie::Model> for Movie {
    fn from(m: movie::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            year: m.year,
            description: m.description,
            rating: m.rating,
            rank: m.ranking,
            review: m.review,
            poster_url: m.poster_url,
        }
    }
}

/// A movie that has not been stored yet. Rating, review and rank start unset.
#[derive(Clone, Debug, PartialEq)]
pub struct NewMovie {
    pub title: String,
    pub year: i32,
    pub description: String,
    pub poster_url: String,
}

/// One hit from a title search against the movie database.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SearchCandidate {
    pub id: i32,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IdQuery {
    pub id: Option<i32>,
}

impl IdQuery {
    pub fn require(&self) -> AppResult<i32> {
        self.id.ok_or_else(|| AppError::Validation("a movie id is required".to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct AddForm {
    #[serde(default)]
    pub csrf_token: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct RateForm {
    #[serde(default)]
    pub csrf_token: String,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub review: String,
}

/// A validated rating submission.
#[derive(Clone, Debug, PartialEq)]
pub struct Rating {
    pub rating: f64,
    pub review: Option<String>,
}

impl RateForm {
    pub fn validate(&self) -> AppResult<Rating> {
        let raw = self.rating.trim();
        let rating: f64 = raw
            .parse()
            .map_err(|_| AppError::Validation(format!("rating must be a number, got {raw:?}")))?;
        if !rating.is_finite() || !(0.0..=10.0).contains(&rating) {
            return Err(AppError::Validation(format!(
                "rating must be between 0 and 10, got {rating}"
            )));
        }

        let review = self.review.trim();
        if review.chars().count() > MAX_REVIEW_LEN {
            return Err(AppError::Validation(format!(
                "review must be at most {MAX_REVIEW_LEN} characters"
            )));
        }

        Ok(Rating { rating, review: (!review.is_empty()).then(|| review.to_string()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(rating: &str, review: &str) -> RateForm {
        RateForm {
            csrf_token: String::new(),
            rating: rating.to_string(),
            review: review.to_string(),
        }
    }

    #[test]
    fn rating_must_be_numeric() {
        let err = form("abc", "").validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn empty_rating_is_rejected() {
        assert!(matches!(form("  ", "nice").validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn rating_range_is_enforced() {
        assert!(matches!(form("10.5", "").validate(), Err(AppError::Validation(_))));
        assert!(matches!(form("-1", "").validate(), Err(AppError::Validation(_))));
        assert!(matches!(form("NaN", "").validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn review_is_trimmed_and_blank_means_none() {
        let r = form(" 7.5 ", "  great  ").validate().unwrap();
        assert_eq!(r, Rating { rating: 7.5, review: Some("great".to_string()) });

        let r = form("8", "   ").validate().unwrap();
        assert_eq!(r.review, None);
    }

    #[test]
    fn overlong_review_is_rejected() {
        let long = "x".repeat(MAX_REVIEW_LEN + 1);
        assert!(matches!(form("5", &long).validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn missing_id_is_a_validation_error() {
        assert!(matches!(IdQuery::default().require(), Err(AppError::Validation(_))));
        assert_eq!(IdQuery { id: Some(4) }.require().unwrap(), 4);
    }
}
