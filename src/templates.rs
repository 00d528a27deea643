use axum::http::StatusCode;
use maud::{DOCTYPE, Markup, html};

use crate::models::{Movie, SearchCandidate};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

const BUTTON: &str =
    "inline-block rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700";
const INPUT: &str = "mt-2 w-full rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500";

/// The ranked list. `movies` must already be ranked; rank 1 is shown first.
pub fn index_page(movies: &[Movie]) -> String {
    let mut ordered: Vec<&Movie> = movies.iter().collect();
    ordered.sort_by_key(|m| m.rank.unwrap_or(i32::MAX));

    page(
        "My Top Movies",
        html! {
            div class="max-w-4xl mx-auto px-6 py-12" {
                div class="flex items-center justify-between" {
                    h1 class="text-3xl font-bold text-gray-900" { "My Top Movies" }
                    a class=(BUTTON) href="/add" { "Add Movie" }
                }

                @if ordered.is_empty() {
                    div class="mt-10 bg-white shadow rounded-lg p-8" {
                        p class="text-gray-600" { "No movies yet. Add one to start your list." }
                    }
                } @else {
                    div class="mt-10 space-y-4" {
                        @for movie in ordered {
                            (movie_card(movie))
                        }
                    }
                }
            }
        },
    )
}

pub fn add_page(csrf_token: &str, title: &str, error: Option<&str>) -> String {
    page(
        "Add Movie",
        card(html! {
            h1 class="text-2xl font-bold text-gray-900" { "Add Movie" }
            @if let Some(error) = error {
                p class="mt-4 text-sm text-red-600" { (error) }
            }
            form class="mt-6 space-y-6" method="post" action="/add" {
                input type="hidden" name="csrf_token" value=(csrf_token);
                div {
                    label class="block text-sm font-medium text-gray-700" for="title" { "Movie Title" }
                    input class=(INPUT) name="title" id="title" value=(title) required;
                }
                button class=(BUTTON) type="submit" { "Search" }
            }
        }),
    )
}

pub fn select_page(query: &str, candidates: &[SearchCandidate]) -> String {
    page(
        "Select Movie",
        card(html! {
            h1 class="text-2xl font-bold text-gray-900" { "Select Movie" }
            p class="mt-2 text-gray-600" { "Results for \"" (query) "\"" }
            @if candidates.is_empty() {
                p class="mt-6 text-gray-600" { "Nothing matched that title." }
            } @else {
                ul class="mt-6 divide-y divide-gray-200" {
                    @for c in candidates {
                        li class="py-3" {
                            a class="text-blue-600 hover:text-blue-800" href=(format!("/find?id={}", c.id)) {
                                (c.title)
                                @if let Some(date) = c.release_date.as_deref().filter(|d| !d.is_empty()) {
                                    span class="ml-2 text-gray-500" { "(" (date) ")" }
                                }
                            }
                        }
                    }
                }
            }
            a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/add" { "Search again" }
        }),
    )
}

pub fn edit_page(movie: &Movie, csrf_token: &str) -> String {
    let rating = movie.rating.map(|r| r.to_string()).unwrap_or_default();
    let review = movie.review.clone().unwrap_or_default();

    page(
        "Rate Movie",
        card(html! {
            h1 class="text-2xl font-bold text-gray-900" { (movie.title) }
            p class="mt-2 text-gray-600" { "Edit movie rating" }
            form class="mt-6 space-y-6" method="post" action=(format!("/edit?id={}", movie.id)) {
                input type="hidden" name="csrf_token" value=(csrf_token);
                div {
                    label class="block text-sm font-medium text-gray-700" for="rating" { "Your Rating Out of 10 e.g. 7.5" }
                    input class=(INPUT) name="rating" id="rating" value=(rating);
                }
                div {
                    label class="block text-sm font-medium text-gray-700" for="review" { "Your Review" }
                    input class=(INPUT) name="review" id="review" value=(review);
                }
                button class=(BUTTON) type="submit" { "Done" }
            }
        }),
    )
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    page(
        "Error",
        card(html! {
            h1 class="text-2xl font-bold text-gray-900" { "Error " (status.as_u16()) }
            p class="mt-4 text-gray-700" { (message) }
            a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
        }),
    )
}

fn page(title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
            }
            body class="min-h-screen bg-gray-50" { (body) }
        }
    }
    .into_string()
}

fn card(inner: Markup) -> Markup {
    html! {
        div class="max-w-xl mx-auto px-6 py-12" {
            div class="bg-white shadow rounded-lg p-8" { (inner) }
        }
    }
}

fn movie_card(movie: &Movie) -> Markup {
    html! {
        div class="bg-white shadow rounded-lg p-6 flex gap-6" {
            img class="w-32 rounded" src=(movie.poster_url) alt=(movie.title);
            div class="flex-1" {
                div class="flex items-start justify-between gap-4" {
                    h2 class="text-xl font-semibold text-gray-900" {
                        @if let Some(rank) = movie.rank {
                            span class="mr-2 text-gray-400" { "#" (rank) }
                        }
                        (movie.title)
                        span class="ml-2 font-normal text-gray-500" { "(" (movie.year) ")" }
                    }
                    span class="text-lg font-semibold text-gray-700" {
                        @match movie.rating {
                            Some(rating) => { (rating) " / 10" },
                            None => "Not rated",
                        }
                    }
                }
                @if let Some(review) = &movie.review {
                    p class="mt-2 italic text-gray-700" { "\u{201c}" (review) "\u{201d}" }
                }
                p class="mt-2 text-sm text-gray-600" { (movie.description) }
                div class="mt-4 flex gap-4 text-sm" {
                    a class="text-blue-600 hover:text-blue-800" href=(format!("/edit?id={}", movie.id)) { "Update" }
                    a class="text-red-600 hover:text-red-800" href=(format!("/delete?id={}", movie.id)) { "Delete" }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: i32, title: &str, rating: Option<f64>, rank: Option<i32>) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            year: 1986,
            description: "desc".to_string(),
            rating,
            rank,
            review: None,
            poster_url: "https://img.example/p.jpg".to_string(),
        }
    }

    #[test]
    fn index_lists_rank_one_first() {
        let html = index_page(&[
            movie(1, "Worse", Some(3.0), Some(2)),
            movie(2, "Better", Some(9.0), Some(1)),
        ]);

        let better = html.find("Better").unwrap();
        let worse = html.find("Worse").unwrap();
        assert!(better < worse);
        assert!(html.contains("/edit?id=2"));
        assert!(html.contains("/delete?id=1"));
    }

    #[test]
    fn unrated_movies_say_so() {
        let html = index_page(&[movie(1, "Fresh", None, Some(1))]);
        assert!(html.contains("Not rated"));
    }

    #[test]
    fn titles_are_escaped() {
        let html = index_page(&[movie(1, "<script>", None, None)]);
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn select_links_to_find() {
        let html = select_page(
            "alien",
            &[SearchCandidate {
                id: 348,
                title: "Alien".to_string(),
                release_date: Some("1979-05-25".to_string()),
            }],
        );
        assert!(html.contains("/find?id=348"));
        assert!(html.contains("1979-05-25"));
    }

    #[test]
    fn edit_form_is_prefilled() {
        let mut m = movie(7, "Ran", Some(9.5), None);
        m.review = Some("epic".to_string());

        let html = edit_page(&m, "tok");

        assert!(html.contains(r#"value="9.5""#));
        assert!(html.contains(r#"value="epic""#));
        assert!(html.contains(r#"name="csrf_token" value="tok""#));
        assert!(html.contains("/edit?id=7"));
    }
}
