use std::num::NonZeroU32;

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{NewMovie, SearchCandidate},
};

pub struct TmdbClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    image_base_url: String,
    language: String,
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl TmdbClient {
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        base_url: String,
        image_base_url: String,
        language: String,
        rps: u32,
    ) -> Self {
        if api_key.trim().is_empty() {
            tracing::warn!("no TMDB_API_KEY provided, movie database requests will be rejected");
        }

        let limiter =
            RateLimiter::direct(Quota::per_second(NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN)));
        Self { client, api_key, base_url, image_base_url, language, limiter }
    }

    /// Searches the movie database by title.
    pub async fn search(&self, title: &str) -> AppResult<Vec<SearchCandidate>> {
        let resp: SearchResponse = self
            .get("search/movie", &[("query", title)])
            .await?
            .json()
            .await?;

        tracing::debug!(query = %title, hits = resp.results.len(), "tmdb search");
        Ok(resp.results)
    }

    /// Fetches one movie by its TMDB id and shapes it into an unrated list entry.
    pub async fn fetch_detail(&self, tmdb_id: i32) -> AppResult<NewMovie> {
        let body = self.get(&format!("movie/{tmdb_id}"), &[]).await?.text().await?;
        let detail: MovieDetail = serde_json::from_str(&body)
            .map_err(|e| AppError::Upstream(format!("malformed movie detail: {e}")))?;

        self.to_new_movie(detail)
    }

    fn to_new_movie(&self, detail: MovieDetail) -> AppResult<NewMovie> {
        let title = detail.title.ok_or_else(|| missing("title"))?;
        let release_date = detail.release_date.ok_or_else(|| missing("release_date"))?;
        let description = detail.overview.ok_or_else(|| missing("overview"))?;
        let poster_path = detail.poster_path.ok_or_else(|| missing("poster_path"))?;

        let year = release_year(&release_date).ok_or_else(|| {
            AppError::Data(format!("release_date {release_date:?} does not start with a year"))
        })?;

        Ok(NewMovie {
            title,
            year,
            description,
            poster_url: format!("{}{}", self.image_base_url, poster_path),
        })
    }

    async fn get(&self, path: &str, params: &[(&str, &str)]) -> AppResult<reqwest::Response> {
        self.limiter.until_ready().await;

        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        tracing::debug!(path, "tmdb request");

        let resp = self
            .client
            .get(url)
            .query(&[("api_key", self.api_key.as_str()), ("language", self.language.as_str())])
            .query(params)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp)
    }
}

/// The leading `YYYY` of a `YYYY-MM-DD` date.
fn release_year(date: &str) -> Option<i32> {
    let year = date.split('-').next()?;
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    year.parse().ok()
}

fn missing(field: &str) -> AppError {
    AppError::Data(format!("movie detail has no {field}"))
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchCandidate>,
}

#[derive(Debug, Deserialize)]
struct MovieDetail {
    title: Option<String>,
    release_date: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
}

#[cfg(test)]
pub(crate) const TEST_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";

#[cfg(test)]
pub(crate) fn test_client(base_url: String) -> TmdbClient {
    TmdbClient::new(
        reqwest::Client::new(),
        "test-key".to_string(),
        base_url,
        TEST_IMAGE_BASE.to_string(),
        "en-US".to_string(),
        100,
    )
}
