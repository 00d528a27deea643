mod config;
mod csrf;
mod db;
mod entities;
mod error;
mod models;
mod ranking;
mod routes;
mod store;
mod templates;
mod tmdb;

use std::{sync::Arc, time::Duration};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use tower_http::trace::TraceLayer;

use crate::{
    config::Config,
    store::{DbMovieStore, MovieStore},
    tmdb::TmdbClient,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MovieStore>,
    pub tmdb: Arc<TmdbClient>,
    pub cookie_key: Key,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,topmovies=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Config::from_env()?;

    let http = reqwest::Client::builder()
        .user_agent("topmovies/0.1")
        .timeout(Duration::from_secs(30))
        .build()?;

    let db = db::connect_and_migrate(config.database_url.as_str()).await?;

    let tmdb = TmdbClient::new(
        http,
        config.tmdb_api_key.clone(),
        config.tmdb_base_url.clone(),
        config.tmdb_image_base_url.clone(),
        config.tmdb_language.clone(),
        config.tmdb_rps,
    );

    let state = AppState {
        store: Arc::new(DbMovieStore::new(db)),
        tmdb: Arc::new(tmdb),
        cookie_key: csrf::signing_key(&config.secret_key),
    };

    let app = routes::router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
