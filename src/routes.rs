use axum::{
    Router,
    extract::{Form, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::SignedCookieJar;

use crate::{
    AppState, csrf,
    error::AppResult,
    models::{AddForm, IdQuery, RateForm},
    ranking, templates,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/add", get(add_form).post(add_search))
        .route("/find", get(find).post(find))
        .route("/edit", get(edit_form).post(edit_submit))
        .route("/delete", get(delete).post(delete))
        .with_state(state)
}

/// Ranks the whole list, persists the ranks and renders it.
pub async fn index(State(state): State<AppState>) -> AppResult<Html<String>> {
    let mut movies = state.store.list().await?;
    ranking::assign_ranks(&mut movies);
    state.store.save_ranks(&movies).await?;
    tracing::debug!(count = movies.len(), "list ranked");

    Ok(Html(templates::index_page(&movies)))
}

pub async fn add_form(jar: SignedCookieJar) -> (SignedCookieJar, Html<String>) {
    let (jar, token) = csrf::issue(jar);
    (jar, Html(templates::add_page(&token, "", None)))
}

pub async fn add_search(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<AddForm>,
) -> AppResult<Response> {
    csrf::verify(&jar, &form.csrf_token)?;

    let title = form.title.trim();
    if title.is_empty() {
        let body = templates::add_page(&form.csrf_token, "", Some("title is required"));
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(body)).into_response());
    }

    let candidates = state.tmdb.search(title).await?;
    Ok(Html(templates::select_page(title, &candidates)).into_response())
}

/// Pulls the chosen movie from TMDB, stores it unrated and sends the user on
/// to rate it.
pub async fn find(
    State(state): State<AppState>,
    Query(q): Query<IdQuery>,
) -> AppResult<Redirect> {
    let tmdb_id = q.require()?;
    let new = state.tmdb.fetch_detail(tmdb_id).await?;
    let movie = state.store.insert(new).await?;
    tracing::info!(id = movie.id, tmdb_id, title = %movie.title, "movie added");

    Ok(Redirect::to(&format!("/edit?id={}", movie.id)))
}

pub async fn edit_form(
    State(state): State<AppState>,
    Query(q): Query<IdQuery>,
    jar: SignedCookieJar,
) -> AppResult<(SignedCookieJar, Html<String>)> {
    let movie = state.store.get(q.require()?).await?;
    let (jar, token) = csrf::issue(jar);
    Ok((jar, Html(templates::edit_page(&movie, &token))))
}

pub async fn edit_submit(
    State(state): State<AppState>,
    Query(q): Query<IdQuery>,
    jar: SignedCookieJar,
    Form(form): Form<RateForm>,
) -> AppResult<Redirect> {
    csrf::verify(&jar, &form.csrf_token)?;

    let mut movie = state.store.get(q.require()?).await?;
    let rating = form.validate()?;
    movie.rating = Some(rating.rating);
    movie.review = rating.review;
    state.store.update(&movie).await?;
    tracing::info!(id = movie.id, rating = rating.rating, "movie rated");

    Ok(Redirect::to("/"))
}

pub async fn delete(
    State(state): State<AppState>,
    Query(q): Query<IdQuery>,
) -> AppResult<Redirect> {
    let movie = state.store.get(q.require()?).await?;
    state.store.delete(movie.id).await?;
    tracing::info!(id = movie.id, title = %movie.title, "movie deleted");

    Ok(Redirect::to("/"))
}
