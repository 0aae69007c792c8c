use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{instrument, warn};

use crate::{
    auth::extractors::MaybeUser,
    catalog::dto::{MediaDetails, MediaKind, MediaSummary, PlayerDescriptor, SearchQuery},
    error::{AppError, AppResult},
    state::AppState,
    watchlist::repo_types::WatchlistEntry,
};

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/search", get(search_page))
        .route("/api/search", get(api_search))
        .route("/movie/:id", get(movie_details))
        .route("/api/movie/:id", get(movie_details))
        .route("/tv/:id", get(tv_details))
        .route("/api/tv/:id", get(tv_details))
        .route("/watch/movie/:id", get(watch_movie))
        .route("/watch/tv/:id/:season/:episode", get(watch_tv))
}

#[derive(Serialize)]
pub struct HomePage {
    pub trending: Vec<MediaSummary>,
    pub top_rated: Vec<MediaSummary>,
    pub hero: Option<MediaSummary>,
    pub watchlist: Vec<WatchlistEntry>,
    pub user: Option<String>,
    pub image_base: String,
}

#[derive(Serialize)]
pub struct DetailsPage {
    pub success: bool,
    pub movie: MediaDetails,
    pub image_base: String,
}

#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> AppResult<Json<HomePage>> {
    let (trending, top_rated) =
        tokio::join!(state.catalog.trending(), state.catalog.top_rated());

    let (watchlist, username) = match user {
        Some(user) => (state.watchlist.list(user.id).await?, Some(user.username)),
        None => (Vec::new(), None),
    };

    Ok(Json(HomePage {
        hero: trending.first().cloned(),
        trending,
        top_rated,
        watchlist,
        user: username,
        image_base: state.config.tmdb.image_base.clone(),
    }))
}

pub async fn search_page(State(state): State<AppState>) -> Json<Value> {
    let trending = state.catalog.trending().await;
    Json(json!({
        "trending": trending,
        "image_base": state.config.tmdb.image_base,
    }))
}

#[instrument(skip(state))]
pub async fn api_search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<Value> {
    let query = params.q.trim();
    if query.is_empty() {
        return Json(json!({ "results": [] }));
    }
    let results = state.catalog.search(query).await;
    Json(json!({
        "results": results,
        "image_base": state.config.tmdb.image_base,
    }))
}

async fn load_details(state: &AppState, kind: MediaKind, id: i64) -> AppResult<MediaDetails> {
    let (details, providers) = tokio::join!(
        state.catalog.details(kind, id),
        state.catalog.watch_providers(kind, id)
    );
    let mut details = details.ok_or_else(|| {
        AppError::NotFound(
            match kind {
                MediaKind::Movie => "Movie not found",
                MediaKind::Tv => "TV series not found",
            }
            .into(),
        )
    })?;
    details.providers = providers;
    Ok(details)
}

#[instrument(skip(state, user))]
pub async fn movie_details(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    MaybeUser(user): MaybeUser,
) -> AppResult<Json<DetailsPage>> {
    let mut movie = load_details(&state, MediaKind::Movie, id).await?;
    if let Some(user) = user {
        movie.in_watchlist = state.watchlist.contains(user.id, id).await?;
    }
    Ok(Json(DetailsPage {
        success: true,
        movie,
        image_base: state.config.tmdb.image_base.clone(),
    }))
}

#[instrument(skip(state))]
pub async fn tv_details(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DetailsPage>> {
    let movie = load_details(&state, MediaKind::Tv, id).await?;
    Ok(Json(DetailsPage {
        success: true,
        movie,
        image_base: state.config.tmdb.image_base.clone(),
    }))
}

#[instrument(skip(state))]
pub async fn watch_movie(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<PlayerDescriptor>> {
    match state.catalog.details(MediaKind::Movie, id).await {
        Some(details) => Ok(Json(PlayerDescriptor::movie(&details))),
        None => {
            warn!(id, "player requested for unknown movie");
            Err(AppError::NotFound("Movie not found".into()))
        }
    }
}

#[instrument(skip(state))]
pub async fn watch_tv(
    State(state): State<AppState>,
    Path((id, season, episode)): Path<(i64, u32, u32)>,
) -> AppResult<Json<PlayerDescriptor>> {
    match state.catalog.details(MediaKind::Tv, id).await {
        Some(details) => Ok(Json(PlayerDescriptor::episode(&details, season, episode))),
        None => {
            warn!(id, "player requested for unknown series");
            Err(AppError::NotFound("TV series not found".into()))
        }
    }
}
