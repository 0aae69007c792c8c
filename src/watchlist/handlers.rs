use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::extractors::AuthUser,
    error::{AppError, AppResult},
    state::AppState,
    watchlist::{
        dto::{AddRequest, RemoveRequest, WatchlistChanged, WatchlistResponse},
        repo_types::NewEntry,
    },
};

pub fn watchlist_routes() -> Router<AppState> {
    Router::new()
        .route("/watchlist", get(list_watchlist))
        .route("/watchlist/add", post(add_to_watchlist))
        .route("/watchlist/remove", post(remove_from_watchlist))
}

fn body_or_bad_request<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload.map(|Json(body)| body).map_err(|e| {
        warn!(error = %e, "unreadable watchlist body");
        AppError::BadRequest("No data provided".into())
    })
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_watchlist(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<WatchlistResponse>> {
    let watchlist = state.watchlist.list(user.id).await?;
    Ok(Json(WatchlistResponse { watchlist }))
}

#[instrument(skip(state, user, payload), fields(user_id = user.id))]
pub async fn add_to_watchlist(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<AddRequest>, JsonRejection>,
) -> AppResult<Json<WatchlistChanged>> {
    let body = body_or_bad_request(payload)?;

    let movie_id = body.id.filter(|id| *id > 0);
    let title = body
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    let (Some(movie_id), Some(title)) = (movie_id, title) else {
        return Err(AppError::BadRequest("Missing required fields".into()));
    };

    let entry = NewEntry {
        movie_id,
        title,
        poster_path: body.poster_path.filter(|p| !p.is_empty()),
    };
    if !state.watchlist.add(user.id, entry).await? {
        return Err(AppError::BadRequest("Movie already in watchlist".into()));
    }

    Ok(Json(WatchlistChanged {
        success: true,
        message: "Movie added to watchlist",
        watchlist: state.watchlist.list(user.id).await?,
    }))
}

#[instrument(skip(state, user, payload), fields(user_id = user.id))]
pub async fn remove_from_watchlist(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<RemoveRequest>, JsonRejection>,
) -> AppResult<Json<WatchlistChanged>> {
    let body = body_or_bad_request(payload)?;

    let Some(movie_id) = body.id.filter(|id| *id != 0) else {
        return Err(AppError::BadRequest("Movie ID required".into()));
    };

    if !state.watchlist.remove(user.id, movie_id).await? {
        return Err(AppError::NotFound("Movie not found in watchlist".into()));
    }

    Ok(Json(WatchlistChanged {
        success: true,
        message: "Movie removed from watchlist",
        watchlist: state.watchlist.list(user.id).await?,
    }))
}
