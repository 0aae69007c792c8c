use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Json, Router,
};
use axum_extra::extract::SignedCookieJar;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, SignupRequest, LOGIN_FORM, SIGNUP_FORM},
        services::{check_password, register},
        session::{removal_cookie, session_cookie, CurrentUser, SessionData},
    },
    error::{AppError, AppResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/signup", get(signup_page).post(signup))
        .route("/logout", get(logout))
}

pub async fn login_page(current: Option<CurrentUser>) -> Response {
    match current {
        Some(_) => Redirect::to("/").into_response(),
        None => Json(LOGIN_FORM).into_response(),
    }
}

pub async fn signup_page(current: Option<CurrentUser>) -> Response {
    match current {
        Some(_) => Redirect::to("/").into_response(),
        None => Json(SIGNUP_FORM).into_response(),
    }
}

#[instrument(skip(state, jar, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<LoginRequest>,
) -> AppResult<(SignedCookieJar, Redirect)> {
    let username = form.username.trim();

    let Some(user) = check_password(state.users.as_ref(), username, &form.password).await? else {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    };

    let session = SessionData::new(user.username.clone(), state.config.session.ttl_secs);
    let cookie = session_cookie(&session, &state.config.session)?;

    info!(user_id = user.id, "user logged in");
    Ok((jar.add(cookie), Redirect::to("/")))
}

#[instrument(skip(state, form), fields(username = %form.username))]
pub async fn signup(
    State(state): State<AppState>,
    Form(form): Form<SignupRequest>,
) -> AppResult<Redirect> {
    register(state.users.as_ref(), form).await?;
    Ok(Redirect::to("/login"))
}

#[instrument(skip(jar, current))]
pub async fn logout(
    jar: SignedCookieJar,
    current: Option<CurrentUser>,
) -> (SignedCookieJar, Redirect) {
    match current {
        Some(user) => info!(username = %user.username, "user logged out"),
        None => warn!("logout without a session"),
    }
    (jar.remove(removal_cookie()), Redirect::to("/login"))
}
