use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::{header::SET_COOKIE, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        cookie::session_cookie,
        dto::{AuthResponse, Credentials, PublicUser},
        error::AuthError,
        jwt::JwtKeys,
        password::verify_password,
        repo::StoreError,
        repo_types::User,
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let (email, password) = require_credentials(payload)?;

    // Fast path only; the store's unique constraint is what actually holds.
    let existing = state
        .users
        .find_by_email(&email)
        .await
        .context("find_by_email failed")?;
    if existing.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AuthError::Conflict);
    }

    let user = match state.users.create(&email, &password).await {
        Ok(u) => u,
        Err(StoreError::DuplicateEmail) => {
            warn!(email = %email, "email registered concurrently");
            return Err(AuthError::Conflict);
        }
        Err(e) => return Err(e.into()),
    };

    let cookie = issue_session_cookie(&state, &user)?;

    info!(user_id = %user.id, email = %user.email, "user signed up");
    Ok((
        StatusCode::CREATED,
        [(SET_COOKIE, cookie)],
        Json(AuthResponse {
            user: PublicUser::summary(user),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let (email, password) = require_credentials(payload)?;

    let user = match state
        .users
        .find_by_email(&email)
        .await
        .context("find_by_email failed")?
    {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(AuthError::NotFound);
        }
    };

    let ok = verify_password(&password, &user.password_hash).context("verify_password failed")?;
    if !ok {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(AuthError::Authentication);
    }

    let cookie = issue_session_cookie(&state, &user)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok((
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(AuthResponse {
            user: PublicUser::with_profile(user),
        }),
    ))
}

fn require_credentials(
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<(String, String), AuthError> {
    let Json(credentials) = payload.map_err(|rejection| {
        warn!(error = %rejection, "unreadable credentials body");
        AuthError::Validation
    })?;
    credentials.require().ok_or_else(|| {
        warn!("email or password missing");
        AuthError::Validation
    })
}

fn issue_session_cookie(state: &AppState, user: &User) -> Result<HeaderValue, AuthError> {
    let keys = JwtKeys::from_ref(state);
    let token = keys
        .sign(&user.email, user.id)
        .context("jwt sign failed")?;
    let cookie = session_cookie(&token, state.config.is_production())
        .context("session cookie header invalid")?;
    Ok(cookie)
}
