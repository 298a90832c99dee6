use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::warn;

use super::validation::require;
use super::{
    ApiError, AppState, LoginRequest, MessageResponse, RegisterRequest, RenameRequest,
    TokenResponse,
};

/// POST /users/register
/// Create an account; 409 if the username is taken
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let username = require("username", &payload.username)?;
    let password = require("password", &payload.password)?;

    state.accounts().register(username, password).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

/// POST /users/login
/// Authenticate with username and password, returns a bearer token on success
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let username = require("username", &payload.username)?;
    let password = require("password", &payload.password)?;

    let token = state.accounts().login(username, password).await?;

    Ok(Json(TokenResponse { token }))
}

/// PUT /users/{username}
/// Change the username. Answers 200 even when no account matched, but logs it.
pub async fn rename(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Json(payload): Json<RenameRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let new_username = require("newUsername", &payload.new_username)?;

    let outcome = state.accounts().rename(&username, new_username).await?;
    if !outcome.matched {
        warn!("Rename of {username} to {new_username} matched no account");
    }

    Ok(Json(MessageResponse::new("User profile updated successfully")))
}
