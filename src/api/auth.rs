//! Registration and login endpoints.

use crate::api::AppState;
use crate::core::auth;
use crate::entities::Role;
use crate::errors::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Login email, unique per account
    pub email: String,
    /// Raw password, hashed before storage
    pub password: String,
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login email
    pub email: String,
    /// Raw password
    pub password: String,
}

/// Response for both auth endpoints.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// The account's id
    pub user_id: i64,
    /// The account's email
    pub email: String,
    /// The account's role
    pub role: Role,
    /// Signed session token for the `Authorization: Bearer` header
    pub token: String,
}

/// `POST /api/auth/register` - create an account and issue a session token.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let user = auth::register(&state.db, &req.email, &req.password).await?;
    let token = auth::issue_token(
        user.id,
        user.role,
        &state.config.token_secret,
        state.config.token_expiry_minutes,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user_id: user.id,
            email: user.email,
            role: user.role,
            token,
        }),
    ))
}

/// `POST /api/auth/login` - verify credentials and issue a session token.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let (user, token) = auth::login(
        &state.db,
        &req.email,
        &req.password,
        &state.config.token_secret,
        state.config.token_expiry_minutes,
    )
    .await?;

    Ok(Json(AuthResponse {
        user_id: user.id,
        email: user.email,
        role: user.role,
        token,
    }))
}
