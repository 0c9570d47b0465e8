use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, MessageResponse, TokenResponse, auth};
use crate::db::{NewUser, RegisterOutcome};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub country: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    /// Stamped by the normalization middleware.
    #[serde(default)]
    pub creation_date: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /users/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(email), Some(username), Some(password), Some(country)) = (
        payload.email,
        payload.username,
        payload.password,
        payload.country,
    ) else {
        return Err(ApiError::validation("Missing parameters"));
    };

    let creation_date = payload
        .creation_date
        .unwrap_or_else(|| chrono::Utc::now().format("%Y-%m-%d").to_string());

    let new_user = NewUser {
        email,
        username,
        password,
        creation_date,
        country: Some(country),
        street: payload.street,
        city: payload.city,
    };

    match state.store().register_user(new_user).await {
        Ok(RegisterOutcome::Created) => Ok(Json(ApiResponse::success(MessageResponse::new(
            "User created",
        )))),
        Ok(RegisterOutcome::AlreadyExists) => {
            Err(ApiError::conflict("User already has an account"))
        }
        Err(err) => Err(ApiError::server(
            "Registration failed",
            &err,
            "Exception occurred while registering",
        )),
    }
}

/// POST /users/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return Err(ApiError::validation("Missing parameters"));
    };

    let user = state
        .store()
        .authenticate_user(&email, &password)
        .await
        .map_err(|e| ApiError::server("Login failed", &e, "Exception occurred while logging in"))?
        .ok_or_else(|| ApiError::not_found("Incorrect email/password"))?;

    let token = auth::issue_token(&state.config.auth.jwt_secret, None, &user.email)?;

    session
        .insert("user", &user.email)
        .await
        .map_err(|e| ApiError::InternalError(format!("Session error: {e}")))?;

    Ok(Json(ApiResponse::success(TokenResponse {
        token,
        username: user.username,
    })))
}
