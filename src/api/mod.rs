use axum::{
    Json, Router,
    http::{HeaderValue, StatusCode},
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::Key;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

pub mod auth;
mod comments;
mod error;
mod messages;
mod movies;
mod profile;
mod ratings;
mod types;
pub mod users;
pub mod validation;

pub use crate::state::AppState;
pub use error::ApiError;
pub use types::*;

/// Builds the full application router: public routes, the bearer-gated
/// resource routes, the health contract and a JSON 404 fallback.
pub fn router(state: &Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();

    // Secret length is enforced by Config::validate before we get here.
    let session_key = Key::derive_from(state.config.auth.session_secret.as_bytes());
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_signed(session_key)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(60)));

    // Only the health probe carries the /api prefix; resources live at
    // the root.
    let public_routes = Router::new()
        .route("/api/health", get(health).fallback(not_found))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::signin))
        .route("/auth/logout", get(auth::logout))
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route("/movies", get(movies::list))
        .route("/movies/top", get(movies::top));

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/movies", post(movies::add))
        .route("/movies/me", get(movies::seen))
        .route("/movies/{id}", get(movies::get))
        .route("/movies/{id}", put(movies::update))
        .route("/movies/{id}", delete(movies::delete))
        .route("/ratings/{movie_id}", post(ratings::add))
        .route("/comments/{movie_id}", get(comments::list))
        .route("/comments/{movie_id}", post(comments::add))
        .route("/messages", get(messages::list))
        .route("/messages", post(messages::add))
        .route("/messages", put(messages::edit_missing_id))
        .route("/messages", delete(messages::delete_missing_id))
        .route("/messages/{message_id}", get(messages::get))
        .route("/messages/{message_id}", put(messages::edit))
        .route("/messages/{message_id}", delete(messages::delete))
        .route("/profile/password", put(profile::edit_password))
        .route("/profile/logout", post(profile::logout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_token,
        ));

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(not_found)
        .layer(middleware::from_fn(validation::normalize_json))
        .layer(session_layer)
        .with_state(state.clone())
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

/// GET /api/health. Fixed payload, exempt from the response envelope.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "All up and running !!" }))
}

async fn not_found() -> (StatusCode, Json<ApiResponse<()>>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error("Not found")),
    )
}
