use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, MessageResponse, auth::AuthUser};
use super::validation::{check_movie_description, check_movie_title};
use crate::entities::movies;

#[derive(Deserialize)]
pub struct AddMovieRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateMovieRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Positive integer id from the path, or the endpoint's 400.
pub(super) fn parse_movie_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::validation("Invalid movie ID"))
}

/// GET /movies
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<movies::Model>>>, ApiError> {
    let movies = state
        .store()
        .list_movies()
        .await
        .map_err(|e| ApiError::server("Movie list failed", &e, "Exception occurred while fetching movies"))?;

    Ok(Json(ApiResponse::success(movies)))
}

/// GET /movies/top
pub async fn top(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<movies::Model>>>, ApiError> {
    let movies = state
        .store()
        .top_movies()
        .await
        .map_err(|e| ApiError::server("Top movies failed", &e, "Exception occurred while fetching movies"))?;

    Ok(Json(ApiResponse::success(movies)))
}

/// GET /movies/me
pub async fn seen(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<movies::Model>>>, ApiError> {
    let movies = state
        .store()
        .seen_movies(&user.email)
        .await
        .map_err(|e| ApiError::server("Seen movies failed", &e, "Exception occurred while fetching movies"))?;

    Ok(Json(ApiResponse::success(movies)))
}

/// GET /movies/{id}
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<movies::Model>>, ApiError> {
    let movie_id = parse_movie_id(&id)?;

    let movie = state
        .store()
        .get_movie(movie_id)
        .await
        .map_err(|e| ApiError::server("Movie fetch failed", &e, "Exception occurred while fetching movie"))?
        .ok_or_else(|| ApiError::not_found("Movie not found"))?;

    Ok(Json(ApiResponse::success(movie)))
}

/// POST /movies
pub async fn add(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AddMovieRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(title), Some(description)) = (payload.title, payload.description) else {
        return Err(ApiError::validation("Title and description are required"));
    };

    check_movie_title(&title).map_err(ApiError::validation)?;
    check_movie_description(&description).map_err(ApiError::validation)?;

    let movie = state
        .store()
        .add_movie(title, description)
        .await
        .map_err(|e| ApiError::server("Movie insert failed", &e, "Exception occurred while adding movie"))?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(movie))))
}

/// PUT /movies/{id}
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateMovieRequest>,
) -> Result<Json<ApiResponse<movies::Model>>, ApiError> {
    let movie_id = parse_movie_id(&id)?;

    if payload.title.is_none() && payload.description.is_none() {
        return Err(ApiError::validation(
            "At least one field (title or description) is required",
        ));
    }

    if let Some(title) = payload.title.as_deref() {
        check_movie_title(title).map_err(ApiError::validation)?;
    }
    if let Some(description) = payload.description.as_deref() {
        check_movie_description(description).map_err(ApiError::validation)?;
    }

    let movie = state
        .store()
        .update_movie(movie_id, payload.title, payload.description)
        .await
        .map_err(|e| ApiError::server("Movie update failed", &e, "Exception occurred while updating movie"))?
        .ok_or_else(|| ApiError::not_found("Movie not found"))?;

    Ok(Json(ApiResponse::success(movie)))
}

/// DELETE /movies/{id}
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let movie_id = parse_movie_id(&id)?;

    let deleted = state
        .store()
        .delete_movie(movie_id)
        .await
        .map_err(|e| ApiError::server("Movie delete failed", &e, "Exception occurred while deleting movie"))?;

    if !deleted {
        return Err(ApiError::not_found("Movie not found"));
    }

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Movie deleted successfully",
    ))))
}
