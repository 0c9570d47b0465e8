use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde_json::Value;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, MessageResponse, auth::AuthUser};
use crate::db::RatingOutcome;

/// POST /ratings/{movie_id}
///
/// The body is inspected by hand: a missing or non-integer `rating` and
/// a malformed movie id all collapse into the same generic 400, with the
/// range check reported separately.
pub async fn add(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(movie_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let rating = body.get("rating").and_then(Value::as_i64);
    let movie_id = movie_id.parse::<i32>().ok().filter(|id| *id > 0);

    let (Some(rating), Some(movie_id)) = (rating, movie_id) else {
        return Err(ApiError::validation("Missing or invalid parameters"));
    };

    if !(1..=5).contains(&rating) {
        return Err(ApiError::validation("Rating must be between 1 and 5"));
    }

    #[allow(clippy::cast_precision_loss)]
    let outcome = state
        .store()
        .rate_movie(state.docs(), movie_id, &user.email, rating as f64)
        .await
        .map_err(|e| {
            ApiError::server(
                "Rating transaction failed",
                &e,
                "Exception occurred while adding rating",
            )
        })?;

    match outcome {
        RatingOutcome::Recorded { mean } => {
            tracing::debug!("Movie {movie_id} mean rating now {mean}");
            Ok(Json(ApiResponse::success(MessageResponse::new(
                "Rating added successfully",
            ))))
        }
        RatingOutcome::MovieNotFound => Err(ApiError::not_found("Movie not found")),
        RatingOutcome::AlreadyRated => {
            Err(ApiError::validation("You have already rated this movie"))
        }
    }
}
