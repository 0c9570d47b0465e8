use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::movies::parse_movie_id;
use super::validation::check_comment;
use super::{ApiError, ApiResponse, AppState, CommentDto, CommentListDto, MessageResponse};
use crate::docstore::CommentDoc;

#[derive(Deserialize)]
pub struct AddCommentRequest {
    pub username: Option<String>,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub rating: Option<i64>,
}

/// GET /comments/{movie_id}
pub async fn list(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<String>,
) -> Result<Json<ApiResponse<CommentListDto>>, ApiError> {
    let movie_id = parse_movie_id(&movie_id)?;

    let comments = state
        .docs()
        .comments_for_movie(movie_id)
        .await
        .map_err(|e| {
            ApiError::server(
                "Comment fetch failed",
                &e,
                "Exception occurred while fetching comments",
            )
        })?;

    Ok(Json(ApiResponse::success(CommentListDto {
        comments: comments.into_iter().map(CommentDto::from).collect(),
    })))
}

/// POST /comments/{movie_id}
pub async fn add(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<String>,
    Json(payload): Json<AddCommentRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let movie_id = parse_movie_id(&movie_id)?;

    let (Some(username), Some(title), Some(comment), Some(rating)) = (
        payload.username,
        payload.title,
        payload.comment,
        payload.rating,
    ) else {
        return Err(ApiError::validation("Missing parameters"));
    };

    check_comment(rating, &username, &title, &comment).map_err(ApiError::validation)?;

    state
        .docs()
        .insert_comment(CommentDoc::new(movie_id, &username, &title, &comment, rating))
        .await
        .map_err(|e| {
            ApiError::server(
                "Comment insert failed",
                &e,
                "Exception occurred while adding comment",
            )
        })?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Comment added",
    ))))
}
