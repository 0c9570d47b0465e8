use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{check_message_content, check_message_name};
use super::{ApiError, ApiResponse, AppState, MessageDto, MessageResponse, auth::AuthUser};
use crate::docstore::MessageDoc;

/// Messages ride inside a `message` wrapper object.
#[derive(Deserialize)]
pub struct MessageEnvelope {
    pub message: Option<MessageBody>,
}

#[derive(Deserialize)]
pub struct MessageBody {
    pub name: Option<String>,
    pub content: Option<String>,
}

/// GET /messages
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<MessageDto>>>, ApiError> {
    let messages = state.docs().list_messages().await.map_err(|e| {
        ApiError::server(
            "Message list failed",
            &e,
            "Exception occurred while fetching messages",
        )
    })?;

    Ok(Json(ApiResponse::success(
        messages.into_iter().map(MessageDto::from).collect(),
    )))
}

/// GET /messages/{message_id}
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(message_id): Path<String>,
) -> Result<Json<ApiResponse<MessageDto>>, ApiError> {
    let message = state
        .docs()
        .find_message(&message_id)
        .await
        .map_err(|e| {
            ApiError::server(
                "Message fetch failed",
                &e,
                "Exception occurred while fetching message",
            )
        })?
        .ok_or_else(|| ApiError::not_found("Message not found"))?;

    Ok(Json(ApiResponse::success(MessageDto::from(message))))
}

/// POST /messages
pub async fn add(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<MessageEnvelope>,
) -> Result<Json<ApiResponse<MessageDto>>, ApiError> {
    let Some(body) = payload.message else {
        return Err(ApiError::validation("Missing parameters"));
    };
    let Some(name) = body.name else {
        return Err(ApiError::validation("Missing parameters"));
    };

    check_message_name(&name).map_err(ApiError::validation)?;
    if let Some(content) = body.content.as_deref() {
        check_message_content(content).map_err(ApiError::validation)?;
    }

    let message = state
        .docs()
        .insert_message(MessageDoc::new(&name, body.content, Some(user.email)))
        .await
        .map_err(|e| {
            ApiError::server(
                "Message insert failed",
                &e,
                "Exception occurred while adding message",
            )
        })?;

    Ok(Json(ApiResponse::success(MessageDto::from(message))))
}

/// PUT /messages/{message_id} — edits the name only.
pub async fn edit(
    State(state): State<Arc<AppState>>,
    Path(message_id): Path<String>,
    Json(payload): Json<MessageEnvelope>,
) -> Result<Json<ApiResponse<MessageDto>>, ApiError> {
    let name = payload.message.and_then(|m| m.name);
    let Some(name) = name else {
        return Err(ApiError::validation("Message name and ID are required"));
    };

    check_message_name(&name).map_err(ApiError::validation)?;

    let updated = state
        .docs()
        .rename_message(&message_id, &name)
        .await
        .map_err(|e| {
            ApiError::server(
                "Message edit failed",
                &e,
                "Exception occurred while editing message",
            )
        })?
        .ok_or_else(|| ApiError::not_found("Message not found"))?;

    Ok(Json(ApiResponse::success(MessageDto::from(updated))))
}

/// DELETE /messages/{message_id}
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(message_id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let deleted = state
        .docs()
        .delete_message(&message_id)
        .await
        .map_err(|e| {
            ApiError::server(
                "Message delete failed",
                &e,
                "Exception occurred while deleting message",
            )
        })?;

    if !deleted {
        return Err(ApiError::not_found("Message not found"));
    }

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Message deleted",
    ))))
}

/// PUT /messages — the id was left off the path.
pub async fn edit_missing_id() -> ApiError {
    ApiError::validation("Message name and ID are required")
}

/// DELETE /messages — the id was left off the path.
pub async fn delete_missing_id() -> ApiError {
    ApiError::validation("Message ID is required")
}
