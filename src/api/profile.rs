use axum::{Extension, Json, extract::State};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, MessageResponse, auth::AuthUser};

#[derive(Deserialize)]
pub struct EditPasswordRequest {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

/// PUT /profile/password
pub async fn edit_password(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<EditPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let (Some(old_password), Some(new_password)) = (payload.old_password, payload.new_password)
    else {
        return Err(ApiError::validation("Missing parameters"));
    };

    if new_password == old_password {
        return Err(ApiError::validation(
            "New password cannot be equal to old password",
        ));
    }
    if new_password.chars().count() < 6 {
        return Err(ApiError::validation(
            "New password must be at least 6 characters long",
        ));
    }

    let authenticated = state
        .store()
        .authenticate_user(&user.email, &old_password)
        .await
        .map_err(|e| {
            ApiError::server(
                "Password check failed",
                &e,
                "Exception occurred while updating password",
            )
        })?;

    if authenticated.is_none() {
        return Err(ApiError::validation("Incorrect password"));
    }

    state
        .store()
        .update_user_password(&user.email, &new_password)
        .await
        .map_err(|e| {
            ApiError::server(
                "Password update failed",
                &e,
                "Exception occurred while updating password",
            )
        })?;

    tracing::info!("Password updated for {}", user.email);

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password updated",
    ))))
}

/// POST /profile/logout
pub async fn logout(session: Session) -> Json<ApiResponse<MessageResponse>> {
    let _ = session.flush().await;
    Json(ApiResponse::success(MessageResponse::new("Disconnected")))
}
