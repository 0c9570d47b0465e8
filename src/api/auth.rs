use axum::{
    Extension, Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task;
use tower_sessions::Session;

use super::{AccountDto, ApiError, ApiResponse, AppState, MessageResponse, SigninResponse};
use super::validation::validate_signup;
use crate::db::repositories::user::{hash_password, verify_password};
use crate::docstore::{Account, DocError};

const TOKEN_TTL_SECS: u64 = 60 * 60;

// ============================================================================
// Token types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user: TokenUser,
    pub exp: u64,
}

/// Caller identity attached by the gate. Handlers use the email for
/// ownership; it is never taken from the request body.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Option<String>,
    pub email: String,
}

#[derive(Deserialize)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct SigninRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

// ============================================================================
// Tokens
// ============================================================================

pub fn issue_token(secret: &str, id: Option<String>, email: &str) -> anyhow::Result<String> {
    let exp = jsonwebtoken::get_current_timestamp() + TOKEN_TTL_SECS;
    let claims = Claims {
        user: TokenUser {
            id,
            email: email.to_owned(),
        },
        exp,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Decodes and classifies a bearer token. Each failure mode maps to its
/// own client-facing message; expiry is reported distinctly from a bad
/// signature.
pub fn verify_token(token: &str, secret: &str) -> Result<AuthUser, &'static str> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Shape is checked by hand below, so a signed token without `exp`
    // still decodes and gets the payload message instead.
    validation.set_required_spec_claims::<&str>(&[]);

    let data = decode::<serde_json::Value>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|err| match err.kind() {
        ErrorKind::ExpiredSignature => "Token expired",
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => "Invalid token",
        _ => "Authentication failed",
    })?;

    let user = data.claims.get("user");

    let email = user
        .and_then(|u| u.get("email"))
        .and_then(serde_json::Value::as_str)
        .ok_or("Invalid token payload")?;

    let id = user
        .and_then(|u| u.get("id"))
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned);

    Ok(AuthUser {
        id,
        email: email.to_owned(),
    })
}

// ============================================================================
// Middleware
// ============================================================================

/// Bearer gate for the protected routes. Attaches [`AuthUser`] on
/// success; writes nothing anywhere.
pub async fn require_token(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

    let value = header_value
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid token format"))?;

    // Tolerate surrounding and internal whitespace, but nothing else.
    let mut parts = value.split_whitespace();
    let (Some("Bearer"), Some(token), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ApiError::unauthorized("Invalid token format"));
    };

    let user =
        verify_token(token, &state.config.auth.jwt_secret).map_err(ApiError::unauthorized)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let errors = validate_signup(
        payload.username.as_deref(),
        payload.email.as_deref(),
        payload.password.as_deref(),
    );
    if !errors.is_empty() {
        return Err(ApiError::FieldErrors(errors));
    }

    // Checked non-empty above.
    let username = payload.username.unwrap_or_default();
    let email = payload.email.unwrap_or_default().to_lowercase();
    let password = payload.password.unwrap_or_default();

    let password_hash = task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::InternalError(format!("Hashing task panicked: {e}")))?
        .map_err(|e| ApiError::server("Signup hashing failed", &e, "Error registering user"))?;

    let now = mongodb::bson::DateTime::now();
    let account = Account {
        id: None,
        username,
        email,
        password_hash,
        created_at: now,
        updated_at: now,
    };

    match state.docs().insert_account(account).await {
        Ok(_) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success(MessageResponse::new(
                "User registered successfully",
            ))),
        )),
        Err(DocError::DuplicateEmail) => Err(ApiError::validation("Email already registered")),
        Err(err) => Err(ApiError::server(
            "Signup failed",
            &err,
            "Error registering user",
        )),
    }
}

/// POST /auth/login
pub async fn signin(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<SigninRequest>,
) -> Result<Json<ApiResponse<SigninResponse>>, ApiError> {
    let errors = super::validation::validate_signin(
        payload.email.as_deref(),
        payload.password.as_deref(),
    );
    if !errors.is_empty() {
        return Err(ApiError::FieldErrors(errors));
    }

    let email = payload.email.unwrap_or_default().to_lowercase();
    let password = payload.password.unwrap_or_default();

    let account = state
        .docs()
        .find_account_by_email(&email)
        .await
        .map_err(|e| ApiError::server("Signin lookup failed", &e, "Error logging in"))?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    let password_hash = account.password_hash.clone();
    let is_valid = task::spawn_blocking(move || verify_password(&password, &password_hash))
        .await
        .map_err(|e| ApiError::InternalError(format!("Verification task panicked: {e}")))?;

    if !is_valid {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let id = account.id.map(|id| id.to_hex());
    let token = issue_token(&state.config.auth.jwt_secret, id, &account.email)?;

    session
        .insert("user", &account.email)
        .await
        .map_err(|e| ApiError::InternalError(format!("Session error: {e}")))?;

    Ok(Json(ApiResponse::success(SigninResponse {
        token,
        user: AccountDto::from(account),
    })))
}

/// GET /auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<AccountDto>>, ApiError> {
    let account = match user.id {
        Some(id) => state.docs().find_account_by_id(&id).await,
        None => state.docs().find_account_by_email(&user.email).await,
    }
    .map_err(|e| ApiError::server("Profile lookup failed", &e, "Error fetching profile"))?
    .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(ApiResponse::success(AccountDto::from(account))))
}

/// GET /auth/logout
pub async fn logout(session: Session) -> Json<ApiResponse<MessageResponse>> {
    let _ = session.flush().await;
    Json(ApiResponse::success(MessageResponse::new(
        "Logged out successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn issue_then_verify_roundtrip() {
        let token = issue_token(SECRET, Some("abc123".to_string()), "a@b.c").unwrap();
        let user = verify_token(&token, SECRET).unwrap();
        assert_eq!(user.email, "a@b.c");
        assert_eq!(user.id.as_deref(), Some("abc123"));
    }

    #[test]
    fn wrong_secret_is_invalid_token() {
        let token = issue_token(SECRET, None, "a@b.c").unwrap();
        assert_eq!(
            verify_token(&token, "other-secret").unwrap_err(),
            "Invalid token"
        );
    }

    #[test]
    fn garbage_is_invalid_token() {
        assert_eq!(verify_token("not-a-jwt", SECRET).unwrap_err(), "Invalid token");
    }

    #[test]
    fn expired_token_is_reported_distinctly() {
        // Leeway defaults to 60s, so expire well in the past.
        let claims = Claims {
            user: TokenUser {
                id: None,
                email: "a@b.c".to_string(),
            },
            exp: jsonwebtoken::get_current_timestamp() - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(verify_token(&token, SECRET).unwrap_err(), "Token expired");
    }

    #[test]
    fn signed_token_with_wrong_shape_is_invalid_payload() {
        let token = encode(
            &Header::default(),
            &serde_json::json!({ "invalid": "payload" }),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(
            verify_token(&token, SECRET).unwrap_err(),
            "Invalid token payload"
        );
    }
}
