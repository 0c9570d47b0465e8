//! Request validation: per-field checks for the auth forms, first-failure
//! checks for everything else, and the JSON normalization middleware that
//! runs ahead of all routes.

use axum::{
    Json,
    body::Body,
    extract::Request,
    http::{HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

const BODY_LIMIT: usize = 1024 * 1024;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn within(s: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&char_len(s))
}

/// One error per missing field, in form order.
#[must_use]
pub fn validate_signup(
    username: Option<&str>,
    email: Option<&str>,
    password: Option<&str>,
) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if username.is_none_or(str::is_empty) {
        errors.push(FieldError {
            field: "username",
            message: "Username is required",
        });
    }
    if email.is_none_or(str::is_empty) {
        errors.push(FieldError {
            field: "email",
            message: "Email is required",
        });
    }
    if password.is_none_or(str::is_empty) {
        errors.push(FieldError {
            field: "password",
            message: "Password is required",
        });
    }

    errors
}

#[must_use]
pub fn validate_signin(email: Option<&str>, password: Option<&str>) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if email.is_none_or(str::is_empty) {
        errors.push(FieldError {
            field: "email",
            message: "Email is required",
        });
    }
    if password.is_none_or(str::is_empty) {
        errors.push(FieldError {
            field: "password",
            message: "Password is required",
        });
    }

    errors
}

/// Comment checks in fixed order; the first failure wins.
pub fn check_comment(
    rating: i64,
    username: &str,
    title: &str,
    comment: &str,
) -> Result<(), &'static str> {
    if !(1..=5).contains(&rating) {
        return Err("Rating must be between 1 and 5");
    }
    if !within(username, 3, 50) {
        return Err("Username must be between 3 and 50 characters");
    }
    if !within(title, 3, 100) {
        return Err("Title must be between 3 and 100 characters");
    }
    if !within(comment, 10, 1000) {
        return Err("Comment must be between 10 and 1000 characters");
    }
    Ok(())
}

pub fn check_movie_title(title: &str) -> Result<(), &'static str> {
    if within(title, 3, 100) {
        Ok(())
    } else {
        Err("Title must be between 3 and 100 characters")
    }
}

pub fn check_movie_description(description: &str) -> Result<(), &'static str> {
    if within(description, 10, 1000) {
        Ok(())
    } else {
        Err("Description must be between 10 and 1000 characters")
    }
}

pub fn check_message_name(name: &str) -> Result<(), &'static str> {
    if within(name, 3, 100) {
        Ok(())
    } else {
        Err("Message name must be between 3 and 100 characters")
    }
}

pub fn check_message_content(content: &str) -> Result<(), &'static str> {
    if within(content, 10, 1000) {
        Ok(())
    } else {
        Err("Message content must be between 10 and 1000 characters")
    }
}

/// Normalizes JSON object bodies before routing: stamps `creation_date`
/// (`YYYY-MM-DD`) and replaces top-level empty strings with null, which
/// downstream deserializes as `Option::None`. A write request without a
/// content type is treated as an empty object, so handlers answer with
/// their own missing-field errors instead of an extractor rejection.
/// Non-object JSON is rejected outright.
pub async fn normalize_json(request: Request, next: Next) -> Response {
    let is_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));

    let untyped_write = request.headers().get(header::CONTENT_TYPE).is_none()
        && matches!(*request.method(), Method::POST | Method::PUT | Method::PATCH);

    if !is_json && !untyped_write {
        return next.run(request).await;
    }

    let (mut parts, body) = request.into_parts();

    let bytes = match axum::body::to_bytes(body, BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(err) => return invalid_body(&err.to_string()),
    };

    let mut map = if bytes.is_empty() {
        serde_json::Map::new()
    } else {
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return invalid_body("expected a JSON object"),
            Err(err) => return invalid_body(&err.to_string()),
        }
    };

    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
    map.insert("creation_date".to_string(), Value::String(today));

    for value in map.values_mut() {
        if value.as_str().is_some_and(str::is_empty) {
            *value = Value::Null;
        }
    }

    // The body changed, so the original framing headers no longer hold.
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );

    let body = Body::from(Value::Object(map).to_string());
    next.run(Request::from_parts(parts, body)).await
}

fn invalid_body(details: &str) -> Response {
    let body = serde_json::json!({
        "success": false,
        "error": "Invalid request data",
        "details": details,
    });
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_reports_every_missing_field() {
        let errors = validate_signup(None, None, None);
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].message, "Username is required");
        assert_eq!(errors[1].message, "Email is required");
        assert_eq!(errors[2].message, "Password is required");
    }

    #[test]
    fn signup_treats_empty_string_as_missing() {
        let errors = validate_signup(Some(""), Some("a@b.c"), Some("pw"));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "username");
    }

    #[test]
    fn signin_needs_both_fields() {
        assert_eq!(validate_signin(None, None).len(), 2);
        assert!(validate_signin(Some("a@b.c"), Some("pw")).is_empty());
    }

    #[test]
    fn comment_checks_run_in_order() {
        // Rating fails first even though the username is bad too.
        assert_eq!(
            check_comment(9, "ab", "ok title", "a long enough comment"),
            Err("Rating must be between 1 and 5")
        );
        assert_eq!(
            check_comment(3, "ab", "ok title", "a long enough comment"),
            Err("Username must be between 3 and 50 characters")
        );
    }

    #[test]
    fn comment_username_bounds() {
        let long_51 = "x".repeat(51);
        let long_50 = "x".repeat(50);

        assert!(check_comment(3, "ab", "title", "a long enough comment").is_err());
        assert!(check_comment(3, &long_51, "title", "a long enough comment").is_err());
        assert!(check_comment(3, "abc", "title", "a long enough comment").is_ok());
        assert!(check_comment(3, &long_50, "title", "a long enough comment").is_ok());
    }

    #[test]
    fn movie_field_bounds() {
        assert!(check_movie_title("ab").is_err());
        assert!(check_movie_title(&"x".repeat(101)).is_err());
        assert!(check_movie_title("abc").is_ok());

        assert!(check_movie_description("too short").is_err());
        assert!(check_movie_description("long enough to pass").is_ok());
        assert!(check_movie_description(&"x".repeat(1001)).is_err());
    }

    #[test]
    fn message_field_bounds() {
        assert_eq!(
            check_message_name("ab"),
            Err("Message name must be between 3 and 100 characters")
        );
        assert_eq!(
            check_message_content("short"),
            Err("Message content must be between 10 and 1000 characters")
        );
        assert!(check_message_name("abc").is_ok());
        assert!(check_message_content("long enough content").is_ok());
    }
}
