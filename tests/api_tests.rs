use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use cinelog::AppState;
use cinelog::config::{AuthConfig, Config, DatabaseConfig, DocStoreConfig, ServerConfig};
use cinelog::db::Store;
use cinelog::docstore::MemoryDocStore;
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

const JWT_SECRET: &str = "integration-test-jwt-secret";

struct TestApp {
    app: Router,
    store: Store,
    docs: Arc<MemoryDocStore>,
}

fn test_config() -> Config {
    Config {
        server: ServerConfig {
            port: 0,
            cors_allowed_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        docstore: DocStoreConfig {
            uri: "mongodb://unused".to_string(),
            database: "unused".to_string(),
        },
        auth: AuthConfig {
            jwt_secret: JWT_SECRET.to_string(),
            session_secret: "0123456789abcdef0123456789abcdef".to_string(),
        },
        log_level: "warn".to_string(),
    }
}

async fn spawn_app() -> TestApp {
    let store = Store::with_pool_options("sqlite::memory:", 1, 1)
        .await
        .expect("Failed to connect test database");
    let docs = Arc::new(MemoryDocStore::new());

    let state = Arc::new(AppState {
        config: test_config(),
        store: store.clone(),
        docs: docs.clone(),
    });

    TestApp {
        app: cinelog::api::router(&state),
        store,
        docs,
    }
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

/// Registers a relational user and returns a bearer token for them.
async fn register_and_login(app: &Router, email: &str) -> String {
    let (status, _) = send(
        app,
        "POST",
        "/users/register",
        None,
        Some(serde_json::json!({
            "email": email,
            "username": "moviefan",
            "password": "hunter22",
            "country": "France",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        app,
        "POST",
        "/users/login",
        None,
        Some(serde_json::json!({ "email": email, "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    body["data"]["token"].as_str().unwrap().to_string()
}

async fn create_movie(app: &Router, token: &str, title: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/movies",
        Some(token),
        Some(serde_json::json!({
            "title": title,
            "description": "A perfectly serviceable plot summary.",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    body["data"]["movie_id"].as_i64().unwrap()
}

#[tokio::test]
async fn health_contract() {
    let test_app = spawn_app().await;

    let (status, body) = send(&test_app.app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "message": "All up and running !!" }));

    let (status, _) = send(&test_app.app, "POST", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&test_app.app, "GET", "/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Resources live at the root; only the health probe is under /api.
    let (status, _) = send(&test_app.app, "GET", "/api/movies", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&test_app.app, "GET", "/movies", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn bodyless_post_gets_an_enveloped_error() {
    let test_app = spawn_app().await;

    let (status, body) = send(&test_app.app, "POST", "/users/register", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], serde_json::json!(false));
    assert_eq!(body["error"], "Missing parameters");
}

#[tokio::test]
async fn auth_gate_reports_each_failure_distinctly() {
    let test_app = spawn_app().await;
    let app = &test_app.app;

    let (status, body) = send(app, "GET", "/movies/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, body) = send(app, "GET", "/movies/me", Some(""), None).await;
    // "Bearer " with an empty token collapses to a single part.
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token format");

    let request = Request::builder()
        .uri("/movies/me")
        .header(header::AUTHORIZATION, "Token abc")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "Invalid token format");

    let (status, body) = send(app, "GET", "/movies/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");

    // Signed with the right key but expired beyond the 60s leeway.
    let expired = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &serde_json::json!({
            "user": { "email": "a@b.c" },
            "exp": jsonwebtoken::get_current_timestamp() - 3600,
        }),
        &jsonwebtoken::EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap();
    let (status, body) = send(app, "GET", "/movies/me", Some(&expired), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Token expired");

    // Signed, unexpired, wrong shape.
    let wrong_shape = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &serde_json::json!({ "invalid": "payload" }),
        &jsonwebtoken::EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap();
    let (status, body) = send(app, "GET", "/movies/me", Some(&wrong_shape), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token payload");
}

#[tokio::test]
async fn auth_gate_tolerates_extra_whitespace() {
    let test_app = spawn_app().await;
    let token = register_and_login(&test_app.app, "padded@example.com").await;

    let request = Request::builder()
        .uri("/movies/me")
        .header(header::AUTHORIZATION, format!("   Bearer   {token}   "))
        .body(Body::empty())
        .unwrap();

    let response = test_app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn registration_flow() {
    let test_app = spawn_app().await;
    let app = &test_app.app;

    let (status, body) = send(
        app,
        "POST",
        "/users/register",
        None,
        Some(serde_json::json!({ "email": "new@example.com", "username": "nick" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing parameters");

    let (status, body) = send(
        app,
        "POST",
        "/users/register",
        None,
        Some(serde_json::json!({
            "email": "new@example.com",
            "username": "nick",
            "password": "hunter22",
            "country": "France",
            "street": "",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "User created");

    // The empty street was normalized to null and stored as NULL.
    use sea_orm::EntityTrait;
    let address = cinelog::entities::prelude::Addresses::find_by_id("new@example.com")
        .one(&test_app.store.conn)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(address.country.as_deref(), Some("France"));
    assert_eq!(address.street, None);

    let (status, body) = send(
        app,
        "POST",
        "/users/register",
        None,
        Some(serde_json::json!({
            "email": "new@example.com",
            "username": "nick",
            "password": "hunter22",
            "country": "France",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "User already has an account");

    let (status, body) = send(
        app,
        "POST",
        "/users/login",
        None,
        Some(serde_json::json!({ "email": "new@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Incorrect email/password");

    let (status, body) = send(
        app,
        "POST",
        "/users/login",
        None,
        Some(serde_json::json!({ "email": "new@example.com", "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"].is_string());
    assert_eq!(body["data"]["username"], "nick");
}

#[tokio::test]
async fn registration_failure_leaves_no_partial_state() {
    let test_app = spawn_app().await;

    // Seed an address row so the second insert of the transaction
    // violates its primary key after the user insert succeeded.
    use sea_orm::{ActiveModelTrait, EntityTrait, Set};
    cinelog::entities::addresses::ActiveModel {
        email: Set("doomed@example.com".to_string()),
        country: Set(None),
        street: Set(None),
        city: Set(None),
    }
    .insert(&test_app.store.conn)
    .await
    .unwrap();

    let (status, body) = send(
        &test_app.app,
        "POST",
        "/users/register",
        None,
        Some(serde_json::json!({
            "email": "doomed@example.com",
            "username": "nick",
            "password": "hunter22",
            "country": "France",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Exception occurred while registering");

    let user = cinelog::entities::prelude::Users::find_by_id("doomed@example.com")
        .one(&test_app.store.conn)
        .await
        .unwrap();
    assert!(user.is_none(), "user row must not survive the rollback");
}

#[tokio::test]
async fn rating_mean_is_exact() {
    let test_app = spawn_app().await;
    let app = &test_app.app;

    let t1 = register_and_login(app, "one@example.com").await;
    let t2 = register_and_login(app, "two@example.com").await;
    let t3 = register_and_login(app, "three@example.com").await;

    let movie_id = create_movie(app, &t1, "First Movie").await;
    for (token, rating) in [(&t1, 3), (&t2, 4), (&t3, 5)] {
        let (status, body) = send(
            app,
            "POST",
            &format!("/ratings/{movie_id}"),
            Some(token),
            Some(serde_json::json!({ "rating": rating })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["message"], "Rating added successfully");
    }

    let (_, body) = send(app, "GET", &format!("/movies/{movie_id}"), Some(&t1), None).await;
    assert_eq!(body["data"]["rating"], serde_json::json!(4.0));

    let second = create_movie(app, &t1, "Second Movie").await;
    for (token, rating) in [(&t1, 4), (&t2, 5)] {
        let (status, _) = send(
            app,
            "POST",
            &format!("/ratings/{second}"),
            Some(token),
            Some(serde_json::json!({ "rating": rating })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = send(app, "GET", &format!("/movies/{second}"), Some(&t1), None).await;
    assert_eq!(body["data"]["rating"], serde_json::json!(4.5));
}

#[tokio::test]
async fn rating_rejections() {
    let test_app = spawn_app().await;
    let app = &test_app.app;

    let token = register_and_login(app, "rater@example.com").await;
    let movie_id = create_movie(app, &token, "Rated Movie").await;

    let (status, body) = send(
        app,
        "POST",
        &format!("/ratings/{movie_id}"),
        Some(&token),
        Some(serde_json::json!({ "rating": "five" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing or invalid parameters");

    let (status, body) = send(
        app,
        "POST",
        &format!("/ratings/{movie_id}"),
        Some(&token),
        Some(serde_json::json!({ "rating": 6 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Rating must be between 1 and 5");

    let (status, body) = send(
        app,
        "POST",
        "/ratings/99999",
        Some(&token),
        Some(serde_json::json!({ "rating": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Movie not found");

    // First rating lands, the second is rejected and stores nothing.
    let (status, _) = send(
        app,
        "POST",
        &format!("/ratings/{movie_id}"),
        Some(&token),
        Some(serde_json::json!({ "rating": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        app,
        "POST",
        &format!("/ratings/{movie_id}"),
        Some(&token),
        Some(serde_json::json!({ "rating": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "You have already rated this movie");

    #[allow(clippy::cast_possible_truncation)]
    let count = test_app.docs.rating_count(movie_id as i32);
    assert_eq!(count, 1);
}

#[tokio::test]
async fn movies_crud() {
    let test_app = spawn_app().await;
    let app = &test_app.app;
    let token = register_and_login(app, "curator@example.com").await;

    let (status, body) = send(
        app,
        "POST",
        "/movies",
        Some(&token),
        Some(serde_json::json!({ "title": "No Description" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title and description are required");

    let (status, body) = send(
        app,
        "POST",
        "/movies",
        Some(&token),
        Some(serde_json::json!({ "title": "ab", "description": "A perfectly fine description." })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title must be between 3 and 100 characters");

    let movie_id = create_movie(app, &token, "CRUD Movie").await;

    let (status, body) = send(app, "GET", "/movies/abc", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid movie ID");

    let (status, body) = send(
        app,
        "PUT",
        &format!("/movies/{movie_id}"),
        Some(&token),
        Some(serde_json::json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "At least one field (title or description) is required"
    );

    // Updating the title alone leaves the description as stored.
    let (status, body) = send(
        app,
        "PUT",
        &format!("/movies/{movie_id}"),
        Some(&token),
        Some(serde_json::json!({ "title": "Renamed Movie" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Renamed Movie");
    assert_eq!(
        body["data"]["description"],
        "A perfectly serviceable plot summary."
    );

    let (status, body) = send(
        app,
        "DELETE",
        &format!("/movies/{movie_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Movie deleted successfully");

    let (status, body) = send(app, "GET", &format!("/movies/{movie_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Movie not found");
}

#[tokio::test]
async fn public_movie_listings() {
    let test_app = spawn_app().await;
    let app = &test_app.app;
    let token = register_and_login(app, "lister@example.com").await;

    create_movie(app, &token, "Public Movie").await;

    // No token needed for the catalog or the top list.
    let (status, body) = send(app, "GET", "/movies", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = send(app, "GET", "/movies/top", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn comment_bounds_and_listing() {
    let test_app = spawn_app().await;
    let app = &test_app.app;
    let token = register_and_login(app, "commenter@example.com").await;
    let movie_id = create_movie(app, &token, "Commented Movie").await;

    for bad_username in ["ab", &"x".repeat(51)] {
        let (status, body) = send(
            app,
            "POST",
            &format!("/comments/{movie_id}"),
            Some(&token),
            Some(serde_json::json!({
                "username": bad_username,
                "title": "Great watch",
                "comment": "Really enjoyed this one.",
                "rating": 4,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Username must be between 3 and 50 characters");
    }

    for ok_username in ["abc", &"x".repeat(50)] {
        let (status, body) = send(
            app,
            "POST",
            &format!("/comments/{movie_id}"),
            Some(&token),
            Some(serde_json::json!({
                "username": ok_username,
                "title": "Great watch",
                "comment": "Really enjoyed this one.",
                "rating": 4,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["message"], "Comment added");
    }

    let (status, body) = send(
        app,
        "GET",
        &format!("/comments/{movie_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["comments"].as_array().unwrap().len(), 2);

    let (status, body) = send(app, "GET", "/comments/abc", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid movie ID");
}

#[tokio::test]
async fn account_signup_and_signin() {
    let test_app = spawn_app().await;
    let app = &test_app.app;

    let (status, body) = send(
        app,
        "POST",
        "/auth/signup",
        None,
        Some(serde_json::json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 3);
    assert_eq!(body["errors"][0]["message"], "Username is required");

    let (status, body) = send(
        app,
        "POST",
        "/auth/signup",
        None,
        Some(serde_json::json!({
            "username": "reviewer",
            "email": "Reviewer@Example.com",
            "password": "hunter22",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["message"], "User registered successfully");

    let (status, body) = send(
        app,
        "POST",
        "/auth/signup",
        None,
        Some(serde_json::json!({
            "username": "reviewer",
            "email": "reviewer@example.com",
            "password": "hunter22",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already registered");

    let (status, body) = send(
        app,
        "POST",
        "/auth/login",
        None,
        Some(serde_json::json!({ "email": "reviewer@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, body) = send(
        app,
        "POST",
        "/auth/login",
        None,
        Some(serde_json::json!({ "email": "reviewer@example.com", "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["token"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["user"]["email"], "reviewer@example.com");
    assert!(body["data"]["user"]["_id"].is_string());
    assert!(body["data"]["user"].get("password_hash").is_none());

    let (status, body) = send(app, "GET", "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "reviewer");

    let (status, body) = send(app, "GET", "/auth/logout", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Logged out successfully");
}

#[tokio::test]
async fn message_crud() {
    let test_app = spawn_app().await;
    let app = &test_app.app;
    let token = register_and_login(app, "writer@example.com").await;

    let (status, body) = send(
        app,
        "POST",
        "/messages",
        Some(&token),
        Some(serde_json::json!({
            "message": { "name": "Hello", "content": "long enough content" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let message_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["user"], "writer@example.com");

    let (status, body) = send(
        app,
        "POST",
        "/messages",
        Some(&token),
        Some(serde_json::json!({ "message": { "name": "ab" } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Message name must be between 3 and 100 characters");

    let (status, body) = send(app, "GET", "/messages", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Editing and deleting without an id are their own 400s.
    let (status, body) = send(
        app,
        "PUT",
        "/messages",
        Some(&token),
        Some(serde_json::json!({ "message": { "name": "Renamed" } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Message name and ID are required");

    let (status, body) = send(app, "DELETE", "/messages", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Message ID is required");

    let (status, body) = send(
        app,
        "PUT",
        &format!("/messages/{message_id}"),
        Some(&token),
        Some(serde_json::json!({ "message": { "name": "Renamed" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Renamed");
    assert_eq!(body["data"]["content"], "long enough content");

    let (status, body) = send(
        app,
        "DELETE",
        &format!("/messages/{message_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Message deleted");

    let (status, body) = send(
        app,
        "DELETE",
        &format!("/messages/{message_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Message not found");
}

#[tokio::test]
async fn password_edit_flow() {
    let test_app = spawn_app().await;
    let app = &test_app.app;
    let token = register_and_login(app, "changer@example.com").await;

    let cases = [
        (
            serde_json::json!({ "old_password": "hunter22" }),
            "Missing parameters",
        ),
        (
            serde_json::json!({ "old_password": "hunter22", "new_password": "hunter22" }),
            "New password cannot be equal to old password",
        ),
        (
            serde_json::json!({ "old_password": "hunter22", "new_password": "short" }),
            "New password must be at least 6 characters long",
        ),
        (
            serde_json::json!({ "old_password": "wrong-old", "new_password": "hunter23" }),
            "Incorrect password",
        ),
    ];

    for (payload, expected) in cases {
        let (status, body) = send(app, "PUT", "/profile/password", Some(&token), Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], expected);
    }

    let (status, body) = send(
        app,
        "PUT",
        "/profile/password",
        Some(&token),
        Some(serde_json::json!({ "old_password": "hunter22", "new_password": "hunter23" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Password updated");

    let (status, _) = send(
        app,
        "POST",
        "/users/login",
        None,
        Some(serde_json::json!({ "email": "changer@example.com", "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        app,
        "POST",
        "/users/login",
        None,
        Some(serde_json::json!({ "email": "changer@example.com", "password": "hunter23" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(app, "POST", "/profile/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Disconnected");
}
