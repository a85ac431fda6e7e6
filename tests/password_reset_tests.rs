use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use doorman::api::AppState;
use doorman::config::Config;
use doorman::db::Store;
use doorman::db::repositories::reset_token::{ResetTokenRepository, generate_token_id};
use doorman::services::{
    MailError, Mailer, NewAccount, PasswordResetService, RegistrationService, ResetError,
    SeaOrmPasswordResetService, SeaOrmRegistrationService,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

async fn spawn_app() -> (Router, Arc<AppState>) {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // A single connection keeps every query on the same in-memory database
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    config.server.secure_cookies = false;

    let state = doorman::api::create_app_state(config, None)
        .await
        .expect("Failed to create app state");
    let app = doorman::api::router(state.clone()).await;
    (app, state)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn register_bob(app: &Router) {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            serde_json::json!({
                "first_name": "Bob",
                "last_name": "Builder",
                "username": "bob",
                "email": "bob@example.com",
                "password": "original-password",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

async fn request_reset(app: &Router, email: &str) -> axum::response::Response {
    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/forgot-password",
            serde_json::json!({ "email": email }),
        ))
        .await
        .unwrap()
}

async fn complete_reset(
    app: &Router,
    token_id: &str,
    password: &str,
    confirm: &str,
) -> axum::response::Response {
    app.clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/auth/reset-password/{token_id}"),
            serde_json::json!({ "password": password, "confirm_password": confirm }),
        ))
        .await
        .unwrap()
}

async fn token_page_status(app: &Router, token_id: &str) -> StatusCode {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/auth/password-reset-sent/{token_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn test_forgot_password_unknown_email() {
    let (app, _state) = spawn_app().await;

    let response = request_reset(&app, "ghost@example.com").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(
        body["error"],
        "No user with email 'ghost@example.com' was found"
    );
}

#[tokio::test]
async fn test_reset_token_lifecycle() {
    let (app, _state) = spawn_app().await;
    register_bob(&app).await;

    let response = request_reset(&app, "bob@example.com").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let token_id = body["data"]["token_id"].as_str().unwrap().to_string();
    assert_eq!(
        body["data"]["redirect"],
        format!("/password-reset-sent/{token_id}")
    );

    // Confirmation page sees the outstanding token
    assert_eq!(token_page_status(&app, &token_id).await, StatusCode::OK);

    let response = complete_reset(&app, &token_id, "abcde", "abcde").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["redirect"], "/login");

    // New password works
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({ "username": "bob", "password": "abcde" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Single use: the consumed token is gone
    let response = complete_reset(&app, &token_id, "abcde", "abcde").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        token_page_status(&app, &token_id).await,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_reset_collects_every_violation_and_keeps_token() {
    let (app, _state) = spawn_app().await;
    register_bob(&app).await;

    let response = request_reset(&app, "bob@example.com").await;
    let body = body_json(response).await;
    let token_id = body["data"]["token_id"].as_str().unwrap().to_string();

    let response = complete_reset(&app, &token_id, "abc", "abcd").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    let errors = body["errors"].as_array().unwrap();
    assert!(errors.contains(&serde_json::json!("Passwords do not match")));
    assert!(errors.contains(&serde_json::json!("Password must be at least 5 characters")));

    // Non-expiry rejection leaves the token in place for a retry
    assert_eq!(token_page_status(&app, &token_id).await, StatusCode::OK);

    let response = complete_reset(&app, &token_id, "abcde", "abcde").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_expired_token_is_rejected_and_deleted() {
    let (app, state) = spawn_app().await;
    register_bob(&app).await;

    let bob = state
        .store
        .get_user_by_username("bob")
        .await
        .unwrap()
        .unwrap();

    // Plant a token created 11 minutes ago, past the 10-minute window
    let repo = ResetTokenRepository::new(state.store.conn.clone());
    let token_id = generate_token_id();
    let created_at = (chrono::Utc::now() - chrono::Duration::minutes(11)).to_rfc3339();
    repo.insert(bob.id, &token_id, &created_at).await.unwrap();

    // Matching, valid passwords: expiry still wins
    let response = complete_reset(&app, &token_id, "abcde", "abcde").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["errors"], serde_json::json!(["Reset link has expired"]));

    // Expiry detection deleted the token
    assert_eq!(
        token_page_status(&app, &token_id).await,
        StatusCode::NOT_FOUND
    );

    let response = complete_reset(&app, &token_id, "abcde", "abcde").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reset_five_minutes_in_succeeds() {
    let (app, state) = spawn_app().await;
    register_bob(&app).await;

    let bob = state
        .store
        .get_user_by_username("bob")
        .await
        .unwrap()
        .unwrap();

    let repo = ResetTokenRepository::new(state.store.conn.clone());
    let token_id = generate_token_id();
    let created_at = (chrono::Utc::now() - chrono::Duration::minutes(5)).to_rfc3339();
    repo.insert(bob.id, &token_id, &created_at).await.unwrap();

    let response = complete_reset(&app, &token_id, "abcde", "abcde").await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        token_page_status(&app, &token_id).await,
        StatusCode::NOT_FOUND
    );
}

// ============================================================================
// Service-level tests with mailer doubles
// ============================================================================

struct RecordingMailer {
    sent: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), MailError> {
        Err(MailError::Transport("connection refused".to_string()))
    }
}

async fn service_fixture(mailer: Arc<dyn Mailer>) -> (Store, SeaOrmPasswordResetService) {
    let config = Config::default();

    let store = Store::with_pool_options("sqlite::memory:", 1, 1)
        .await
        .expect("Failed to open in-memory store");

    let registration = SeaOrmRegistrationService::new(store.clone(), config.security.clone());
    registration
        .register(NewAccount {
            first_name: "Bob".to_string(),
            last_name: "Builder".to_string(),
            username: "bob".to_string(),
            email: "bob@example.com".to_string(),
            password: "original-password".to_string(),
        })
        .await
        .expect("Failed to register fixture user");

    let service = SeaOrmPasswordResetService::new(
        store.clone(),
        mailer,
        config.security,
        "https://accounts.example.com".to_string(),
    );

    (store, service)
}

#[tokio::test]
async fn test_reset_email_contains_link() {
    let mailer = Arc::new(RecordingMailer {
        sent: Mutex::new(Vec::new()),
    });
    let (_store, service) = service_fixture(mailer.clone()).await;

    let token_id = service.request_reset("bob@example.com").await.unwrap();

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    let (to, subject, body) = &sent[0];
    assert_eq!(to, "bob@example.com");
    assert_eq!(subject, "Reset your password");
    assert!(body.contains(&format!(
        "https://accounts.example.com/reset-password/{token_id}"
    )));
}

#[tokio::test]
async fn test_delivery_failure_still_issues_token() {
    let (store, service) = service_fixture(Arc::new(FailingMailer)).await;

    let token_id = service
        .request_reset("bob@example.com")
        .await
        .expect("a bounced email must not revoke the token");

    assert!(store.reset_token_exists(&token_id).await.unwrap());
    assert!(service.token_exists(&token_id).await.unwrap());
}

#[tokio::test]
async fn test_unknown_email_issues_no_token() {
    let mailer = Arc::new(RecordingMailer {
        sent: Mutex::new(Vec::new()),
    });
    let (_store, service) = service_fixture(mailer.clone()).await;

    let err = service.request_reset("ghost@example.com").await.unwrap_err();
    assert!(matches!(err, ResetError::UserNotFound(_)));
    assert_eq!(
        err.to_string(),
        "No user with email 'ghost@example.com' was found"
    );

    assert!(mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_outstanding_tokens_coexist() {
    let mailer = Arc::new(RecordingMailer {
        sent: Mutex::new(Vec::new()),
    });
    let (_store, service) = service_fixture(mailer).await;

    // A second request does not cancel the first token
    let first = service.request_reset("bob@example.com").await.unwrap();
    let second = service.request_reset("bob@example.com").await.unwrap();
    assert_ne!(first, second);

    assert!(service.token_exists(&first).await.unwrap());
    assert!(service.token_exists(&second).await.unwrap());

    service.complete_reset(&first, "abcde", "abcde").await.unwrap();

    // Consuming one leaves the other valid
    assert!(!service.token_exists(&first).await.unwrap());
    assert!(service.token_exists(&second).await.unwrap());

    service
        .complete_reset(&second, "fghij", "fghij")
        .await
        .unwrap();
    assert!(!service.token_exists(&second).await.unwrap());
}
