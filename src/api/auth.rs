use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;
use tower_sessions::Session;

use super::validation::{validate_email, validate_username};
use super::{ApiError, ApiResponse, AppState};
use crate::api::types::{
    LoginRequest, LoginResponse, MessageResponse, RegisterRequest, UserInfoResponse,
};
use crate::services::NewAccount;

/// Session key holding the logged-in username.
pub const SESSION_USER_KEY: &str = "user";

// ============================================================================
// Middleware
// ============================================================================

/// Authentication middleware gating everything behind the session cookie
/// established by `login`.
pub async fn auth_middleware(
    session: Session,
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    if let Ok(Some(user)) = session.get::<String>(SESSION_USER_KEY).await {
        tracing::Span::current().record("user_id", &user);
        return Ok(next.run(request).await);
    }

    let response = (StatusCode::UNAUTHORIZED, "Unauthorized");
    Ok(response.into_response())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
/// Create a new account. Every violated rule is reported, not just the first.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let username = validate_username(&payload.username)?.to_string();
    let email = validate_email(&payload.email)?.to_string();

    state
        .registration
        .register(NewAccount {
            first_name: payload.first_name.trim().to_string(),
            last_name: payload.last_name.trim().to_string(),
            username,
            email,
            password: payload.password,
        })
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Account created successfully. Login Now".to_string(),
        redirect: Some("/login".to_string()),
    })))
}

/// POST /auth/login
/// Authenticate with username and password; binds the session on success.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    if payload.username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let user = state.auth.login(&payload.username, &payload.password).await?;

    if let Err(e) = session.insert(SESSION_USER_KEY, &user.username).await {
        return Err(ApiError::internal(format!("Failed to create session: {e}")));
    }

    Ok(Json(ApiResponse::success(LoginResponse {
        username: user.username,
        redirect: "/home".to_string(),
    })))
}

/// POST /auth/logout
/// Invalidate the current session
pub async fn logout(session: Session) -> Json<ApiResponse<MessageResponse>> {
    let _ = session.flush().await;

    Json(ApiResponse::success(MessageResponse {
        message: "Logged out".to_string(),
        redirect: Some("/login".to_string()),
    }))
}

/// GET /auth/me
/// Get current user information (requires authentication)
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<UserInfoResponse>>, ApiError> {
    let username = get_session_username(&session).await?;

    let user = state.auth.get_user_info(&username).await?;

    Ok(Json(ApiResponse::success(UserInfoResponse {
        username: user.username,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        created_at: user.created_at,
        updated_at: user.updated_at,
    })))
}

// ============================================================================
// Helpers
// ============================================================================

/// Get username from session, returns error if not authenticated
async fn get_session_username(session: &Session) -> Result<String, ApiError> {
    session
        .get::<String>(SESSION_USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))
}
