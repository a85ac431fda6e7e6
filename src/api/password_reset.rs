use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::validation::{validate_email, validate_token_id};
use super::{ApiError, ApiResponse, AppState};
use crate::api::types::{
    ForgotPasswordRequest, ForgotPasswordResponse, MessageResponse, ResetPasswordRequest,
};

/// POST /auth/forgot-password
/// Issue a reset token for the account holding the submitted email and send
/// the reset link. The caller is routed to the confirmation page either way;
/// only an unknown email is an error.
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<ForgotPasswordResponse>>, ApiError> {
    let email = validate_email(&payload.email)?;

    let token_id = state.password_reset.request_reset(email).await?;

    let redirect = format!("/password-reset-sent/{token_id}");

    Ok(Json(ApiResponse::success(ForgotPasswordResponse {
        token_id,
        redirect,
    })))
}

/// GET /auth/password-reset-sent/{token_id}
/// Gate for the "check your email" confirmation page: the token must exist,
/// but expiry is not evaluated here.
pub async fn password_reset_sent(
    State(state): State<Arc<AppState>>,
    Path(token_id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let token_id = validate_token_id(&token_id)?;

    if !state.password_reset.token_exists(token_id).await? {
        return Err(ApiError::NotFound("Invalid reset id".to_string()));
    }

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "A password reset link was sent to your email".to_string(),
        redirect: None,
    })))
}

/// POST /auth/reset-password/{token_id}
/// Consume the token and set the new password. Validation problems are
/// reported as a batch; an expired token is deleted on detection.
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Path(token_id): Path<String>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let token_id = validate_token_id(&token_id)?;

    state
        .password_reset
        .complete_reset(token_id, &payload.password, &payload.confirm_password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Password reset completed. Proceed to login".to_string(),
        redirect: Some("/login".to_string()),
    })))
}
