//! `SeaORM` implementation of the `PasswordResetService` trait.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::config::SecurityConfig;
use crate::db::Store;
use crate::services::mailer::Mailer;
use crate::services::password_reset_service::{
    PasswordResetService, RESET_TOKEN_TTL_MINUTES, ResetError,
};
use crate::services::rules::{ValidationError, password_too_short};

pub struct SeaOrmPasswordResetService {
    store: Store,
    mailer: Arc<dyn Mailer>,
    security: SecurityConfig,
    public_url: String,
}

impl SeaOrmPasswordResetService {
    #[must_use]
    pub fn new(
        store: Store,
        mailer: Arc<dyn Mailer>,
        security: SecurityConfig,
        public_url: String,
    ) -> Self {
        Self {
            store,
            mailer,
            security,
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    fn reset_url(&self, token_id: &str) -> String {
        format!("{}/reset-password/{token_id}", self.public_url)
    }
}

#[async_trait]
impl PasswordResetService for SeaOrmPasswordResetService {
    async fn request_reset(&self, email: &str) -> Result<String, ResetError> {
        let user = self
            .store
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| ResetError::UserNotFound(email.to_string()))?;

        let token = self.store.create_reset_token(user.id).await?;

        let reset_url = self.reset_url(&token.token_id);
        let body = format!("Reset your password using the link below:\n\n{reset_url}");

        // Delivery is fire-and-forget: a bounced email does not revoke the
        // token, and the caller still proceeds to the confirmation page.
        if let Err(e) = self
            .mailer
            .send(&user.email, "Reset your password", &body)
            .await
        {
            tracing::warn!(
                "Failed to send password reset email to {}: {e}",
                user.email
            );
        }

        tracing::info!("Password reset token issued for user: {}", user.username);

        Ok(token.token_id)
    }

    async fn token_exists(&self, token_id: &str) -> Result<bool, ResetError> {
        Ok(self.store.reset_token_exists(token_id).await?)
    }

    async fn complete_reset(
        &self,
        token_id: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), ResetError> {
        let token = self
            .store
            .get_reset_token(token_id)
            .await?
            .ok_or(ResetError::TokenNotFound)?;

        let mut violations = Vec::new();

        if new_password != confirm_password {
            violations.push(ValidationError::PasswordMismatch);
        }

        if password_too_short(new_password) {
            violations.push(ValidationError::PasswordTooShort);
        }

        let created = DateTime::parse_from_rfc3339(&token.created_at)
            .map_err(|e| ResetError::Internal(format!("Malformed token timestamp: {e}")))?
            .with_timezone(&Utc);

        if Utc::now() > created + Duration::minutes(RESET_TOKEN_TTL_MINUTES) {
            // Expiry is terminal: the token is removed immediately, even if
            // the same submission carries other violations.
            self.store.delete_reset_token(token_id).await?;
            violations.push(ValidationError::TokenExpired);
        }

        if !violations.is_empty() {
            return Err(ResetError::Rejected(violations));
        }

        // Consumption point: the conditional delete decides the race. Losing
        // it means another completion already used this token.
        let consumed = self.store.delete_reset_token(token_id).await?;
        if !consumed {
            return Err(ResetError::TokenNotFound);
        }

        self.store
            .update_user_password(token.user_id, new_password, &self.security)
            .await?;

        tracing::info!("Password reset completed for user id: {}", token.user_id);

        Ok(())
    }
}
