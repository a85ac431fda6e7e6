//! Domain service for the password-reset token lifecycle.
//!
//! A token is valid only while it exists in the ledger and is younger than
//! [`RESET_TOKEN_TTL_MINUTES`]. It is deleted the moment it is consumed or
//! its expiry is detected; afterwards both states look identical to a later
//! lookup (`TokenNotFound`).

use thiserror::Error;

use crate::services::rules::ValidationError;

/// Validity window of a reset token, measured from its creation time.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 10;

/// Errors specific to the reset flow.
#[derive(Debug, Error)]
pub enum ResetError {
    /// The display string echoes the submitted address, matching the
    /// behavior the presentation layer expects.
    #[error("No user with email '{0}' was found")]
    UserNotFound(String),

    /// No ledger entry for the token id; also the answer for tokens already
    /// consumed or deleted on expiry.
    #[error("Invalid reset id")]
    TokenNotFound,

    /// One or more validation rules failed; may include
    /// [`ValidationError::TokenExpired`], in which case the token has
    /// already been deleted.
    #[error("Password reset rejected")]
    Rejected(Vec<ValidationError>),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ResetError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ResetError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for password resets.
#[async_trait::async_trait]
pub trait PasswordResetService: Send + Sync {
    /// Issues a reset token for the account holding `email` and emails the
    /// reset link. Delivery failure is swallowed: the token counts as issued
    /// whether or not the mail went out.
    ///
    /// # Errors
    ///
    /// Returns [`ResetError::UserNotFound`] when no account has that email.
    async fn request_reset(&self, email: &str) -> Result<String, ResetError>;

    /// Bare existence check for the confirmation page; expiry is NOT
    /// evaluated here.
    async fn token_exists(&self, token_id: &str) -> Result<bool, ResetError>;

    /// Consumes the token and sets the new password.
    ///
    /// # Errors
    ///
    /// [`ResetError::TokenNotFound`] when the ledger has no such entry (or a
    /// concurrent completion consumed it first); [`ResetError::Rejected`]
    /// with the full violation set otherwise. On a non-expiry rejection the
    /// token stays in the ledger for a retry.
    async fn complete_reset(
        &self,
        token_id: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), ResetError>;
}
