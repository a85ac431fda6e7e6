//! Domain service for account registration.

use thiserror::Error;

use crate::services::auth_service::UserInfo;
use crate::services::rules::ValidationError;

/// Errors specific to registration.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// One or more validation rules failed. Every applicable violation is
    /// present, not just the first one encountered.
    #[error("Registration rejected")]
    Rejected(Vec<ValidationError>),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for RegistrationError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for RegistrationError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Validated registration input.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Domain service trait for registration.
#[async_trait::async_trait]
pub trait RegistrationService: Send + Sync {
    /// Creates an account if every validation rule passes.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::Rejected`] carrying the full set of
    /// violations; in that case no account is created.
    async fn register(&self, account: NewAccount) -> Result<UserInfo, RegistrationError>;
}
