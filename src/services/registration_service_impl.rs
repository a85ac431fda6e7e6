//! `SeaORM` implementation of the `RegistrationService` trait.

use async_trait::async_trait;

use crate::config::SecurityConfig;
use crate::db::{NewUser, Store};
use crate::services::auth_service::UserInfo;
use crate::services::registration_service::{NewAccount, RegistrationError, RegistrationService};
use crate::services::rules::{ValidationError, password_too_short};

pub struct SeaOrmRegistrationService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmRegistrationService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

#[async_trait]
impl RegistrationService for SeaOrmRegistrationService {
    async fn register(&self, account: NewAccount) -> Result<UserInfo, RegistrationError> {
        let mut violations = Vec::new();

        if self.store.username_exists(&account.username).await? {
            violations.push(ValidationError::UsernameTaken);
        }

        if self.store.email_exists(&account.email).await? {
            violations.push(ValidationError::EmailTaken);
        }

        if password_too_short(&account.password) {
            violations.push(ValidationError::PasswordTooShort);
        }

        if !violations.is_empty() {
            return Err(RegistrationError::Rejected(violations));
        }

        let user = self
            .store
            .create_user(
                NewUser {
                    username: account.username,
                    email: account.email,
                    first_name: account.first_name,
                    last_name: account.last_name,
                    password: account.password,
                },
                &self.security,
            )
            .await?;

        tracing::info!("Account created for user: {}", user.username);

        Ok(UserInfo::from(user))
    }
}
