pub mod rules;
pub use rules::{MIN_PASSWORD_LEN, ValidationError};

pub mod mailer;
pub use mailer::{MailError, Mailer, NoopMailer, SmtpMailer, build_mailer};

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, UserInfo};
pub use auth_service_impl::SeaOrmAuthService;

pub mod registration_service;
pub mod registration_service_impl;
pub use registration_service::{NewAccount, RegistrationError, RegistrationService};
pub use registration_service_impl::SeaOrmRegistrationService;

pub mod password_reset_service;
pub mod password_reset_service_impl;
pub use password_reset_service::{PasswordResetService, RESET_TOKEN_TTL_MINUTES, ResetError};
pub use password_reset_service_impl::SeaOrmPasswordResetService;
