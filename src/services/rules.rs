//! Shared credential validation rules.
//!
//! Violations are collected into vectors rather than returned one at a time,
//! so a caller can show the user every problem with a submission at once.

use serde::Serialize;
use thiserror::Error;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ValidationError {
    #[error("Username already exists!")]
    UsernameTaken,

    #[error("An account with this email already exists")]
    EmailTaken,

    #[error("Password must be at least 5 characters")]
    PasswordTooShort,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Reset link has expired")]
    TokenExpired,
}

#[must_use]
pub fn password_too_short(password: &str) -> bool {
    password.chars().count() < MIN_PASSWORD_LEN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_too_short() {
        assert!(password_too_short(""));
        assert!(password_too_short("abcd"));
        assert!(!password_too_short("abcde"));
        // length is measured in characters, not bytes
        assert!(!password_too_short("ümlaü"));
    }
}
