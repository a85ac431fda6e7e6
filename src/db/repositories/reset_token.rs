use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::entities::password_reset_tokens;

pub use crate::entities::password_reset_tokens::Model as ResetToken;

pub struct ResetTokenRepository {
    conn: DatabaseConnection,
}

impl ResetTokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Issue a fresh token for a user. Outstanding tokens for the same user
    /// are left untouched; each is independently valid until consumed or
    /// expired.
    pub async fn create(&self, user_id: i32) -> Result<ResetToken> {
        let token_id = generate_token_id();
        let created_at = chrono::Utc::now().to_rfc3339();
        self.insert(user_id, &token_id, &created_at).await
    }

    /// Insert a token row with an explicit id and timestamp.
    pub async fn insert(
        &self,
        user_id: i32,
        token_id: &str,
        created_at: &str,
    ) -> Result<ResetToken> {
        let active = password_reset_tokens::ActiveModel {
            token_id: Set(token_id.to_string()),
            user_id: Set(user_id),
            created_at: Set(created_at.to_string()),
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert password reset token")?;

        Ok(model)
    }

    pub async fn get(&self, token_id: &str) -> Result<Option<ResetToken>> {
        let token = password_reset_tokens::Entity::find_by_id(token_id)
            .one(&self.conn)
            .await
            .context("Failed to query password reset token")?;

        Ok(token)
    }

    pub async fn exists(&self, token_id: &str) -> Result<bool> {
        Ok(self.get(token_id).await?.is_some())
    }

    /// Conditional delete keyed on the token id. Returns whether a row was
    /// actually removed, so two racing consumers of the same token observe
    /// exactly one `true`.
    pub async fn delete(&self, token_id: &str) -> Result<bool> {
        let result = password_reset_tokens::Entity::delete_by_id(token_id)
            .exec(&self.conn)
            .await
            .context("Failed to delete password reset token")?;

        Ok(result.rows_affected > 0)
    }
}

/// Generate a random token id (64 character hex string)
#[must_use]
pub fn generate_token_id() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_id() {
        let a = generate_token_id();
        let b = generate_token_id();

        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
