use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::login_session::MagicLinkToken;
use chrono::{DateTime, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

impl PostgresRepository {
    /// Generate a cryptographically secure magic-link token.
    /// Returns: (plain_token, token_hash). Only the hash is stored; the plain
    /// token travels in the emailed link.
    pub fn generate_magic_link_token() -> (String, String) {
        let mut rng = rand::thread_rng();
        let token_bytes: [u8; 32] = rng.r#gen();
        let token = hex::encode(token_bytes);

        let token_hash = hash_magic_link_token(&token);

        (token, token_hash)
    }

    pub async fn create_magic_link_token(&self, user_id: &Uuid, token_hash: &str, expires_at: DateTime<Utc>) -> Result<MagicLinkToken, AppError> {
        let token = sqlx::query_as::<_, MagicLinkToken>(
            r#"
            INSERT INTO magic_link_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, token_hash, created_at, expires_at, used_at
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(token)
    }

    /// Atomically consume an unexpired, unused token. Returns None when the
    /// token is unknown, already used, or expired; marking used in the same
    /// statement keeps the link single-use even under concurrent redeems.
    pub async fn consume_magic_link_token(&self, token_hash: &str) -> Result<Option<MagicLinkToken>, AppError> {
        let token = sqlx::query_as::<_, MagicLinkToken>(
            r#"
            UPDATE magic_link_tokens
            SET used_at = now()
            WHERE token_hash = $1
              AND used_at IS NULL
              AND expires_at > now()
            RETURNING id, user_id, token_hash, created_at, expires_at, used_at
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token)
    }

    pub async fn cleanup_expired_magic_link_tokens(&self) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM magic_link_tokens
            WHERE expires_at < now()
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

pub(crate) fn hash_magic_link_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_magic_link_token() {
        let (token, token_hash) = PostgresRepository::generate_magic_link_token();

        // Token should be 64 hex characters (32 bytes * 2)
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));

        // Hash is SHA-256, also 64 hex characters, and differs from the token
        assert_eq!(token_hash.len(), 64);
        assert!(token_hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, token_hash);

        assert_eq!(token_hash, hash_magic_link_token(&token));
    }

    #[test]
    fn test_generate_magic_link_token_unique() {
        let (token1, hash1) = PostgresRepository::generate_magic_link_token();
        let (token2, hash2) = PostgresRepository::generate_magic_link_token();

        assert_ne!(token1, token2);
        assert_ne!(hash1, hash2);
    }
}
