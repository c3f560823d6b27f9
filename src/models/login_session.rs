use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A login session backing the private auth cookie.
#[derive(Debug, FromRow)]
pub struct LoginSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// The user joined through an unexpired login session.
#[derive(Debug, FromRow)]
pub struct SessionUser {
    pub id: Uuid,
    pub name: String,
    pub is_anonymous: bool,
}

#[derive(Debug, FromRow)]
pub struct MagicLinkToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}
