use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub title: Option<String>,
    pub avatar_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: Uuid,
    pub name: String,
    pub title: Option<String>,
    pub avatar_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub is_anonymous: bool,
}

impl From<&Profile> for ProfileResponse {
    fn from(profile: &Profile) -> Self {
        Self {
            user_id: profile.user_id,
            name: profile.name.clone(),
            title: profile.title.clone(),
            avatar_url: profile.avatar_url.clone(),
            linkedin_url: profile.linkedin_url.clone(),
            is_anonymous: profile.is_anonymous,
        }
    }
}

/// Upsert payload used after any auth flow to enrich the profile.
#[derive(Debug, Deserialize, Validate)]
pub struct ProfileRequest {
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    #[validate(length(max = 120))]
    pub title: Option<String>,
    #[validate(url)]
    pub avatar_url: Option<String>,
    #[validate(url)]
    pub linkedin_url: Option<String>,
}
