use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::profile::{Profile, ProfileRequest};
use uuid::Uuid;

const PROFILE_COLUMNS: &str = "id, user_id, name, title, avatar_url, linkedin_url, is_anonymous, created_at, updated_at";

impl PostgresRepository {
    /// Upsert keyed on user_id: every auth flow funnels through this to
    /// enrich whatever profile data it has.
    pub async fn upsert_profile(&self, user_id: &Uuid, request: &ProfileRequest, is_anonymous: bool) -> Result<Profile, AppError> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"
            INSERT INTO profiles (user_id, name, title, avatar_url, linkedin_url, is_anonymous)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE
            SET name = EXCLUDED.name,
                title = EXCLUDED.title,
                avatar_url = EXCLUDED.avatar_url,
                linkedin_url = EXCLUDED.linkedin_url,
                is_anonymous = EXCLUDED.is_anonymous,
                updated_at = now()
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&request.name)
        .bind(&request.title)
        .bind(&request.avatar_url)
        .bind(&request.linkedin_url)
        .bind(is_anonymous)
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }

    pub async fn get_profile_by_user_id(&self, user_id: &Uuid) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM profiles
            WHERE user_id = $1
            "#
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }
}
