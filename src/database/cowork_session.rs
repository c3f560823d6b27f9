use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::cowork_session::{CoworkSession, CoworkSessionRequest, SessionMember, SessionMemberView};
use crate::util::slugify;
use uuid::Uuid;

const SESSION_COLUMNS: &str =
    "id, host_id, venue_id, title, description, invite_code, is_private, max_participants, start_time, end_time, created_at, updated_at";

/// Hard stop for the slug-suffix probe; collisions past this indicate
/// something pathological rather than popular titles.
const MAX_SLUG_ATTEMPTS: u32 = 100;

impl PostgresRepository {
    /// Derive a unique invite code from the title: the normalized slug, then
    /// `slug-1`, `slug-2`, ... until a free one is found.
    pub async fn unique_invite_code(&self, title: &str) -> Result<String, AppError> {
        let base = {
            let normalized = slugify(title);
            if normalized.is_empty() { "session".to_string() } else { normalized }
        };

        let mut attempt = base.clone();
        for i in 1..=MAX_SLUG_ATTEMPTS {
            let taken: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM cowork_sessions WHERE invite_code = $1")
                .bind(&attempt)
                .fetch_optional(&self.pool)
                .await?;

            if taken.is_none() {
                return Ok(attempt);
            }
            attempt = format!("{}-{}", base, i);
        }

        Err(AppError::Conflict(format!("Could not find a free invite code for '{}'", base)))
    }

    pub async fn create_cowork_session(&self, host_id: &Uuid, invite_code: &str, request: &CoworkSessionRequest) -> Result<CoworkSession, AppError> {
        let session = sqlx::query_as::<_, CoworkSession>(&format!(
            r#"
            INSERT INTO cowork_sessions
                (host_id, venue_id, title, description, invite_code, is_private, max_participants, start_time, end_time)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(host_id)
        .bind(request.venue_id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(invite_code)
        .bind(request.is_private.unwrap_or(false))
        .bind(request.max_participants.unwrap_or(8))
        .bind(request.start_time)
        .bind(request.end_time)
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    pub async fn get_cowork_session_by_id(&self, id: &Uuid) -> Result<Option<CoworkSession>, AppError> {
        let session = sqlx::query_as::<_, CoworkSession>(&format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM cowork_sessions
            WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    pub async fn get_cowork_session_by_invite_code(&self, invite_code: &str) -> Result<Option<CoworkSession>, AppError> {
        let session = sqlx::query_as::<_, CoworkSession>(&format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM cowork_sessions
            WHERE invite_code = $1
            "#
        ))
        .bind(invite_code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Public sessions that haven't ended yet, soonest first.
    pub async fn list_upcoming_sessions(&self) -> Result<Vec<CoworkSession>, AppError> {
        let sessions = sqlx::query_as::<_, CoworkSession>(&format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM cowork_sessions
            WHERE end_time > now()
              AND is_private = false
            ORDER BY start_time
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    pub async fn get_session_member(&self, session_id: &Uuid, user_id: &Uuid) -> Result<Option<SessionMember>, AppError> {
        let member = sqlx::query_as::<_, SessionMember>(
            r#"
            SELECT id, session_id, user_id, joined_at
            FROM session_members
            WHERE session_id = $1 AND user_id = $2
            "#,
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    pub async fn add_session_member(&self, session_id: &Uuid, user_id: &Uuid) -> Result<SessionMember, AppError> {
        let member = sqlx::query_as::<_, SessionMember>(
            r#"
            INSERT INTO session_members (session_id, user_id)
            VALUES ($1, $2)
            RETURNING id, session_id, user_id, joined_at
            "#,
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(member)
    }

    pub async fn remove_session_member(&self, session_id: &Uuid, user_id: &Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM session_members WHERE session_id = $1 AND user_id = $2")
            .bind(session_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn count_session_members(&self, session_id: &Uuid) -> Result<i64, AppError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM session_members WHERE session_id = $1")
            .bind(session_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// Member roster with profile names, in join order. Members without a
    /// profile row fall back to a generic name rather than disappearing.
    pub async fn list_session_members(&self, session_id: &Uuid) -> Result<Vec<SessionMemberView>, AppError> {
        let members = sqlx::query_as::<_, SessionMemberView>(
            r#"
            SELECT m.user_id, COALESCE(p.name, 'User') AS name, m.joined_at
            FROM session_members m
            LEFT JOIN profiles p ON p.user_id = m.user_id
            WHERE m.session_id = $1
            ORDER BY m.joined_at
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }
}
