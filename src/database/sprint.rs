use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::notification::NotificationFanout;
use crate::models::sprint::Sprint;
use uuid::Uuid;

const SPRINT_COLUMNS: &str =
    "id, session_id, started_by, title, duration_minutes, start_time, end_time, status, paused_at, total_paused_ms, created_at";

/// Persistence surface the sprint lifecycle runs against. Implemented by
/// [`PostgresRepository`] for production and by a mock in `test_utils` so the
/// lifecycle logic is testable without Postgres.
///
/// The pause/resume/end mutations are compare-and-swap writes: each one
/// returns `None` when its state guard matched zero rows, meaning the
/// caller's view was stale (or, for `complete`, that someone else already
/// completed the sprint).
#[async_trait::async_trait]
pub trait SprintStore: Send + Sync {
    async fn create_sprint(&self, session_id: &Uuid, started_by: &Uuid, title: &str, duration_minutes: i32) -> Result<Sprint, AppError>;
    async fn get_sprint_by_id(&self, id: &Uuid) -> Result<Option<Sprint>, AppError>;
    async fn get_active_sprint(&self, session_id: &Uuid) -> Result<Option<Sprint>, AppError>;
    /// Guard: status = active AND paused_at IS NULL.
    async fn pause_sprint(&self, id: &Uuid) -> Result<Option<Sprint>, AppError>;
    /// Guard: status = active AND paused_at IS NOT NULL. Folds the elapsed
    /// pause into total_paused_ms in the same statement.
    async fn resume_sprint(&self, id: &Uuid) -> Result<Option<Sprint>, AppError>;
    /// Guard: status = active. Folds any live pause, then completes.
    async fn complete_sprint(&self, id: &Uuid) -> Result<Option<Sprint>, AppError>;
    /// Active, un-paused sprints whose clock has run out.
    async fn list_overdue_sprints(&self) -> Result<Vec<Sprint>, AppError>;
    /// Insert one notification row per session member except the actor.
    async fn fan_out_notification(&self, fanout: &NotificationFanout, exclude_user: &Uuid) -> Result<u64, AppError>;
}

#[async_trait::async_trait]
impl SprintStore for PostgresRepository {
    async fn create_sprint(&self, session_id: &Uuid, started_by: &Uuid, title: &str, duration_minutes: i32) -> Result<Sprint, AppError> {
        let sprint = sqlx::query_as::<_, Sprint>(&format!(
            r#"
            INSERT INTO sprints (session_id, started_by, title, duration_minutes, start_time, status)
            VALUES ($1, $2, $3, $4, now(), 'active')
            RETURNING {SPRINT_COLUMNS}
            "#
        ))
        .bind(session_id)
        .bind(started_by)
        .bind(title)
        .bind(duration_minutes)
        .fetch_one(&self.pool)
        .await?;

        Ok(sprint)
    }

    async fn get_sprint_by_id(&self, id: &Uuid) -> Result<Option<Sprint>, AppError> {
        let sprint = sqlx::query_as::<_, Sprint>(&format!(
            r#"
            SELECT {SPRINT_COLUMNS}
            FROM sprints
            WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sprint)
    }

    async fn get_active_sprint(&self, session_id: &Uuid) -> Result<Option<Sprint>, AppError> {
        // One active sprint per session is expected but not enforced by a
        // constraint; take the most recent if several exist.
        let sprint = sqlx::query_as::<_, Sprint>(&format!(
            r#"
            SELECT {SPRINT_COLUMNS}
            FROM sprints
            WHERE session_id = $1 AND status = 'active'
            ORDER BY start_time DESC
            LIMIT 1
            "#
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sprint)
    }

    async fn pause_sprint(&self, id: &Uuid) -> Result<Option<Sprint>, AppError> {
        let sprint = sqlx::query_as::<_, Sprint>(&format!(
            r#"
            UPDATE sprints
            SET paused_at = now()
            WHERE id = $1 AND status = 'active' AND paused_at IS NULL
            RETURNING {SPRINT_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sprint)
    }

    async fn resume_sprint(&self, id: &Uuid) -> Result<Option<Sprint>, AppError> {
        // The pause interval is computed inside the statement against the
        // database clock, so a racing second resume finds paused_at already
        // NULL and matches nothing instead of double-counting.
        let sprint = sqlx::query_as::<_, Sprint>(&format!(
            r#"
            UPDATE sprints
            SET total_paused_ms = total_paused_ms + (EXTRACT(EPOCH FROM (now() - paused_at)) * 1000)::bigint,
                paused_at = NULL
            WHERE id = $1 AND status = 'active' AND paused_at IS NOT NULL
            RETURNING {SPRINT_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sprint)
    }

    async fn complete_sprint(&self, id: &Uuid) -> Result<Option<Sprint>, AppError> {
        let sprint = sqlx::query_as::<_, Sprint>(&format!(
            r#"
            UPDATE sprints
            SET total_paused_ms = total_paused_ms + CASE
                    WHEN paused_at IS NOT NULL
                    THEN (EXTRACT(EPOCH FROM (now() - paused_at)) * 1000)::bigint
                    ELSE 0
                END,
                paused_at = NULL,
                status = 'completed',
                end_time = now()
            WHERE id = $1 AND status = 'active'
            RETURNING {SPRINT_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sprint)
    }

    async fn list_overdue_sprints(&self) -> Result<Vec<Sprint>, AppError> {
        let sprints = sqlx::query_as::<_, Sprint>(&format!(
            r#"
            SELECT {SPRINT_COLUMNS}
            FROM sprints
            WHERE status = 'active'
              AND paused_at IS NULL
              AND start_time
                  + make_interval(mins => duration_minutes)
                  + make_interval(secs => total_paused_ms / 1000.0)
                  <= now()
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(sprints)
    }

    async fn fan_out_notification(&self, fanout: &NotificationFanout, exclude_user: &Uuid) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO notifications (user_id, type, title, message, session_id)
            SELECT user_id, $2, $3, $4, $1
            FROM session_members
            WHERE session_id = $1 AND user_id <> $5
            "#,
        )
        .bind(fanout.session_id)
        .bind(&fanout.r#type)
        .bind(&fanout.title)
        .bind(&fanout.message)
        .bind(exclude_user)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
