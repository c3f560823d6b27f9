use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::notification::Notification;
use uuid::Uuid;

const NOTIFICATION_COLUMNS: &str = "id, user_id, type, title, message, session_id, is_read, created_at";

impl PostgresRepository {
    pub async fn list_notifications_for_user(&self, user_id: &Uuid) -> Result<Vec<Notification>, AppError> {
        let notifications = sqlx::query_as::<_, Notification>(&format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS}
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT 100
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    pub async fn mark_notification_read(&self, id: &Uuid, user_id: &Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE notifications SET is_read = true WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn mark_all_notifications_read(&self, user_id: &Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE notifications SET is_read = true WHERE user_id = $1 AND is_read = false")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Purge read notifications older than the retention window.
    pub async fn cleanup_old_notifications(&self, retention_days: i64) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM notifications
            WHERE is_read = true
              AND created_at < now() - make_interval(days => $1::int)
            "#,
        )
        .bind(retention_days)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
