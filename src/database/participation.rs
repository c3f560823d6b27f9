use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::participation::{ParticipantView, SprintParticipation};
use uuid::Uuid;

impl PostgresRepository {
    pub async fn get_sprint_participation(&self, sprint_id: &Uuid, user_id: &Uuid) -> Result<Option<SprintParticipation>, AppError> {
        let participation = sqlx::query_as::<_, SprintParticipation>(
            r#"
            SELECT id, sprint_id, user_id, is_virtual, joined_at
            FROM sprint_participations
            WHERE sprint_id = $1 AND user_id = $2
            "#,
        )
        .bind(sprint_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(participation)
    }

    pub async fn add_sprint_participation(&self, sprint_id: &Uuid, user_id: &Uuid, is_virtual: bool) -> Result<SprintParticipation, AppError> {
        let participation = sqlx::query_as::<_, SprintParticipation>(
            r#"
            INSERT INTO sprint_participations (sprint_id, user_id, is_virtual)
            VALUES ($1, $2, $3)
            RETURNING id, sprint_id, user_id, is_virtual, joined_at
            "#,
        )
        .bind(sprint_id)
        .bind(user_id)
        .bind(is_virtual)
        .fetch_one(&self.pool)
        .await?;

        Ok(participation)
    }

    pub async fn remove_sprint_participation(&self, sprint_id: &Uuid, user_id: &Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sprint_participations WHERE sprint_id = $1 AND user_id = $2")
            .bind(sprint_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Participant roster with profile names, in join order.
    pub async fn list_sprint_participants(&self, sprint_id: &Uuid) -> Result<Vec<ParticipantView>, AppError> {
        let participants = sqlx::query_as::<_, ParticipantView>(
            r#"
            SELECT sp.user_id, COALESCE(p.name, 'User') AS name, sp.is_virtual, sp.joined_at
            FROM sprint_participations sp
            LEFT JOIN profiles p ON p.user_id = sp.user_id
            WHERE sp.sprint_id = $1
            ORDER BY sp.joined_at
            "#,
        )
        .bind(sprint_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(participants)
    }
}
