use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Title given to sprints started without an explicit one.
pub const DEFAULT_SPRINT_TITLE: &str = "Focus Sprint";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "sprint_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SprintStatus {
    Active,
    Completed,
}

/// One timed focus interval within a coworking session.
///
/// Remaining time is never stored; it is always recomputed from
/// `start_time`, `duration_minutes`, `total_paused_ms` and `paused_at`
/// (see `service::timer`). `total_paused_ms` only grows, and only on the
/// pause→resume and pause→end transitions.
#[derive(Debug, Clone, FromRow)]
pub struct Sprint {
    pub id: Uuid,
    pub session_id: Uuid,
    pub started_by: Uuid,
    pub title: String,
    pub duration_minutes: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: SprintStatus,
    pub paused_at: Option<DateTime<Utc>>,
    pub total_paused_ms: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SprintResponse {
    pub id: Uuid,
    pub session_id: Uuid,
    pub started_by: Uuid,
    pub title: String,
    pub duration_minutes: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: SprintStatus,
    pub paused_at: Option<DateTime<Utc>>,
    pub total_paused_ms: i64,
    /// Whole seconds left on the clock at response time.
    pub remaining_seconds: i64,
    /// Same value preformatted as mm:ss for dumb displays.
    pub clock: String,
}

impl From<&Sprint> for SprintResponse {
    fn from(sprint: &Sprint) -> Self {
        let snapshot = crate::service::timer::snapshot(sprint, Utc::now());
        Self {
            id: sprint.id,
            session_id: sprint.session_id,
            started_by: sprint.started_by,
            title: sprint.title.clone(),
            duration_minutes: sprint.duration_minutes,
            start_time: sprint.start_time,
            end_time: sprint.end_time,
            status: sprint.status,
            paused_at: sprint.paused_at,
            total_paused_ms: sprint.total_paused_ms,
            remaining_seconds: snapshot.remaining_seconds,
            clock: crate::service::timer::format_mm_ss(snapshot.remaining_seconds),
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct StartSprintRequest {
    #[validate(length(min = 1, max = 120))]
    pub title: Option<String>,
    #[validate(range(min = 1, max = 180))]
    pub duration_minutes: Option<i32>,
}
