use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub r#type: String,
    pub title: String,
    pub message: String,
    pub session_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub r#type: String,
    pub title: String,
    pub message: String,
    pub session_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Notification> for NotificationResponse {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id,
            r#type: n.r#type.clone(),
            title: n.title.clone(),
            message: n.message.clone(),
            session_id: n.session_id,
            is_read: n.is_read,
            created_at: n.created_at,
        }
    }
}

/// Payload for fanning one notification out to many users.
#[derive(Debug, Clone)]
pub struct NotificationFanout {
    pub session_id: Uuid,
    pub r#type: String,
    pub title: String,
    pub message: String,
}

impl NotificationFanout {
    pub fn sprint_started(session_id: Uuid) -> Self {
        Self {
            session_id,
            r#type: "sprint_started".to_string(),
            title: "Sprint Started!".to_string(),
            message: "A new focus sprint has begun. Join now to participate!".to_string(),
        }
    }

    pub fn sprint_completed(session_id: Uuid) -> Self {
        Self {
            session_id,
            r#type: "sprint_completed".to_string(),
            title: "Sprint Completed!".to_string(),
            message: "The focus sprint has ended. Great work everyone!".to_string(),
        }
    }

    pub fn user_joined(session_id: Uuid, joiner_name: &str) -> Self {
        Self {
            session_id,
            r#type: "user_joined".to_string(),
            title: "New Member".to_string(),
            message: format!("{} joined the session", joiner_name),
        }
    }
}
