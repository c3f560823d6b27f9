use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A scheduled coworking meetup at a venue.
#[derive(Debug, Clone, FromRow)]
pub struct CoworkSession {
    pub id: Uuid,
    pub host_id: Uuid,
    pub venue_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub invite_code: String,
    pub is_private: bool,
    pub max_participants: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoworkSessionResponse {
    pub id: Uuid,
    pub host_id: Uuid,
    pub venue_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub invite_code: String,
    pub is_private: bool,
    pub max_participants: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl From<&CoworkSession> for CoworkSessionResponse {
    fn from(session: &CoworkSession) -> Self {
        Self {
            id: session.id,
            host_id: session.host_id,
            venue_id: session.venue_id,
            title: session.title.clone(),
            description: session.description.clone(),
            invite_code: session.invite_code.clone(),
            is_private: session.is_private,
            max_participants: session.max_participants,
            start_time: session.start_time,
            end_time: session.end_time,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CoworkSessionRequest {
    #[validate(length(min = 3, max = 120))]
    pub title: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub venue_id: Uuid,
    pub is_private: Option<bool>,
    #[validate(range(min = 2, max = 50))]
    pub max_participants: Option<i32>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Membership row linking a user to a coworking session.
#[derive(Debug, Clone, FromRow)]
pub struct SessionMember {
    pub id: Uuid,
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub joined_at: DateTime<Utc>,
}

/// Member row joined with the member's profile name for roster display.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SessionMemberView {
    pub user_id: Uuid,
    pub name: String,
    pub joined_at: DateTime<Utc>,
}
