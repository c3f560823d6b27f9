use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// How many online users the presence strip shows before collapsing to "+K more".
pub const PRESENCE_DISPLAY_LIMIT: usize = 8;
/// How many sprint participants are shown by name before "+K more".
pub const PARTICIPANT_DISPLAY_LIMIT: usize = 6;

/// Join record linking a user to a sprint.
#[derive(Debug, Clone, FromRow)]
pub struct SprintParticipation {
    pub id: Uuid,
    pub sprint_id: Uuid,
    pub user_id: Uuid,
    pub is_virtual: bool,
    pub joined_at: DateTime<Utc>,
}

/// Join payload; `is_virtual` marks participants tuning in remotely rather
/// than sitting at the venue.
#[derive(Debug, Default, Deserialize)]
pub struct JoinSprintRequest {
    pub is_virtual: Option<bool>,
}

/// Participation row joined with the participant's profile name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ParticipantView {
    pub user_id: Uuid,
    pub name: String,
    pub is_virtual: bool,
    pub joined_at: DateTime<Utc>,
}

/// A roster truncated for display: the first N entries in insertion order
/// plus a count of how many more there are.
#[derive(Debug, Serialize)]
pub struct RosterView<T> {
    pub total: usize,
    pub shown: Vec<T>,
    pub overflow: usize,
}

impl<T> RosterView<T> {
    pub fn truncate(mut entries: Vec<T>, limit: usize) -> Self {
        let total = entries.len();
        entries.truncate(limit);
        Self {
            total,
            overflow: total - entries.len(),
            shown: entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_under_limit_shows_everyone() {
        let view = RosterView::truncate(vec![1, 2, 3], PARTICIPANT_DISPLAY_LIMIT);
        assert_eq!(view.total, 3);
        assert_eq!(view.shown, vec![1, 2, 3]);
        assert_eq!(view.overflow, 0);
    }

    #[test]
    fn roster_over_limit_collapses_tail() {
        let view = RosterView::truncate((0..10).collect(), PARTICIPANT_DISPLAY_LIMIT);
        assert_eq!(view.total, 10);
        assert_eq!(view.shown, (0..6).collect::<Vec<_>>());
        assert_eq!(view.overflow, 4);
    }

    #[test]
    fn presence_limit_is_wider_than_participant_limit() {
        let view = RosterView::truncate((0..9).collect::<Vec<i32>>(), PRESENCE_DISPLAY_LIMIT);
        assert_eq!(view.shown.len(), 8);
        assert_eq!(view.overflow, 1);
    }
}
