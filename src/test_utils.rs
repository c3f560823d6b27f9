//! In-memory stand-ins for unit tests that shouldn't need Postgres.

use crate::database::sprint::SprintStore;
use crate::error::app_error::AppError;
use crate::models::notification::NotificationFanout;
use crate::models::sprint::{Sprint, SprintStatus};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

struct MockState {
    now: DateTime<Utc>,
    sprints: HashMap<Uuid, Sprint>,
    members: HashMap<Uuid, Vec<Uuid>>,
    notifications: Vec<(Uuid, String)>,
}

/// [`SprintStore`] backed by a `HashMap` and a manually advanced clock, so
/// lifecycle tests can fast-forward hours in microseconds. Mirrors the
/// production guards: every mutation checks the same state predicate the SQL
/// does and returns `None` on a stale view.
pub struct MockSprintStore {
    state: Mutex<MockState>,
}

impl Default for MockSprintStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSprintStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                now: Utc::now(),
                sprints: HashMap::new(),
                members: HashMap::new(),
                notifications: Vec::new(),
            }),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.state.lock().unwrap().now += by;
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.state.lock().unwrap().now
    }

    pub fn add_member(&self, session_id: Uuid, user_id: Uuid) {
        self.state.lock().unwrap().members.entry(session_id).or_default().push(user_id);
    }

    pub fn get(&self, id: &Uuid) -> Option<Sprint> {
        self.state.lock().unwrap().sprints.get(id).cloned()
    }

    /// Users that received any notification, in fan-out order.
    pub fn notified_user_ids(&self) -> Vec<Uuid> {
        self.state.lock().unwrap().notifications.iter().map(|(user_id, _)| *user_id).collect()
    }
}

#[async_trait::async_trait]
impl SprintStore for MockSprintStore {
    async fn create_sprint(&self, session_id: &Uuid, started_by: &Uuid, title: &str, duration_minutes: i32) -> Result<Sprint, AppError> {
        let mut state = self.state.lock().unwrap();
        let sprint = Sprint {
            id: Uuid::new_v4(),
            session_id: *session_id,
            started_by: *started_by,
            title: title.to_string(),
            duration_minutes,
            start_time: state.now,
            end_time: None,
            status: SprintStatus::Active,
            paused_at: None,
            total_paused_ms: 0,
            created_at: state.now,
        };
        state.sprints.insert(sprint.id, sprint.clone());
        Ok(sprint)
    }

    async fn get_sprint_by_id(&self, id: &Uuid) -> Result<Option<Sprint>, AppError> {
        Ok(self.get(id))
    }

    async fn get_active_sprint(&self, session_id: &Uuid) -> Result<Option<Sprint>, AppError> {
        let state = self.state.lock().unwrap();
        let mut active: Vec<&Sprint> = state
            .sprints
            .values()
            .filter(|s| s.session_id == *session_id && s.status == SprintStatus::Active)
            .collect();
        active.sort_by_key(|s| s.start_time);
        Ok(active.last().map(|s| (*s).clone()))
    }

    async fn pause_sprint(&self, id: &Uuid) -> Result<Option<Sprint>, AppError> {
        let mut state = self.state.lock().unwrap();
        let now = state.now;
        let Some(sprint) = state.sprints.get_mut(id) else { return Ok(None) };
        if sprint.status != SprintStatus::Active || sprint.paused_at.is_some() {
            return Ok(None);
        }
        sprint.paused_at = Some(now);
        Ok(Some(sprint.clone()))
    }

    async fn resume_sprint(&self, id: &Uuid) -> Result<Option<Sprint>, AppError> {
        let mut state = self.state.lock().unwrap();
        let now = state.now;
        let Some(sprint) = state.sprints.get_mut(id) else { return Ok(None) };
        if sprint.status != SprintStatus::Active {
            return Ok(None);
        }
        let Some(paused_at) = sprint.paused_at.take() else { return Ok(None) };
        sprint.total_paused_ms += (now - paused_at).num_milliseconds();
        Ok(Some(sprint.clone()))
    }

    async fn complete_sprint(&self, id: &Uuid) -> Result<Option<Sprint>, AppError> {
        let mut state = self.state.lock().unwrap();
        let now = state.now;
        let Some(sprint) = state.sprints.get_mut(id) else { return Ok(None) };
        if sprint.status != SprintStatus::Active {
            return Ok(None);
        }
        if let Some(paused_at) = sprint.paused_at.take() {
            sprint.total_paused_ms += (now - paused_at).num_milliseconds();
        }
        sprint.status = SprintStatus::Completed;
        sprint.end_time = Some(now);
        Ok(Some(sprint.clone()))
    }

    async fn list_overdue_sprints(&self) -> Result<Vec<Sprint>, AppError> {
        let state = self.state.lock().unwrap();
        let overdue = state
            .sprints
            .values()
            .filter(|s| {
                s.status == SprintStatus::Active
                    && s.paused_at.is_none()
                    && s.start_time
                        + Duration::minutes(s.duration_minutes as i64)
                        + Duration::milliseconds(s.total_paused_ms)
                        <= state.now
            })
            .cloned()
            .collect();
        Ok(overdue)
    }

    async fn fan_out_notification(&self, fanout: &NotificationFanout, exclude_user: &Uuid) -> Result<u64, AppError> {
        let mut state = self.state.lock().unwrap();
        let recipients: Vec<Uuid> = state
            .members
            .get(&fanout.session_id)
            .map(|members| members.iter().filter(|id| *id != exclude_user).copied().collect())
            .unwrap_or_default();
        let delivered = recipients.len() as u64;
        for user_id in recipients {
            state.notifications.push((user_id, fanout.r#type.clone()));
        }
        Ok(delivered)
    }
}
