//! Sprint lifecycle orchestration: persistence writes, notification fan-out
//! and realtime broadcast for start / pause / resume / end, plus the
//! auto-completion sweep.
//!
//! Host authorization is the caller's job (routes check the session's
//! host_id); this layer enforces state transitions. Every mutation is a
//! compare-and-swap in the store, so two hosts racing pause/resume, or two
//! sweeps racing an explicit end, resolve to one winner and one 409 instead
//! of corrupted pause accounting.

use crate::database::sprint::SprintStore;
use crate::error::app_error::AppError;
use crate::models::notification::NotificationFanout;
use crate::models::sprint::{DEFAULT_SPRINT_TITLE, Sprint, StartSprintRequest};
use crate::realtime::{SessionChannels, SessionEvent};
use tracing::{info, warn};
use uuid::Uuid;

pub struct SprintService<'a, S: SprintStore + ?Sized> {
    pub store: &'a S,
    pub channels: &'a SessionChannels,
}

impl<'a, S: SprintStore + ?Sized> SprintService<'a, S> {
    pub fn new(store: &'a S, channels: &'a SessionChannels) -> Self {
        Self { store, channels }
    }

    pub async fn start(
        &self,
        session_id: Uuid,
        started_by: Uuid,
        request: &StartSprintRequest,
        default_duration_minutes: i32,
    ) -> Result<Sprint, AppError> {
        let title = request.title.as_deref().unwrap_or(DEFAULT_SPRINT_TITLE);
        let duration = request.duration_minutes.unwrap_or(default_duration_minutes);

        let sprint = self.store.create_sprint(&session_id, &started_by, title, duration).await?;
        info!(sprint_id = %sprint.id, session_id = %session_id, duration_minutes = duration, "sprint started");

        self.notify(NotificationFanout::sprint_started(session_id), &started_by).await;
        self.broadcast_change(&sprint);
        Ok(sprint)
    }

    pub async fn pause(&self, sprint_id: Uuid) -> Result<Sprint, AppError> {
        let sprint = self
            .store
            .pause_sprint(&sprint_id)
            .await?
            .ok_or_else(|| AppError::stale_write("Sprint is not running, or already paused"))?;

        info!(sprint_id = %sprint.id, "sprint paused");
        self.broadcast_change(&sprint);
        Ok(sprint)
    }

    pub async fn resume(&self, sprint_id: Uuid) -> Result<Sprint, AppError> {
        let sprint = self
            .store
            .resume_sprint(&sprint_id)
            .await?
            .ok_or_else(|| AppError::stale_write("Sprint is not paused"))?;

        info!(sprint_id = %sprint.id, total_paused_ms = sprint.total_paused_ms, "sprint resumed");
        self.broadcast_change(&sprint);
        Ok(sprint)
    }

    pub async fn end(&self, sprint_id: Uuid, ended_by: Uuid) -> Result<Sprint, AppError> {
        let sprint = self
            .store
            .complete_sprint(&sprint_id)
            .await?
            .ok_or_else(|| AppError::stale_write("Sprint is already completed"))?;

        info!(sprint_id = %sprint.id, total_paused_ms = sprint.total_paused_ms, "sprint completed");
        self.notify(NotificationFanout::sprint_completed(sprint.session_id), &ended_by).await;
        self.broadcast_change(&sprint);
        Ok(sprint)
    }

    /// One pass of the auto-completion loop: complete every active,
    /// un-paused sprint whose clock ran out. The per-sprint CAS makes a tick
    /// racing another tick (or an explicit end) a silent no-op.
    pub async fn sweep_overdue(&self) -> Result<usize, AppError> {
        let overdue = self.store.list_overdue_sprints().await?;
        let mut completed = 0;

        for sprint in overdue {
            match self.store.complete_sprint(&sprint.id).await? {
                Some(done) => {
                    info!(sprint_id = %done.id, session_id = %done.session_id, "sprint auto-completed");
                    self.notify(NotificationFanout::sprint_completed(done.session_id), &done.started_by).await;
                    self.broadcast_change(&done);
                    completed += 1;
                }
                // lost the race to an explicit end or another sweep
                None => continue,
            }
        }

        Ok(completed)
    }

    /// Notification fan-out is best-effort: a failure is logged and the
    /// operation that triggered it still succeeds.
    async fn notify(&self, fanout: NotificationFanout, exclude_user: &Uuid) {
        if let Err(err) = self.store.fan_out_notification(&fanout, exclude_user).await {
            warn!(session_id = %fanout.session_id, kind = %fanout.r#type, error = ?err, "notification fan-out failed");
        }
    }

    fn broadcast_change(&self, sprint: &Sprint) {
        self.channels.publish(
            sprint.session_id,
            SessionEvent::SprintChanged {
                sprint: sprint.into(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sprint::SprintStatus;
    use crate::test_utils::MockSprintStore;
    use chrono::Duration;

    fn service<'a>(store: &'a MockSprintStore, channels: &'a SessionChannels) -> SprintService<'a, MockSprintStore> {
        SprintService::new(store, channels)
    }

    #[tokio::test]
    async fn start_uses_defaults_and_notifies_other_members() {
        let store = MockSprintStore::new();
        let channels = SessionChannels::new();
        let session_id = Uuid::new_v4();
        let host = Uuid::new_v4();
        let member = Uuid::new_v4();
        store.add_member(session_id, host);
        store.add_member(session_id, member);

        let svc = service(&store, &channels);
        let sprint = svc.start(session_id, host, &StartSprintRequest::default(), 25).await.unwrap();

        assert_eq!(sprint.title, DEFAULT_SPRINT_TITLE);
        assert_eq!(sprint.duration_minutes, 25);
        assert_eq!(sprint.status, SprintStatus::Active);
        assert_eq!(sprint.total_paused_ms, 0);

        // only the non-acting member is notified
        let notified = store.notified_user_ids();
        assert_eq!(notified, vec![member]);
    }

    #[tokio::test]
    async fn start_broadcasts_sprint_changed() {
        let store = MockSprintStore::new();
        let channels = SessionChannels::new();
        let session_id = Uuid::new_v4();
        let mut rx = channels.subscribe(session_id);

        let svc = service(&store, &channels);
        svc.start(session_id, Uuid::new_v4(), &StartSprintRequest::default(), 25).await.unwrap();

        assert!(matches!(rx.recv().await.unwrap(), SessionEvent::SprintChanged { .. }));
    }

    #[tokio::test]
    async fn pause_then_resume_accumulates_exactly_the_pause_interval() {
        let store = MockSprintStore::new();
        let channels = SessionChannels::new();
        let svc = service(&store, &channels);

        let sprint = svc.start(Uuid::new_v4(), Uuid::new_v4(), &StartSprintRequest::default(), 25).await.unwrap();

        store.advance(Duration::minutes(5));
        let paused = svc.pause(sprint.id).await.unwrap();
        assert!(paused.paused_at.is_some());

        store.advance(Duration::minutes(2));
        let resumed = svc.resume(sprint.id).await.unwrap();
        assert!(resumed.paused_at.is_none());
        assert_eq!(resumed.total_paused_ms, 120_000);
    }

    #[tokio::test]
    async fn repeated_cycles_sum_all_pause_intervals() {
        let store = MockSprintStore::new();
        let channels = SessionChannels::new();
        let svc = service(&store, &channels);

        let sprint = svc.start(Uuid::new_v4(), Uuid::new_v4(), &StartSprintRequest::default(), 25).await.unwrap();

        let pauses_ms = [30_000i64, 45_000, 90_000];
        for pause_len in pauses_ms {
            store.advance(Duration::minutes(1));
            svc.pause(sprint.id).await.unwrap();
            store.advance(Duration::milliseconds(pause_len));
            svc.resume(sprint.id).await.unwrap();
        }

        store.advance(Duration::seconds(10));
        svc.pause(sprint.id).await.unwrap();
        store.advance(Duration::seconds(15));
        let done = svc.end(sprint.id, sprint.started_by).await.unwrap();

        let expected: i64 = pauses_ms.iter().sum::<i64>() + 15_000;
        assert_eq!(done.total_paused_ms, expected);
        assert_eq!(done.status, SprintStatus::Completed);
        assert!(done.paused_at.is_none());
        assert!(done.end_time.is_some());
    }

    #[tokio::test]
    async fn pause_while_paused_is_a_conflict() {
        let store = MockSprintStore::new();
        let channels = SessionChannels::new();
        let svc = service(&store, &channels);

        let sprint = svc.start(Uuid::new_v4(), Uuid::new_v4(), &StartSprintRequest::default(), 25).await.unwrap();
        svc.pause(sprint.id).await.unwrap();

        let err = svc.pause(sprint.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn resume_without_pause_is_a_conflict() {
        let store = MockSprintStore::new();
        let channels = SessionChannels::new();
        let svc = service(&store, &channels);

        let sprint = svc.start(Uuid::new_v4(), Uuid::new_v4(), &StartSprintRequest::default(), 25).await.unwrap();
        let err = svc.resume(sprint.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn end_is_not_repeatable() {
        let store = MockSprintStore::new();
        let channels = SessionChannels::new();
        let svc = service(&store, &channels);

        let sprint = svc.start(Uuid::new_v4(), Uuid::new_v4(), &StartSprintRequest::default(), 25).await.unwrap();
        svc.end(sprint.id, sprint.started_by).await.unwrap();

        let err = svc.end(sprint.id, sprint.started_by).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn sweep_completes_overdue_sprint_exactly_once() {
        let store = MockSprintStore::new();
        let channels = SessionChannels::new();
        let svc = service(&store, &channels);

        let sprint = svc.start(Uuid::new_v4(), Uuid::new_v4(), &StartSprintRequest::default(), 25).await.unwrap();

        // not yet overdue
        store.advance(Duration::minutes(24));
        assert_eq!(svc.sweep_overdue().await.unwrap(), 0);

        store.advance(Duration::minutes(1));
        assert_eq!(svc.sweep_overdue().await.unwrap(), 1);
        // second pass finds nothing left to do
        assert_eq!(svc.sweep_overdue().await.unwrap(), 0);

        let done = store.get(&sprint.id).unwrap();
        assert_eq!(done.status, SprintStatus::Completed);
    }

    #[tokio::test]
    async fn paused_sprint_is_never_swept() {
        let store = MockSprintStore::new();
        let channels = SessionChannels::new();
        let svc = service(&store, &channels);

        let sprint = svc.start(Uuid::new_v4(), Uuid::new_v4(), &StartSprintRequest::default(), 25).await.unwrap();
        svc.pause(sprint.id).await.unwrap();

        // wall-clock far past the nominal end, but the sprint is frozen
        store.advance(Duration::hours(2));
        assert_eq!(svc.sweep_overdue().await.unwrap(), 0);
        assert_eq!(store.get(&sprint.id).unwrap().status, SprintStatus::Active);
    }
}
