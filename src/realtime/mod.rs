//! In-process realtime fan-out: one broadcast channel per coworking session,
//! with a presence roster tracked per connected event stream.
//!
//! Events carry just enough for clients to know something changed; clients
//! re-fetch authoritative state over the normal API rather than trusting the
//! payload, which tolerates missed or reordered deliveries.

use crate::models::reaction::Reaction;
use crate::models::sprint::SprintResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Delivery ladder clients follow when the event stream drops. After the
/// last rung the client should give up and ask the user to refresh.
pub const RECONNECT_DELAYS_MS: [u64; 5] = [1000, 2000, 4000, 8000, 16000];
pub const MAX_RECONNECT_ATTEMPTS: usize = 5;

/// Suggested client retry delay for the given (0-based) attempt.
pub fn reconnect_delay_ms(attempt: usize) -> u64 {
    RECONNECT_DELAYS_MS[attempt.min(MAX_RECONNECT_ATTEMPTS - 1)]
}

/// A user currently connected to a session's event stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PresenceEntry {
    pub user_id: Uuid,
    pub name: String,
    pub online_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A sprint row was inserted or mutated; the fresh row rides along but
    /// clients should still re-fetch.
    SprintChanged { sprint: SprintResponse },
    /// Session membership changed; re-fetch the member list.
    MembersChanged,
    /// Sprint participation changed; re-fetch the participant roster.
    ParticipantsChanged { sprint_id: Uuid },
    PresenceJoined { user: PresenceEntry },
    PresenceLeft { user: PresenceEntry },
    /// Ephemeral, best-effort. Not persisted anywhere.
    Reaction { reaction: Reaction },
}

struct SessionChannel {
    sender: broadcast::Sender<SessionEvent>,
    presence: HashMap<Uuid, PresenceEntry>,
}

impl SessionChannel {
    fn new() -> Self {
        let (sender, _) = broadcast::channel(64);
        Self {
            sender,
            presence: HashMap::new(),
        }
    }
}

/// Registry of live session channels. One per process; handed to routes and
/// services explicitly rather than through a global, so tests can stand up
/// their own.
pub struct SessionChannels {
    channels: RwLock<HashMap<Uuid, SessionChannel>>,
}

impl Default for SessionChannels {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionChannels {
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribe to a session's events, creating the channel on first use.
    pub fn subscribe(&self, session_id: Uuid) -> broadcast::Receiver<SessionEvent> {
        let mut channels = self.channels.write().expect("realtime registry poisoned");
        channels.entry(session_id).or_insert_with(SessionChannel::new).sender.subscribe()
    }

    /// Best-effort publish. A session with no live subscribers is not an error.
    pub fn publish(&self, session_id: Uuid, event: SessionEvent) {
        let channels = self.channels.read().expect("realtime registry poisoned");
        if let Some(channel) = channels.get(&session_id) {
            let _ = channel.sender.send(event);
        }
    }

    /// Record a user as online and announce the join.
    pub fn track_presence(&self, session_id: Uuid, user_id: Uuid, name: &str) -> PresenceEntry {
        let entry = PresenceEntry {
            user_id,
            name: name.to_string(),
            online_at: Utc::now(),
        };

        let mut channels = self.channels.write().expect("realtime registry poisoned");
        let channel = channels.entry(session_id).or_insert_with(SessionChannel::new);
        channel.presence.insert(user_id, entry.clone());
        let _ = channel.sender.send(SessionEvent::PresenceJoined { user: entry.clone() });
        entry
    }

    /// Remove a user from the roster and announce the leave. Channels with no
    /// presence and no subscribers are dropped to keep the registry bounded.
    pub fn untrack_presence(&self, session_id: Uuid, user_id: Uuid) {
        let mut channels = self.channels.write().expect("realtime registry poisoned");
        if let Some(channel) = channels.get_mut(&session_id) {
            if let Some(entry) = channel.presence.remove(&user_id) {
                let _ = channel.sender.send(SessionEvent::PresenceLeft { user: entry });
            }
            if channel.presence.is_empty() && channel.sender.receiver_count() == 0 {
                channels.remove(&session_id);
            }
        }
    }

    /// Current roster in online-since order.
    pub fn presence_snapshot(&self, session_id: Uuid) -> Vec<PresenceEntry> {
        let channels = self.channels.read().expect("realtime registry poisoned");
        let mut entries: Vec<PresenceEntry> = channels
            .get(&session_id)
            .map(|c| c.presence.values().cloned().collect())
            .unwrap_or_default();
        entries.sort_by_key(|e| e.online_at);
        entries
    }

    pub fn online_count(&self, session_id: Uuid) -> usize {
        let channels = self.channels.read().expect("realtime registry poisoned");
        channels.get(&session_id).map(|c| c.presence.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_reaches_subscriber() {
        let channels = SessionChannels::new();
        let session_id = Uuid::new_v4();
        let mut rx = channels.subscribe(session_id);

        channels.publish(session_id, SessionEvent::MembersChanged);

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, SessionEvent::MembersChanged));
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_noop() {
        let channels = SessionChannels::new();
        channels.publish(Uuid::new_v4(), SessionEvent::MembersChanged);
    }

    #[tokio::test]
    async fn presence_join_and_leave_round_trip() {
        let channels = SessionChannels::new();
        let session_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        let before = channels.online_count(session_id);
        channels.track_presence(session_id, user_id, "Hidden Heron");
        assert_eq!(channels.online_count(session_id), before + 1);
        assert_eq!(channels.presence_snapshot(session_id)[0].name, "Hidden Heron");

        channels.untrack_presence(session_id, user_id);
        assert_eq!(channels.online_count(session_id), before);
    }

    #[tokio::test]
    async fn presence_events_are_broadcast() {
        let channels = SessionChannels::new();
        let session_id = Uuid::new_v4();
        let mut rx = channels.subscribe(session_id);

        let user_id = Uuid::new_v4();
        channels.track_presence(session_id, user_id, "Silent Swan");
        channels.untrack_presence(session_id, user_id);

        assert!(matches!(rx.recv().await.unwrap(), SessionEvent::PresenceJoined { .. }));
        assert!(matches!(rx.recv().await.unwrap(), SessionEvent::PresenceLeft { .. }));
    }

    #[tokio::test]
    async fn snapshot_orders_by_online_time() {
        let channels = SessionChannels::new();
        let session_id = Uuid::new_v4();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        channels.track_presence(session_id, first, "First");
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        channels.track_presence(session_id, second, "Second");

        let roster = channels.presence_snapshot(session_id);
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].user_id, first);
        assert_eq!(roster[1].user_id, second);
    }

    #[test]
    fn reconnect_ladder_is_exponential_and_capped() {
        assert_eq!(reconnect_delay_ms(0), 1000);
        assert_eq!(reconnect_delay_ms(3), 8000);
        assert_eq!(reconnect_delay_ms(4), 16000);
        // past the ladder the delay stays at the cap
        assert_eq!(reconnect_delay_ms(99), 16000);
    }
}
