use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The fixed palette of quick reactions.
pub const REACTION_EMOJIS: [&str; 8] = ["👍", "🔥", "💪", "✨", "🚀", "⚡", "🎯", "💯"];

/// How long clients keep a reaction on screen before discarding it.
pub const REACTION_DISPLAY_MS: u64 = 3000;

/// An ephemeral reaction. Never persisted: it exists only as an in-flight
/// broadcast message and is discarded client-side after the display window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reaction {
    pub id: Uuid,
    pub emoji: String,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Reaction {
    pub fn new(emoji: &str, user_id: Uuid, name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            emoji: emoji.to_string(),
            user_id,
            name: name.to_string(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReactionRequest {
    pub emoji: String,
}

/// Returned to the sender so it can render its own reaction immediately
/// instead of waiting for the broadcast echo.
#[derive(Debug, Serialize)]
pub struct ReactionAck {
    pub reaction: Reaction,
    /// How long to keep the reaction on screen, in milliseconds.
    pub display_ms: u64,
}

pub fn is_allowed_emoji(emoji: &str) -> bool {
    REACTION_EMOJIS.contains(&emoji)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_emojis_are_allowed() {
        for emoji in REACTION_EMOJIS {
            assert!(is_allowed_emoji(emoji));
        }
    }

    #[test]
    fn arbitrary_text_is_rejected() {
        assert!(!is_allowed_emoji("🙃"));
        assert!(!is_allowed_emoji("thumbs up"));
        assert!(!is_allowed_emoji(""));
    }

    #[test]
    fn each_reaction_gets_a_fresh_id() {
        let user = Uuid::new_v4();
        let a = Reaction::new("🔥", user, "Ada");
        let b = Reaction::new("🔥", user, "Ada");
        assert_ne!(a.id, b.id);
    }
}
