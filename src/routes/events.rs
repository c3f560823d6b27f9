use crate::auth::CurrentUser;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::participation::{PRESENCE_DISPLAY_LIMIT, RosterView};
use crate::realtime::{SessionChannels, reconnect_delay_ms};
use crate::routes::cowork_session::load_session;
use rocket::response::stream::{Event, EventStream};
use rocket::tokio::select;
use rocket::{Shutdown, State, routes};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

/// Removes the subscriber from the presence roster when the event stream is
/// dropped, which is the only reliable disconnect signal SSE gives us.
struct PresenceGuard {
    channels: Arc<SessionChannels>,
    session_id: Uuid,
    user_id: Uuid,
}

impl Drop for PresenceGuard {
    fn drop(&mut self) {
        self.channels.untrack_presence(self.session_id, self.user_id);
    }
}

/// Server-sent event stream for one coworking session: presence, sprint
/// changes, roster changes and reactions. Connecting marks the caller online;
/// disconnecting (for any reason) marks them offline.
#[rocket::get("/<session_id>/events")]
pub async fn session_events(
    pool: &State<PgPool>,
    channels: &State<Arc<SessionChannels>>,
    current_user: CurrentUser,
    session_id: &str,
    mut end: Shutdown,
) -> Result<EventStream![], AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let session_id = Uuid::parse_str(session_id).map_err(|e| AppError::uuid("Invalid session id", e))?;
    load_session(&repo, &session_id).await?;

    if repo.get_session_member(&session_id, &current_user.id).await?.is_none() {
        return Err(AppError::Unauthorized);
    }

    let channels = Arc::clone(channels.inner());
    // subscribe before announcing ourselves so we don't miss our own join
    let mut rx = channels.subscribe(session_id);
    channels.track_presence(session_id, current_user.id, &current_user.name);

    let user_id = current_user.id;
    Ok(EventStream! {
        let _guard = PresenceGuard {
            channels: Arc::clone(&channels),
            session_id,
            user_id,
        };

        yield Event::retry(Duration::from_millis(reconnect_delay_ms(0)));

        let roster = channels.presence_snapshot(session_id);
        yield Event::json(&RosterView::truncate(roster, PRESENCE_DISPLAY_LIMIT)).event("presence_snapshot");

        loop {
            let event = select! {
                msg = rx.recv() => match msg {
                    Ok(event) => event,
                    Err(RecvError::Lagged(_)) => {
                        // dropped messages; the client should re-fetch state
                        yield Event::data("lagged").event("resync");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = &mut end => break,
            };

            yield Event::json(&event);
        }
    })
}

/// Point-in-time presence roster, truncated for display, for clients that
/// want the count without holding an event stream open.
#[rocket::get("/<session_id>/presence")]
pub async fn session_presence(
    pool: &State<PgPool>,
    channels: &State<Arc<SessionChannels>>,
    session_id: &str,
) -> Result<rocket::serde::json::Json<PresenceResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let session_id = Uuid::parse_str(session_id).map_err(|e| AppError::uuid("Invalid session id", e))?;
    load_session(&repo, &session_id).await?;

    let online = channels.online_count(session_id);
    let roster = RosterView::truncate(channels.presence_snapshot(session_id), PRESENCE_DISPLAY_LIMIT);
    Ok(rocket::serde::json::Json(PresenceResponse {
        online,
        roster,
    }))
}

#[derive(serde::Serialize)]
pub struct PresenceResponse {
    pub online: usize,
    pub roster: RosterView<crate::realtime::PresenceEntry>,
}

pub fn routes() -> Vec<rocket::Route> {
    routes![session_events, session_presence]
}
