//! Support ticket polling.
//!
//! Tickets have no push channel; the listener is a plain poller over the
//! ticket endpoint. It honors document visibility, backs off on failure,
//! and reports a session loss by delivering one final empty update.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use eventflow_api::Ticket;

use crate::api::MessagingApi;
use crate::poll::{PollConfig, PollError, PollHandle, spawn_poller};

/// Delay between successful ticket fetches.
pub const TICKET_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// Backoff cap for failing ticket fetches.
pub const TICKET_POLL_MAX_INTERVAL: Duration = Duration::from_secs(120);

/// Cadence while the surface is hidden.
pub const TICKET_POLL_HIDDEN_INTERVAL: Duration = Duration::from_secs(150);

/// Starts watching the signed-in user's tickets.
///
/// `on_update` receives the full ticket list on every successful fetch.
/// If the session becomes unauthorized the watcher delivers one final
/// empty list and stops; cancel the returned handle to stop it earlier.
#[must_use = "dropping the handle leaves the watcher running with no way to stop it"]
pub fn watch_user_tickets<A, C>(
    api: Arc<A>,
    visibility: Option<watch::Receiver<bool>>,
    mut on_update: C,
) -> PollHandle
where
    A: MessagingApi,
    C: FnMut(Vec<Ticket>) + Send + 'static,
{
    let config = PollConfig::default()
        .interval(TICKET_POLL_INTERVAL)
        .max_interval(TICKET_POLL_MAX_INTERVAL)
        .hidden_interval(TICKET_POLL_HIDDEN_INTERVAL);

    spawn_poller(
        config,
        visibility,
        move || {
            let api = Arc::clone(&api);
            async move { api.list_tickets().await.map_err(PollError::from) }
        },
        move |result| on_update(result.unwrap_or_default()),
    )
}
