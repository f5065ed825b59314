//! Generic polling loop with backoff and visibility awareness.
//!
//! One loop, one timer: every completed fetch schedules exactly one next
//! tick, so a poller can never stack overlapping requests. Failures double
//! the interval up to a cap; a success resets it. When the surface reports
//! itself hidden the cadence stretches, and becoming visible again triggers
//! an immediate fetch.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{Notify, watch};

/// Why a poll tick failed.
#[derive(Debug, Error)]
pub enum PollError {
    /// The session is gone; polling stops for good.
    #[error("unauthorized")]
    Unauthorized,

    /// Transient failure; the loop backs off and keeps going.
    #[error("poll failed: {0}")]
    Failed(String),
}

impl From<eventflow_api::Error> for PollError {
    fn from(err: eventflow_api::Error) -> Self {
        if err.is_unauthorized() {
            Self::Unauthorized
        } else {
            Self::Failed(err.to_string())
        }
    }
}

/// Cadence settings for a poller.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Delay between successful ticks.
    pub interval: Duration,
    /// Cap on the backed-off delay after repeated failures.
    pub max_interval: Duration,
    /// Delay used while the surface is hidden.
    pub hidden_interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        let interval = Duration::from_secs(30);
        Self {
            interval,
            max_interval: interval * 8,
            hidden_interval: interval * 10,
        }
    }
}

impl PollConfig {
    /// Sets the base interval.
    #[must_use]
    pub const fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the backoff cap.
    #[must_use]
    pub const fn max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = max_interval;
        self
    }

    /// Sets the hidden-surface interval.
    #[must_use]
    pub const fn hidden_interval(mut self, hidden_interval: Duration) -> Self {
        self.hidden_interval = hidden_interval;
        self
    }
}

/// Publisher for document visibility, shared by every poller that cares.
#[derive(Debug)]
pub struct Visibility {
    tx: watch::Sender<bool>,
}

impl Visibility {
    /// Starts out visible.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tx: watch::channel(true).0,
        }
    }

    /// Publishes the current visibility.
    pub fn set_visible(&self, visible: bool) {
        let _ = self.tx.send_replace(visible);
    }

    /// Receiver to hand to [`spawn_poller`].
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a running poller. Cancellation is idempotent.
#[derive(Debug)]
pub struct PollHandle {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl PollHandle {
    /// Stops the loop. Safe to call more than once.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
        }
    }

    /// Whether the loop has been told to stop.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Spawns a polling loop.
///
/// `fetch` runs immediately, then on the configured cadence. Each result is
/// handed to `on_result`: `Some` for a successful tick, and a single `None`
/// when the loop stops because the session became unauthorized. Transient
/// failures are logged and backed off without a callback.
#[must_use = "dropping the handle leaves the poller running with no way to stop it"]
pub fn spawn_poller<T, F, Fut, C>(
    config: PollConfig,
    visibility: Option<watch::Receiver<bool>>,
    mut fetch: F,
    mut on_result: C,
) -> PollHandle
where
    T: Send + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = std::result::Result<T, PollError>> + Send + 'static,
    C: FnMut(Option<T>) + Send + 'static,
{
    let cancelled = Arc::new(AtomicBool::new(false));
    let notify = Arc::new(Notify::new());
    let handle = PollHandle {
        cancelled: Arc::clone(&cancelled),
        notify: Arc::clone(&notify),
    };

    tokio::spawn(async move {
        let mut vis = visibility;
        let mut interval = config.interval;
        'outer: loop {
            if cancelled.load(Ordering::SeqCst) {
                break;
            }
            match fetch().await {
                Ok(value) => {
                    interval = config.interval;
                    on_result(Some(value));
                }
                Err(PollError::Unauthorized) => {
                    tracing::info!("poll unauthorized, stopping");
                    on_result(None);
                    break;
                }
                Err(PollError::Failed(reason)) => {
                    interval = next_interval(interval, config.max_interval);
                    tracing::warn!(reason, next = ?interval, "poll tick failed");
                }
            }
            if cancelled.load(Ordering::SeqCst) {
                break;
            }

            let hidden = vis
                .as_mut()
                .is_some_and(|rx| !*rx.borrow_and_update());
            let delay = if hidden {
                config.hidden_interval.max(interval)
            } else {
                interval
            };
            let sleep = tokio::time::sleep(delay);
            tokio::pin!(sleep);
            loop {
                tokio::select! {
                    () = &mut sleep => break,
                    () = notify.notified() => {
                        if cancelled.load(Ordering::SeqCst) {
                            break 'outer;
                        }
                    }
                    changed = visibility_changed(&mut vis) => {
                        if changed.is_err() {
                            // Publisher gone; treat the surface as visible.
                            vis = None;
                            continue;
                        }
                        let visible = vis.as_mut().is_none_or(|rx| *rx.borrow_and_update());
                        if visible && hidden {
                            // Back in view: fetch now rather than waiting out
                            // the stretched delay.
                            interval = config.interval;
                            break;
                        }
                        if !visible {
                            sleep
                                .as_mut()
                                .reset(tokio::time::Instant::now() + config.hidden_interval.max(interval));
                        }
                    }
                }
            }
        }
    });

    handle
}

async fn visibility_changed(
    vis: &mut Option<watch::Receiver<bool>>,
) -> std::result::Result<(), watch::error::RecvError> {
    match vis {
        Some(rx) => rx.changed().await,
        None => std::future::pending().await,
    }
}

fn next_interval(current: Duration, cap: Duration) -> Duration {
    current.saturating_mul(2).min(cap)
}
