//! Unread count aggregation and badge rendering.

use std::fmt;
use std::sync::{Arc, Mutex};

/// Receiver for badge updates.
///
/// Implementations render the badge however the surface requires. `animate`
/// is set only when the count actually changed, so repeated identical
/// updates never re-trigger an attention animation.
pub trait BadgeSink: Send {
    /// Renders the badge with the capped display label.
    fn render(&mut self, label: &str, visible: bool, animate: bool);
}

/// Single source of truth for the unread message count.
///
/// Any number of sinks may be attached; all of them receive every update.
/// A zero count hides the badge, and counts above 99 display as `99+`.
pub struct UnreadBadge {
    inner: Mutex<State>,
}

// Each sink has its own mutex so renders run with the state lock
// released. A sink is then free to read the badge back (`count`) from
// inside `render` without deadlocking.
#[derive(Default)]
struct State {
    count: u32,
    sinks: Vec<Arc<Mutex<Box<dyn BadgeSink>>>>,
}

impl UnreadBadge {
    /// Creates a badge with no sinks and a count of zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(State::default()),
        }
    }

    /// Attaches a sink and immediately renders the current state to it.
    pub fn attach(&self, sink: Box<dyn BadgeSink>) {
        let sink = Arc::new(Mutex::new(sink));
        let count = {
            let Ok(mut state) = self.inner.lock() else {
                return;
            };
            state.sinks.push(Arc::clone(&sink));
            state.count
        };
        if let Ok(mut sink) = sink.lock() {
            sink.render(&label(count), count > 0, false);
        }
    }

    /// Publishes a new count to every attached sink.
    pub fn update(&self, count: u32) {
        let (changed, sinks) = {
            let Ok(mut state) = self.inner.lock() else {
                return;
            };
            let changed = state.count != count;
            state.count = count;
            (changed, state.sinks.clone())
        };
        // State lock released; renders may call back into the badge.
        let text = label(count);
        for sink in sinks {
            if let Ok(mut sink) = sink.lock() {
                sink.render(&text, count > 0, changed);
            }
        }
    }

    /// Current count.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.inner.lock().map_or(0, |state| state.count)
    }
}

impl Default for UnreadBadge {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UnreadBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnreadBadge")
            .field("count", &self.count())
            .finish_non_exhaustive()
    }
}

fn label(count: u32) -> String {
    if count > 99 {
        "99+".to_string()
    } else {
        count.to_string()
    }
}
