//! Typing presence, inbound and outbound.
//!
//! Inbound status from other participants is held per conversation and
//! expires on its own after a short window, so a peer that disconnects
//! mid-keystroke never leaves a stuck indicator. Outbound emissions are
//! debounced so keystroke storms collapse to at most one start signal per
//! debounce window.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

/// How long a received typing signal stays visible without a refresh.
pub const TYPING_EXPIRY: Duration = Duration::from_secs(3);

/// Minimum gap between two identical outbound typing emissions.
pub const TYPING_DEBOUNCE: Duration = Duration::from_secs(1);

/// Tracks who is typing in each conversation and throttles what we send.
#[derive(Debug)]
pub struct TypingTracker {
    expiry: Duration,
    debounce: Duration,
    inner: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    inbound: HashMap<String, HashMap<String, TypingRecord>>,
    outbound: HashMap<String, OutboundRecord>,
}

#[derive(Debug)]
struct TypingRecord {
    display_name: String,
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct OutboundRecord {
    last_start: Option<Instant>,
    last_stop: Option<Instant>,
    generation: u64,
}

impl TypingTracker {
    /// Creates a tracker with the given inbound expiry and outbound debounce.
    #[must_use]
    pub fn new(expiry: Duration, debounce: Duration) -> Self {
        Self {
            expiry,
            debounce,
            inner: Mutex::new(State::default()),
        }
    }

    /// Records a peer's typing status.
    pub fn apply(&self, conversation_id: &str, user_id: &str, display_name: &str, is_typing: bool) {
        let Ok(mut state) = self.inner.lock() else {
            return;
        };
        if is_typing {
            state
                .inbound
                .entry(conversation_id.to_string())
                .or_default()
                .insert(
                    user_id.to_string(),
                    TypingRecord {
                        display_name: display_name.to_string(),
                        expires_at: Instant::now() + self.expiry,
                    },
                );
        } else if let Some(users) = state.inbound.get_mut(conversation_id) {
            users.remove(user_id);
            if users.is_empty() {
                state.inbound.remove(conversation_id);
            }
        }
    }

    /// Display names of peers currently typing, expired entries pruned.
    #[must_use]
    pub fn typing_users(&self, conversation_id: &str) -> Vec<String> {
        let Ok(mut state) = self.inner.lock() else {
            return Vec::new();
        };
        let now = Instant::now();
        let Some(users) = state.inbound.get_mut(conversation_id) else {
            return Vec::new();
        };
        users.retain(|_, record| record.expires_at > now);
        let mut names: Vec<String> = users
            .values()
            .map(|record| record.display_name.clone())
            .collect();
        if users.is_empty() {
            state.inbound.remove(conversation_id);
        }
        names.sort_unstable();
        names
    }

    /// Whether an outbound signal should actually go on the wire.
    ///
    /// An identical signal inside the debounce window is suppressed. A
    /// permitted signal stamps the window, so callers must only call this
    /// when they intend to emit.
    pub fn should_emit(&self, conversation_id: &str, is_typing: bool) -> bool {
        let Ok(mut state) = self.inner.lock() else {
            return false;
        };
        let record = state
            .outbound
            .entry(conversation_id.to_string())
            .or_default();
        let now = Instant::now();
        let last = if is_typing {
            &mut record.last_start
        } else {
            &mut record.last_stop
        };
        match *last {
            Some(at) if now.duration_since(at) < self.debounce => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }

    /// Advances the auto-stop generation for a conversation and returns it.
    ///
    /// Each keystroke bumps the generation; a scheduled auto-stop only fires
    /// if no later keystroke has bumped past its generation.
    pub fn bump_generation(&self, conversation_id: &str) -> u64 {
        let Ok(mut state) = self.inner.lock() else {
            return 0;
        };
        let record = state
            .outbound
            .entry(conversation_id.to_string())
            .or_default();
        record.generation += 1;
        record.generation
    }

    /// Current auto-stop generation for a conversation.
    #[must_use]
    pub fn generation(&self, conversation_id: &str) -> u64 {
        let Ok(state) = self.inner.lock() else {
            return 0;
        };
        state
            .outbound
            .get(conversation_id)
            .map_or(0, |record| record.generation)
    }
}

impl Default for TypingTracker {
    fn default() -> Self {
        Self::new(TYPING_EXPIRY, TYPING_DEBOUNCE)
    }
}
