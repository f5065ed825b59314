//! Subscriber registry for conversation feeds and the conversation list.
//!
//! The registry only stores callbacks; wire subscription and fallback
//! polling are driven by the manager, which consults
//! [`SubscriptionRegistry::active_conversations`] to know which feeds need
//! a live source at any moment.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use eventflow_api::{Conversation, Message};

pub(crate) type MessageCallback = Box<dyn FnMut(&[Message]) + Send>;
pub(crate) type ListCallback = Box<dyn FnMut(&[Conversation]) + Send>;

pub(crate) struct SubscriptionRegistry {
    inner: Mutex<Inner>,
}

// Callbacks are stored behind their own mutex so notify can release the
// registry lock before invoking them. A callback is then free to call
// back into the registry (a subscription cancelling itself, for one)
// without deadlocking.
#[derive(Default)]
struct Inner {
    next_id: u64,
    conversations: HashMap<String, Vec<(u64, Arc<Mutex<MessageCallback>>)>>,
    list: Vec<(u64, Arc<Mutex<ListCallback>>)>,
}

impl SubscriptionRegistry {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    pub(crate) fn add(&self, conversation_id: &str, callback: MessageCallback) -> u64 {
        let Ok(mut inner) = self.inner.lock() else {
            return 0;
        };
        inner.next_id += 1;
        let id = inner.next_id;
        inner
            .conversations
            .entry(conversation_id.to_string())
            .or_default()
            .push((id, Arc::new(Mutex::new(callback))));
        id
    }

    pub(crate) fn add_list(&self, callback: ListCallback) -> u64 {
        let Ok(mut inner) = self.inner.lock() else {
            return 0;
        };
        inner.next_id += 1;
        let id = inner.next_id;
        inner.list.push((id, Arc::new(Mutex::new(callback))));
        id
    }

    /// Removes a conversation subscriber. Returns true when that
    /// conversation has no subscribers left.
    pub(crate) fn remove(&self, conversation_id: &str, id: u64) -> bool {
        let Ok(mut inner) = self.inner.lock() else {
            return false;
        };
        let Some(subscribers) = inner.conversations.get_mut(conversation_id) else {
            return false;
        };
        subscribers.retain(|(subscriber_id, _)| *subscriber_id != id);
        if subscribers.is_empty() {
            inner.conversations.remove(conversation_id);
            true
        } else {
            false
        }
    }

    pub(crate) fn remove_list(&self, id: u64) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.list.retain(|(subscriber_id, _)| *subscriber_id != id);
        }
    }

    pub(crate) fn notify(&self, conversation_id: &str, messages: &[Message]) {
        let callbacks: Vec<_> = match self.inner.lock() {
            Ok(inner) => inner
                .conversations
                .get(conversation_id)
                .map(|subscribers| {
                    subscribers
                        .iter()
                        .map(|(_, callback)| Arc::clone(callback))
                        .collect()
                })
                .unwrap_or_default(),
            Err(_) => return,
        };
        // Registry lock released above; re-entrant registry calls from a
        // callback are fine.
        for callback in callbacks {
            if let Ok(mut callback) = callback.lock() {
                callback(messages);
            }
        }
    }

    pub(crate) fn notify_list(&self, conversations: &[Conversation]) {
        let callbacks: Vec<_> = match self.inner.lock() {
            Ok(inner) => inner
                .list
                .iter()
                .map(|(_, callback)| Arc::clone(callback))
                .collect(),
            Err(_) => return,
        };
        for callback in callbacks {
            if let Ok(mut callback) = callback.lock() {
                callback(conversations);
            }
        }
    }

    pub(crate) fn active_conversations(&self) -> Vec<String> {
        self.inner.lock().map_or_else(
            |_| Vec::new(),
            |inner| inner.conversations.keys().cloned().collect(),
        )
    }

    pub(crate) fn has_subscribers(&self, conversation_id: &str) -> bool {
        self.inner
            .lock()
            .is_ok_and(|inner| inner.conversations.contains_key(conversation_id))
    }
}

impl fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("conversations", &self.active_conversations())
            .finish_non_exhaustive()
    }
}
