//! # eventflow-core
//!
//! Messaging orchestration for the `EventFlow` client.
//!
//! This crate provides:
//! - Connection lifecycle management with automatic polling fallback
//! - Conversation and message subscriptions that survive transport changes
//! - A TTL-bounded conversation list cache
//! - Typing presence with debounced outbound signals
//! - Unread badge aggregation
//! - Undo-able bulk conversation operations
//! - Support ticket polling
//! - Durable UI preferences (`SQLite`)
//!
//! The entry point is [`MessagingManager`]: it owns a
//! [`Transport`](eventflow_realtime::Transport) and a backend implementing
//! [`MessagingApi`], and callers hold a [`MessagingHandle`] that works the
//! same whether pushes are flowing or polling has taken over.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod api;
mod cache;
mod error;
mod manager;
mod poll;
mod prefs;
mod subscription;
mod tickets;
mod typing;
mod undo;
mod unread;

pub use api::MessagingApi;
pub use cache::ConversationCache;
pub use error::{Error, Result};
pub use manager::{
    ConnectionState, MessagingConfig, MessagingHandle, MessagingManager, Notice,
    SubscriptionHandle,
};
pub use poll::{PollConfig, PollError, PollHandle, Visibility, spawn_poller};
pub use prefs::{ConversationSort, PreferenceRepository};
pub use tickets::{
    TICKET_POLL_HIDDEN_INTERVAL, TICKET_POLL_INTERVAL, TICKET_POLL_MAX_INTERVAL,
    watch_user_tickets,
};
pub use typing::{TYPING_DEBOUNCE, TYPING_EXPIRY, TypingTracker};
pub use undo::{UNDO_WINDOW, UndoLedger, UndoableOperation};
pub use unread::{BadgeSink, UnreadBadge};
