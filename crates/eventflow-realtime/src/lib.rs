//! # eventflow-realtime
//!
//! Typed real-time channel for the `EventFlow` messaging client.
//!
//! This crate owns the wire vocabulary of the push channel and nothing
//! else: typed client/server events with their JSON envelope, a
//! [`Transport`] trait the orchestration layer is written against, and a
//! WebSocket implementation.
//!
//! ## Wire format
//!
//! Every frame is a JSON envelope:
//!
//! ```text
//! {"event": "typing:status", "data": {"conversationId": "c1", ...}}
//! ```
//!
//! Inbound events: `new_message`, `conversation:updated`, `typing:status`,
//! `message:read`. Outbound events: `auth`, `subscribe_conversation`,
//! `unsubscribe_conversation`, `typing`, `message:send`,
//! `conversation:read`.
//!
//! ## Disconnect semantics
//!
//! A transport never reconnects on its own. Any [`Transport::next_event`]
//! error means the connection is gone; the caller (the messaging manager
//! in `eventflow-core`) decides between reconnecting and polling fallback.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
pub mod event;
mod transport;
mod ws;

pub use error::{Error, Result};
pub use event::{
    ClientEvent, ConversationUpdatedPayload, MessageReadPayload, NewMessagePayload, ServerEvent,
    TypingStatusPayload,
};
pub use transport::{NullTransport, Transport};
pub use ws::WsTransport;
