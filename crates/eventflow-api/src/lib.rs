//! # eventflow-api
//!
//! Authenticated REST layer for the `EventFlow` messaging client.
//!
//! This crate wraps the HTTP client with the cross-cutting concerns every
//! API caller shares:
//!
//! - **CSRF handling**: mutating verbs carry an `X-CSRF-Token` header,
//!   sourced from an in-memory cache, the `XSRF-TOKEN` cookie, or the
//!   token endpoint. Token rotation is transparent: one refresh-and-replay
//!   on a CSRF-rejected 403, invisible to callers.
//! - **Retry with backoff**: transient failures (network errors, 5xx, 408,
//!   429) are retried with exponential backoff and up to 30% jitter, capped
//!   at a maximum delay. An `x-no-retry` response header short-circuits.
//! - **Typed endpoints**: conversations, messages, unread counts, bulk
//!   operations with undo receipts, and support tickets.
//!
//! Validation failures (blank message content, blank ticket fields) are
//! caught before any network call and surface as [`Error::Validation`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
mod conversations;
mod csrf;
mod error;
pub mod model;
mod retry;
mod tickets;

pub use client::ApiClient;
pub use csrf::CSRF_HEADER;
pub use error::{Error, Result, retriable_status};
pub use model::{
    Attachment, BulkAction, BulkReceipt, BulkRequest, Conversation, LastMessage, Message,
    NewTicket, Participant, Ticket, TicketStatus, UnreadCount,
};
pub use retry::RetryPolicy;
