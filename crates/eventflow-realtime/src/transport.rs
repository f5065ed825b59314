//! Transport abstraction for the real-time channel.
//!
//! The messaging manager is written against [`Transport`] rather than a
//! concrete socket so the concrete implementation is chosen at application
//! wiring time and tests can script a mock.

use crate::event::{ClientEvent, ServerEvent};
use crate::{Error, Result};

/// A bidirectional real-time connection.
///
/// Implementations own a single connection. `connect` establishes it and
/// performs the authentication handshake; `next_event` resolves with the
/// next server push. Any `next_event` error is the disconnect signal — the
/// caller decides whether to reconnect or fall back to polling.
pub trait Transport: Send + 'static {
    /// Establishes the connection and authenticates.
    ///
    /// Calling `connect` on an already-connected transport replaces the
    /// old connection.
    fn connect(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Emits a client event.
    fn emit(&mut self, event: &ClientEvent) -> impl Future<Output = Result<()>> + Send;

    /// Waits for the next server push.
    ///
    /// Resolves with [`Error::ConnectionLost`] when the peer closes or the
    /// connection drops.
    fn next_event(&mut self) -> impl Future<Output = Result<ServerEvent>> + Send;

    /// Severs the connection. Safe to call when already disconnected.
    fn disconnect(&mut self) -> impl Future<Output = Result<()>> + Send;
}

/// A transport that never connects.
///
/// Useful for API-only deployments: the manager immediately falls back to
/// polling and stays there.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTransport;

impl Transport for NullTransport {
    async fn connect(&mut self) -> Result<()> {
        Err(Error::NotConnected)
    }

    async fn emit(&mut self, _event: &ClientEvent) -> Result<()> {
        Err(Error::NotConnected)
    }

    async fn next_event(&mut self) -> Result<ServerEvent> {
        Err(Error::NotConnected)
    }

    async fn disconnect(&mut self) -> Result<()> {
        Ok(())
    }
}
