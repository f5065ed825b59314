//! WebSocket implementation of [`Transport`].

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

use crate::event::{ClientEvent, ServerEvent};
use crate::transport::Transport;
use crate::{Error, Result};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket transport backed by tokio-tungstenite.
///
/// `connect` performs the handshake and emits the `auth` event; the server
/// drops unauthenticated connections itself, so no ack is awaited here.
pub struct WsTransport {
    url: Url,
    auth_token: String,
    stream: Option<WsStream>,
}

impl WsTransport {
    /// Creates a disconnected transport for the given endpoint.
    #[must_use]
    pub const fn new(url: Url, auth_token: String) -> Self {
        Self {
            url,
            auth_token,
            stream: None,
        }
    }

    /// Returns true if a connection is currently held.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn send_json(&mut self, event: &ClientEvent) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;
        let json = serde_json::to_string(event)?;
        stream.send(Message::Text(json.into())).await?;
        Ok(())
    }
}

impl Transport for WsTransport {
    async fn connect(&mut self) -> Result<()> {
        // Replace any previous connection rather than leaking it.
        if let Some(mut old) = self.stream.take() {
            let _ = old.close(None).await;
        }

        let (stream, _response) = connect_async(self.url.as_str()).await?;
        tracing::info!(url = %self.url, "real-time channel connected");
        self.stream = Some(stream);

        self.send_json(&ClientEvent::Auth {
            token: self.auth_token.clone(),
        })
        .await
    }

    async fn emit(&mut self, event: &ClientEvent) -> Result<()> {
        self.send_json(event).await
    }

    async fn next_event(&mut self) -> Result<ServerEvent> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => match serde_json::from_str(text.as_str()) {
                    Ok(event) => return Ok(event),
                    Err(e) => {
                        // Tolerate events this client version does not know.
                        tracing::debug!(error = %e, "skipping unrecognized push event");
                    }
                },
                // Pings are answered by tungstenite during the read.
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Binary(_))) => {}
                Some(Ok(Message::Close(frame))) => {
                    self.stream = None;
                    let reason = frame.map_or_else(String::new, |f| f.reason.to_string());
                    return Err(Error::ConnectionLost(reason));
                }
                Some(Ok(Message::Frame(_))) => {}
                Some(Err(e)) => {
                    self.stream = None;
                    return Err(Error::ConnectionLost(e.to_string()));
                }
                None => {
                    self.stream = None;
                    return Err(Error::ConnectionLost("stream ended".to_string()));
                }
            }
        }
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            // Best effort: the peer may already be gone.
            let _ = stream.close(None).await;
        }
        Ok(())
    }
}

impl std::fmt::Debug for WsTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsTransport")
            .field("url", &self.url.as_str())
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}
