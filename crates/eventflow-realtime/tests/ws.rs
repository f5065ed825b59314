//! Loopback tests for the WebSocket transport.
//!
//! A minimal in-process server accepts one connection, records the frames
//! the client sends, and pushes scripted events back.

#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use eventflow_realtime::{ClientEvent, Error, ServerEvent, Transport, WsTransport};

/// Accepts a single connection, forwards every text frame the client sends
/// to `frames`, and writes out each scripted push before closing.
async fn spawn_server(pushes: Vec<String>) -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (frames_tx, frames_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

        // First frame is always the auth handshake.
        if let Some(Ok(Message::Text(text))) = ws.next().await {
            let _ = frames_tx.send(text.to_string());
        }

        for push in pushes {
            ws.send(Message::Text(push.into())).await.unwrap();
        }

        // Relay whatever else the client emits. The connection also ends
        // when the test drops its receiver.
        loop {
            tokio::select! {
                frame = ws.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        if frames_tx.send(text.to_string()).is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                },
                () = frames_tx.closed() => break,
            }
        }
    });

    (addr, frames_rx)
}

fn endpoint(addr: SocketAddr) -> Url {
    Url::parse(&format!("ws://{addr}/realtime")).unwrap()
}

#[tokio::test]
async fn connect_sends_the_auth_handshake_first() {
    let (addr, mut frames) = spawn_server(Vec::new()).await;
    let mut transport = WsTransport::new(endpoint(addr), "session-token".to_string());

    transport.connect().await.unwrap();
    assert!(transport.is_connected());

    let auth = frames.recv().await.unwrap();
    let event: ClientEvent = serde_json::from_str(&auth).unwrap();
    assert_eq!(
        event,
        ClientEvent::Auth {
            token: "session-token".to_string(),
        }
    );

    transport.disconnect().await.unwrap();
    assert!(!transport.is_connected());
}

#[tokio::test]
async fn pushes_arrive_as_typed_events_and_unknown_ones_are_skipped() {
    let pushes = vec![
        // Unknown event name from a newer server; must not kill the stream.
        r#"{"event":"reaction:added","data":{"conversationId":"c1"}}"#.to_string(),
        r#"{"event":"new_message","data":{"conversationId":"c1","messageId":"m9","senderId":"u2"}}"#
            .to_string(),
    ];
    let (addr, _frames) = spawn_server(pushes).await;
    let mut transport = WsTransport::new(endpoint(addr), "session-token".to_string());
    transport.connect().await.unwrap();

    let event = transport.next_event().await.unwrap();
    match event {
        ServerEvent::NewMessage(payload) => {
            assert_eq!(payload.conversation_id, "c1");
            assert_eq!(payload.message_id, "m9");
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn emitted_events_reach_the_server_in_wire_shape() {
    let (addr, mut frames) = spawn_server(Vec::new()).await;
    let mut transport = WsTransport::new(endpoint(addr), "session-token".to_string());
    transport.connect().await.unwrap();
    let _auth = frames.recv().await.unwrap();

    transport
        .emit(&ClientEvent::SubscribeConversation {
            conversation_id: "c42".to_string(),
        })
        .await
        .unwrap();

    let frame = frames.recv().await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
    assert_eq!(value["event"], "subscribe_conversation");
    assert_eq!(value["data"]["conversationId"], "c42");
}

#[tokio::test]
async fn peer_going_away_surfaces_as_connection_lost() {
    let (addr, frames) = spawn_server(Vec::new()).await;
    let mut transport = WsTransport::new(endpoint(addr), "session-token".to_string());
    transport.connect().await.unwrap();

    // Dropping the receiver ends the server task, closing the socket.
    drop(frames);

    let err = transport.next_event().await.unwrap_err();
    assert!(matches!(err, Error::ConnectionLost(_)));
    assert!(!transport.is_connected());

    // Further reads fail fast instead of hanging.
    assert!(matches!(
        transport.next_event().await,
        Err(Error::NotConnected)
    ));
}
