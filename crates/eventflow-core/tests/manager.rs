//! Integration tests for the messaging manager.
//!
//! The transport and backend are scripted mocks, so every path through the
//! connect/online/offline lifecycle runs without a network.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::mpsc;
use tokio::time::timeout;

use eventflow_api::{
    BulkAction, BulkReceipt, BulkRequest, Conversation, Error as ApiError, Message,
    Result as ApiResult, Ticket, TicketStatus,
};
use eventflow_core::{
    ConnectionState, MessagingApi, MessagingConfig, MessagingManager, Notice, watch_user_tickets,
};
use eventflow_realtime::{
    ClientEvent, Error as RealtimeError, NewMessagePayload, Result as RealtimeResult, ServerEvent,
    Transport,
};

// --- scripted transport ----------------------------------------------------

struct MockTransport {
    connect_script: Arc<Mutex<VecDeque<bool>>>,
    connect_default: bool,
    events: mpsc::UnboundedReceiver<RealtimeResult<ServerEvent>>,
    emitted: Arc<Mutex<Vec<ClientEvent>>>,
}

#[derive(Clone)]
struct TransportControl {
    events: mpsc::UnboundedSender<RealtimeResult<ServerEvent>>,
    emitted: Arc<Mutex<Vec<ClientEvent>>>,
}

impl TransportControl {
    fn push_event(&self, event: ServerEvent) {
        self.events.send(Ok(event)).unwrap();
    }

    fn drop_connection(&self) {
        self.events
            .send(Err(RealtimeError::ConnectionLost("scripted drop".into())))
            .unwrap();
    }

    fn emitted(&self) -> Vec<ClientEvent> {
        self.emitted.lock().unwrap().clone()
    }

    fn subscribe_count(&self) -> usize {
        self.emitted()
            .iter()
            .filter(|event| matches!(event, ClientEvent::SubscribeConversation { .. }))
            .count()
    }

    fn unsubscribe_count(&self) -> usize {
        self.emitted()
            .iter()
            .filter(|event| matches!(event, ClientEvent::UnsubscribeConversation { .. }))
            .count()
    }
}

/// `connect_default` decides connect outcomes once the script runs out.
fn mock_transport(
    script: Vec<bool>,
    connect_default: bool,
) -> (MockTransport, TransportControl) {
    let connect_script = Arc::new(Mutex::new(VecDeque::from(script)));
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let (tx, rx) = mpsc::unbounded_channel();
    let transport = MockTransport {
        connect_script,
        connect_default,
        events: rx,
        emitted: Arc::clone(&emitted),
    };
    let control = TransportControl { events: tx, emitted };
    (transport, control)
}

impl Transport for MockTransport {
    async fn connect(&mut self) -> RealtimeResult<()> {
        let scripted = self.connect_script.lock().unwrap().pop_front();
        if scripted.unwrap_or(self.connect_default) {
            Ok(())
        } else {
            Err(RealtimeError::NotConnected)
        }
    }

    async fn emit(&mut self, event: &ClientEvent) -> RealtimeResult<()> {
        self.emitted.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn next_event(&mut self) -> RealtimeResult<ServerEvent> {
        match self.events.recv().await {
            Some(item) => item,
            None => Err(RealtimeError::ConnectionLost("script ended".into())),
        }
    }

    async fn disconnect(&mut self) -> RealtimeResult<()> {
        Ok(())
    }
}

// --- scripted backend ------------------------------------------------------

#[derive(Default)]
struct MockApi {
    messages: Mutex<Vec<Message>>,
    conversations: Mutex<Vec<Conversation>>,
    unread: AtomicU32,
    unauthorized: AtomicBool,
    message_fetches: AtomicUsize,
    reads: Mutex<Vec<String>>,
    undone: Mutex<Vec<(String, String)>>,
}

impl MockApi {
    fn check_session(&self) -> ApiResult<()> {
        if self.unauthorized.load(Ordering::SeqCst) {
            Err(ApiError::Status {
                status: 401,
                body: "session expired".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

impl MessagingApi for MockApi {
    async fn list_conversations(&self) -> ApiResult<Vec<Conversation>> {
        self.check_session()?;
        Ok(self.conversations.lock().unwrap().clone())
    }

    async fn conversation_messages(&self, _conversation_id: &str) -> ApiResult<Vec<Message>> {
        self.check_session()?;
        self.message_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.messages.lock().unwrap().clone())
    }

    async fn send_message(&self, conversation_id: &str, content: &str) -> ApiResult<Message> {
        self.check_session()?;
        Ok(message("sent", conversation_id, content, 0))
    }

    async fn mark_conversation_read(&self, conversation_id: &str) -> ApiResult<()> {
        self.check_session()?;
        self.reads.lock().unwrap().push(conversation_id.to_string());
        Ok(())
    }

    async fn unread_count(&self) -> ApiResult<u32> {
        self.check_session()?;
        Ok(self.unread.load(Ordering::SeqCst))
    }

    async fn bulk(&self, request: &BulkRequest) -> ApiResult<BulkReceipt> {
        self.check_session()?;
        Ok(BulkReceipt {
            operation_id: "op-1".to_string(),
            undo_token: "undo-op-1".to_string(),
            action: request.action,
            affected: u32::try_from(request.conversation_ids.len()).unwrap(),
        })
    }

    async fn undo_bulk(&self, operation_id: &str, undo_token: &str) -> ApiResult<()> {
        self.check_session()?;
        self.undone
            .lock()
            .unwrap()
            .push((operation_id.to_string(), undo_token.to_string()));
        Ok(())
    }

    async fn list_tickets(&self) -> ApiResult<Vec<Ticket>> {
        self.check_session()?;
        Ok(vec![ticket("t1")])
    }
}

// --- fixtures --------------------------------------------------------------

fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 2, 10, minute, 0).unwrap()
}

fn message(id: &str, conversation_id: &str, content: &str, minute: u32) -> Message {
    Message {
        id: id.to_string(),
        conversation_id: conversation_id.to_string(),
        sender_id: "u2".to_string(),
        content: content.to_string(),
        created_at: at(minute),
        read: false,
        attachments: Vec::new(),
    }
}

fn ticket(id: &str) -> Ticket {
    Ticket {
        id: id.to_string(),
        subject: "billing question".to_string(),
        status: TicketStatus::Open,
        created_at: at(0),
        updated_at: at(0),
        last_reply: None,
    }
}

fn fast_config() -> MessagingConfig {
    MessagingConfig {
        reconnect_attempts: 1,
        reconnect_delay: Duration::from_millis(20),
        fallback_interval: Duration::from_millis(50),
        cache_ttl: Duration::from_millis(200),
        typing_debounce: Duration::from_millis(50),
        typing_expiry: Duration::from_millis(100),
    }
}

const WAIT: Duration = Duration::from_secs(5);

async fn wait_until(mut condition: impl FnMut() -> bool) {
    timeout(WAIT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

// --- tests -----------------------------------------------------------------

#[tokio::test]
async fn new_message_push_refetches_over_http_in_server_order() {
    let api = Arc::new(MockApi::default());
    // Stored out of order; subscribers must see server time order.
    *api.messages.lock().unwrap() = vec![
        message("m2", "c1", "second", 5),
        message("m1", "c1", "first", 1),
    ];
    api.unread.store(4, Ordering::SeqCst);

    let (transport, control) = mock_transport(vec![true], false);
    let (manager, handle) = MessagingManager::new(Arc::clone(&api), transport, fast_config());

    let delivered: Arc<Mutex<Vec<Vec<String>>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&delivered);
    let _subscription = handle.subscribe("c1", move |messages| {
        sink.lock()
            .unwrap()
            .push(messages.iter().map(|m| m.id.clone()).collect());
    });

    tokio::spawn(manager.run());
    let mut state = handle.state();
    timeout(WAIT, state.wait_for(|s| *s == ConnectionState::Online))
        .await
        .unwrap()
        .unwrap();

    control.push_event(ServerEvent::NewMessage(NewMessagePayload {
        conversation_id: "c1".to_string(),
        message_id: "m2".to_string(),
        sender_id: "u2".to_string(),
    }));

    wait_until(|| !delivered.lock().unwrap().is_empty()).await;
    assert_eq!(
        delivered.lock().unwrap()[0],
        vec!["m1".to_string(), "m2".to_string()]
    );
    // The push itself carried no content; the mock backend served it.
    assert_eq!(api.message_fetches.load(Ordering::SeqCst), 1);
    wait_until(|| handle.unread_count() == 4).await;

    handle.shutdown();
}

#[tokio::test]
async fn connection_drop_falls_back_to_polling_and_notifies_once() {
    let api = Arc::new(MockApi::default());
    *api.messages.lock().unwrap() = vec![message("m1", "c1", "hello", 1)];

    // Reconnects succeed, so the manager cycles offline -> online -> offline.
    let (transport, control) = mock_transport(Vec::new(), true);
    let (manager, handle) = MessagingManager::new(Arc::clone(&api), transport, fast_config());

    let deliveries = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&deliveries);
    let _subscription = handle.subscribe("c1", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let mut notices = handle.notices();
    tokio::spawn(manager.run());
    let mut state = handle.state();
    timeout(WAIT, state.wait_for(|s| *s == ConnectionState::Online))
        .await
        .unwrap()
        .unwrap();

    control.drop_connection();
    // Polling serves the feed without any further pushes; a delivery can
    // only come from an offline poller here.
    wait_until(|| deliveries.load(Ordering::SeqCst) > 0).await;

    // A full reconnect-then-drop cycle must not repeat the notice.
    timeout(WAIT, state.wait_for(|s| *s == ConnectionState::Online))
        .await
        .unwrap()
        .unwrap();
    let before = deliveries.load(Ordering::SeqCst);
    control.drop_connection();
    wait_until(|| deliveries.load(Ordering::SeqCst) > before).await;

    let mut seen_fallback = 0;
    while let Ok(notice) = notices.try_recv() {
        if notice == Notice::SwitchedToPolling {
            seen_fallback += 1;
        }
    }
    assert_eq!(seen_fallback, 1, "fallback notice repeated");

    handle.shutdown();
}

#[tokio::test]
async fn reconnect_replays_active_subscriptions() {
    let api = Arc::new(MockApi::default());
    let (transport, control) = mock_transport(Vec::new(), true);
    let (manager, handle) = MessagingManager::new(Arc::clone(&api), transport, fast_config());

    let _subscription = handle.subscribe("c1", |_| {});

    tokio::spawn(manager.run());
    let mut state = handle.state();
    timeout(WAIT, state.wait_for(|s| *s == ConnectionState::Online))
        .await
        .unwrap()
        .unwrap();
    // One emission from the subscription replay at online entry, one from
    // draining the queued subscribe request.
    wait_until(|| control.subscribe_count() >= 2).await;
    let before = control.subscribe_count();

    control.drop_connection();
    // Reconnect succeeds on the first offline attempt and replays the feed.
    timeout(WAIT, async {
        loop {
            if control.subscribe_count() > before {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();

    assert_eq!(*state.borrow_and_update(), ConnectionState::Online);
    handle.shutdown();
}

#[tokio::test]
async fn cancelling_a_subscription_twice_unsubscribes_once() {
    let api = Arc::new(MockApi::default());
    let (transport, control) = mock_transport(Vec::new(), true);
    let (manager, handle) = MessagingManager::new(Arc::clone(&api), transport, fast_config());
    tokio::spawn(manager.run());
    let mut state = handle.state();
    timeout(WAIT, state.wait_for(|s| *s == ConnectionState::Online))
        .await
        .unwrap()
        .unwrap();

    let subscription = handle.subscribe("c1", |_| {});
    wait_until(|| control.subscribe_count() >= 1).await;

    subscription.cancel();
    subscription.cancel();

    wait_until(|| control.unsubscribe_count() >= 1).await;
    // A grace period so a duplicate emission would have surfaced.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(control.unsubscribe_count(), 1);
    assert!(subscription.is_cancelled());
    handle.shutdown();
}

#[tokio::test]
async fn mark_read_echoes_on_the_socket_and_refreshes_the_badge() {
    let api = Arc::new(MockApi::default());
    api.unread.store(2, Ordering::SeqCst);

    let (transport, control) = mock_transport(vec![true], false);
    let (manager, handle) = MessagingManager::new(Arc::clone(&api), transport, fast_config());
    tokio::spawn(manager.run());
    let mut state = handle.state();
    timeout(WAIT, state.wait_for(|s| *s == ConnectionState::Online))
        .await
        .unwrap()
        .unwrap();

    api.unread.store(0, Ordering::SeqCst);
    handle.mark_read("c1").await.unwrap();

    assert_eq!(api.reads.lock().unwrap().as_slice(), ["c1".to_string()]);
    assert_eq!(handle.unread_count(), 0);
    wait_until(|| {
        control
            .emitted()
            .iter()
            .any(|event| matches!(event, ClientEvent::ConversationRead { conversation_id } if conversation_id == "c1"))
    })
    .await;

    handle.shutdown();
}

#[tokio::test]
async fn typing_storm_collapses_to_one_start_and_one_auto_stop() {
    let api = Arc::new(MockApi::default());
    let (transport, control) = mock_transport(vec![true], false);
    let (manager, handle) = MessagingManager::new(Arc::clone(&api), transport, fast_config());
    tokio::spawn(manager.run());
    let mut state = handle.state();
    timeout(WAIT, state.wait_for(|s| *s == ConnectionState::Online))
        .await
        .unwrap()
        .unwrap();

    for _ in 0..5 {
        handle.set_typing("c1", true);
    }

    let typing_events = |control: &TransportControl| {
        control
            .emitted()
            .into_iter()
            .filter_map(|event| match event {
                ClientEvent::Typing { is_typing, .. } => Some(is_typing),
                _ => None,
            })
            .collect::<Vec<bool>>()
    };

    // One start immediately, one stop once the silence window passes.
    wait_until(|| typing_events(&control) == vec![true, false]).await;

    handle.shutdown();
}

#[tokio::test]
async fn bulk_operations_are_undoable_exactly_once() {
    let api = Arc::new(MockApi::default());
    let (transport, _control) = mock_transport(vec![true], false);
    let (manager, handle) = MessagingManager::new(Arc::clone(&api), transport, fast_config());
    tokio::spawn(manager.run());

    let operation_id = handle
        .bulk(
            vec!["c1".to_string(), "c2".to_string()],
            BulkAction::Archive,
        )
        .await
        .unwrap();
    assert_eq!(operation_id, "op-1");
    assert_eq!(handle.undoable().len(), 1);

    assert!(handle.undo(&operation_id).await.unwrap());
    assert_eq!(
        api.undone.lock().unwrap().as_slice(),
        [("op-1".to_string(), "undo-op-1".to_string())]
    );

    // The token was consumed; a second undo is a no-op.
    assert!(!handle.undo(&operation_id).await.unwrap());

    handle.shutdown();
}

#[tokio::test]
async fn expired_session_ends_ticket_polling_with_one_empty_update() {
    let api = Arc::new(MockApi::default());
    api.unauthorized.store(true, Ordering::SeqCst);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _handle = watch_user_tickets(Arc::clone(&api), None, move |tickets| {
        tx.send(tickets).unwrap();
    });

    let first = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert!(first.is_empty());
    // The loop stopped for good; the channel closes with no more updates.
    assert!(timeout(WAIT, rx.recv()).await.unwrap().is_none());
}

#[tokio::test]
async fn healthy_session_keeps_delivering_ticket_updates() {
    let api = Arc::new(MockApi::default());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = watch_user_tickets(Arc::clone(&api), None, move |tickets| {
        tx.send(tickets).unwrap();
    });

    let first = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(first[0].id, "t1");
    handle.cancel();
}
