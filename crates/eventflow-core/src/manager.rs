//! Connection lifecycle and messaging orchestration.
//!
//! [`MessagingManager`] owns the real-time transport and drives a three
//! phase loop: connect with a bounded retry budget, serve pushes while
//! online, and fall back to HTTP polling while offline. Pushes carry
//! identifiers only; message content is always re-fetched over HTTP so the
//! REST backend stays the single source of truth.
//!
//! Callers interact through the cheap-to-clone [`MessagingHandle`], which
//! works identically in every phase.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::Instant;

use eventflow_api::{BulkAction, BulkRequest, Conversation, Message};
use eventflow_realtime::{ClientEvent, ServerEvent, Transport};

use crate::Result;
use crate::api::MessagingApi;
use crate::cache::ConversationCache;
use crate::poll::{PollConfig, PollError, PollHandle, spawn_poller};
use crate::subscription::SubscriptionRegistry;
use crate::typing::{TYPING_DEBOUNCE, TYPING_EXPIRY, TypingTracker};
use crate::undo::{UndoLedger, UndoableOperation};
use crate::unread::{BadgeSink, UnreadBadge};

/// Where the manager currently sources message data from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Establishing the real-time connection.
    Connecting,
    /// Real-time pushes are flowing.
    Online,
    /// Real-time channel is down; polling carries the load.
    Offline,
}

/// Ambient notifications surfaces may subscribe to.
///
/// Delivered over a broadcast channel; a surface that is not listening
/// simply misses them, which is always safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The real-time channel gave up and polling took over.
    SwitchedToPolling,
    /// Typing presence changed in a conversation.
    TypingChanged {
        /// Conversation whose presence changed.
        conversation_id: String,
    },
    /// A peer read a conversation.
    ReadObserved {
        /// Conversation that was read.
        conversation_id: String,
        /// Peer who read it.
        user_id: String,
    },
    /// The real-time connection failed. Non-fatal; recovery is automatic.
    ConnectionError(String),
}

/// Tuning knobs for the manager.
#[derive(Debug, Clone, Copy)]
pub struct MessagingConfig {
    /// Reconnect attempts per budget cycle.
    pub reconnect_attempts: u32,
    /// Base reconnect delay; attempt `n` waits `n` times this.
    pub reconnect_delay: Duration,
    /// Polling cadence while offline.
    pub fallback_interval: Duration,
    /// Conversation list cache TTL.
    pub cache_ttl: Duration,
    /// Minimum gap between identical outbound typing signals.
    pub typing_debounce: Duration,
    /// Silence after which an outbound typing signal auto-stops.
    pub typing_expiry: Duration,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            reconnect_attempts: 5,
            reconnect_delay: Duration::from_secs(2),
            fallback_interval: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(30),
            typing_debounce: TYPING_DEBOUNCE,
            typing_expiry: TYPING_EXPIRY,
        }
    }
}

/// State shared between the manager task and every handle.
struct Shared<A> {
    api: Arc<A>,
    config: MessagingConfig,
    cache: ConversationCache,
    typing: TypingTracker,
    unread: UnreadBadge,
    undo: UndoLedger,
    registry: SubscriptionRegistry,
    state_tx: watch::Sender<ConnectionState>,
    notice_tx: broadcast::Sender<Notice>,
    outbound_tx: mpsc::UnboundedSender<ClientEvent>,
    shutdown_tx: watch::Sender<bool>,
}

impl<A> Shared<A> {
    fn set_state(&self, state: ConnectionState) {
        let _ = self.state_tx.send_replace(state);
    }

    fn notify(&self, notice: Notice) {
        let _ = self.notice_tx.send(notice);
    }

    fn enqueue(&self, event: ClientEvent) {
        let _ = self.outbound_tx.send(event);
    }
}

enum Phase {
    Connect,
    Online,
    Offline,
    Shutdown,
}

enum OfflineWait {
    Elapsed,
    Shutdown,
}

/// Owns the transport and drives the connection lifecycle.
///
/// Construct with [`MessagingManager::new`], hand the returned
/// [`MessagingHandle`] to callers, and spawn [`MessagingManager::run`].
pub struct MessagingManager<T, A> {
    transport: T,
    shared: Arc<Shared<A>>,
    outbound_rx: mpsc::UnboundedReceiver<ClientEvent>,
    shutdown_rx: watch::Receiver<bool>,
    visibility: Option<watch::Receiver<bool>>,
    conversation_pollers: HashMap<String, PollHandle>,
    list_poller: Option<PollHandle>,
    /// Set on the first offline transition and never cleared; the
    /// fallback notice fires once per manager lifetime.
    offline_notice_shown: bool,
}

impl<T, A> MessagingManager<T, A>
where
    T: Transport,
    A: MessagingApi,
{
    /// Creates a manager and its caller-facing handle.
    pub fn new(api: Arc<A>, transport: T, config: MessagingConfig) -> (Self, MessagingHandle<A>) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(ConnectionState::Connecting);
        let (notice_tx, _) = broadcast::channel(64);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let shared = Arc::new(Shared {
            api,
            config,
            cache: ConversationCache::new(config.cache_ttl),
            typing: TypingTracker::new(config.typing_expiry, config.typing_debounce),
            unread: UnreadBadge::new(),
            undo: UndoLedger::new(),
            registry: SubscriptionRegistry::new(),
            state_tx,
            notice_tx,
            outbound_tx,
            shutdown_tx,
        });

        let handle = MessagingHandle {
            shared: Arc::clone(&shared),
        };
        let manager = Self {
            transport,
            shared,
            outbound_rx,
            shutdown_rx,
            visibility: None,
            conversation_pollers: HashMap::new(),
            list_poller: None,
            offline_notice_shown: false,
        };
        (manager, handle)
    }

    /// Ties fallback polling cadence to document visibility.
    #[must_use]
    pub fn with_visibility(mut self, visibility: watch::Receiver<bool>) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Drives the connection until [`MessagingHandle::shutdown`] is called.
    pub async fn run(mut self) {
        let mut phase = Phase::Connect;
        loop {
            phase = match phase {
                Phase::Connect => self.connect_phase().await,
                Phase::Online => self.online_phase().await,
                Phase::Offline => self.offline_phase().await,
                Phase::Shutdown => break,
            };
        }
        self.stop_fallback_pollers();
        let _ = self.transport.disconnect().await;
        self.shared.set_state(ConnectionState::Offline);
        tracing::info!("messaging manager stopped");
    }

    async fn connect_phase(&mut self) -> Phase {
        self.shared.set_state(ConnectionState::Connecting);
        let mut last_error = String::new();
        for attempt in 1..=self.shared.config.reconnect_attempts {
            match self.transport.connect().await {
                Ok(()) => return Phase::Online,
                Err(err) => {
                    tracing::warn!(attempt, error = %err, "real-time connect failed");
                    last_error = err.to_string();
                }
            }
            if attempt < self.shared.config.reconnect_attempts {
                let delay = self.shared.config.reconnect_delay * attempt;
                if self.sleep_or_shutdown(delay).await {
                    return Phase::Shutdown;
                }
            }
        }
        self.shared.notify(Notice::ConnectionError(last_error));
        Phase::Offline
    }

    async fn online_phase(&mut self) -> Phase {
        self.stop_fallback_pollers();

        // Replay active subscriptions; the server treats them as idempotent.
        for conversation_id in self.shared.registry.active_conversations() {
            let event = ClientEvent::SubscribeConversation { conversation_id };
            if let Err(err) = self.transport.emit(&event).await {
                tracing::warn!(error = %err, "subscription replay failed");
                return Phase::Offline;
            }
        }

        self.shared.set_state(ConnectionState::Online);
        tracing::info!("real-time channel online");
        self.refresh_unread().await;

        enum Step {
            Inbound(eventflow_realtime::Result<ServerEvent>),
            Outbound(Option<ClientEvent>),
            Shutdown,
        }

        loop {
            let step = tokio::select! {
                event = self.transport.next_event() => Step::Inbound(event),
                event = self.outbound_rx.recv() => Step::Outbound(event),
                _ = self.shutdown_rx.changed() => Step::Shutdown,
            };
            match step {
                Step::Shutdown | Step::Outbound(None) => return Phase::Shutdown,
                Step::Inbound(Ok(event)) => self.handle_push(event).await,
                Step::Inbound(Err(err)) => {
                    tracing::warn!(error = %err, "real-time connection lost");
                    self.shared.notify(Notice::ConnectionError(err.to_string()));
                    return Phase::Offline;
                }
                Step::Outbound(Some(event)) => {
                    if let Err(err) = self.transport.emit(&event).await {
                        tracing::warn!(error = %err, "emit failed");
                        return Phase::Offline;
                    }
                }
            }
        }
    }

    async fn offline_phase(&mut self) -> Phase {
        let _ = self.transport.disconnect().await;
        self.shared.set_state(ConnectionState::Offline);
        if !self.offline_notice_shown {
            self.offline_notice_shown = true;
            self.shared.notify(Notice::SwitchedToPolling);
        }
        self.start_fallback_pollers();

        loop {
            for attempt in 1..=self.shared.config.reconnect_attempts {
                let delay = self.shared.config.reconnect_delay * attempt;
                if matches!(self.offline_wait(delay).await, OfflineWait::Shutdown) {
                    return Phase::Shutdown;
                }
                match self.transport.connect().await {
                    Ok(()) => return Phase::Online,
                    Err(err) => {
                        tracing::warn!(attempt, error = %err, "reconnect attempt failed");
                    }
                }
            }
            // Budget exhausted; polling carries the load until the next cycle.
            let pause = self.shared.config.fallback_interval;
            if matches!(self.offline_wait(pause).await, OfflineWait::Shutdown) {
                return Phase::Shutdown;
            }
        }
    }

    /// Waits out `delay` while servicing outbound subscription changes.
    async fn offline_wait(&mut self, delay: Duration) -> OfflineWait {
        enum Step {
            Elapsed,
            Outbound(Option<ClientEvent>),
            Shutdown,
        }

        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            let step = tokio::select! {
                () = &mut sleep => Step::Elapsed,
                event = self.outbound_rx.recv() => Step::Outbound(event),
                _ = self.shutdown_rx.changed() => Step::Shutdown,
            };
            match step {
                Step::Elapsed => return OfflineWait::Elapsed,
                Step::Shutdown | Step::Outbound(None) => return OfflineWait::Shutdown,
                Step::Outbound(Some(event)) => self.handle_offline_outbound(event),
            }
        }
    }

    /// Returns true when shutdown was requested during the sleep.
    async fn sleep_or_shutdown(&mut self, delay: Duration) -> bool {
        tokio::select! {
            () = tokio::time::sleep(delay) => false,
            _ = self.shutdown_rx.changed() => true,
        }
    }

    async fn handle_push(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::NewMessage(payload) => {
                // The push names the conversation; content and order come
                // from the authoritative HTTP fetch.
                match self
                    .shared
                    .api
                    .conversation_messages(&payload.conversation_id)
                    .await
                {
                    Ok(mut messages) => {
                        sort_messages(&mut messages);
                        self.shared
                            .registry
                            .notify(&payload.conversation_id, &messages);
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "message re-fetch after push failed");
                    }
                }
                self.shared.cache.invalidate();
                self.refresh_unread().await;
            }
            ServerEvent::ConversationUpdated(_) => {
                self.shared.cache.invalidate();
                self.refresh_conversation_list().await;
            }
            ServerEvent::TypingStatus(payload) => {
                self.shared.typing.apply(
                    &payload.conversation_id,
                    &payload.user_id,
                    &payload.display_name,
                    payload.is_typing,
                );
                self.shared.notify(Notice::TypingChanged {
                    conversation_id: payload.conversation_id,
                });
            }
            ServerEvent::MessageRead(payload) => {
                self.shared.cache.invalidate();
                self.shared.notify(Notice::ReadObserved {
                    conversation_id: payload.conversation_id,
                    user_id: payload.user_id,
                });
            }
        }
    }

    fn handle_offline_outbound(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::SubscribeConversation { conversation_id } => {
                self.spawn_conversation_poller(&conversation_id);
            }
            ClientEvent::UnsubscribeConversation { conversation_id } => {
                if let Some(handle) = self.conversation_pollers.remove(&conversation_id) {
                    handle.cancel();
                }
            }
            // Presence and read echoes are meaningless without a connection.
            _ => {}
        }
    }

    async fn refresh_unread(&self) {
        match self.shared.api.unread_count().await {
            Ok(count) => self.shared.unread.update(count),
            Err(err) => tracing::warn!(error = %err, "unread refresh failed"),
        }
    }

    async fn refresh_conversation_list(&self) {
        let api = Arc::clone(&self.shared.api);
        match self
            .shared
            .cache
            .get_with(move || async move { api.list_conversations().await })
            .await
        {
            Ok(conversations) => self.shared.registry.notify_list(&conversations),
            Err(err) => tracing::warn!(error = %err, "conversation list refresh failed"),
        }
    }

    fn fallback_poll_config(&self) -> PollConfig {
        let interval = self.shared.config.fallback_interval;
        PollConfig::default()
            .interval(interval)
            .max_interval(interval * 8)
            .hidden_interval(interval * 10)
    }

    /// Starts the list poller and one poller per subscribed conversation.
    /// Already-running pollers are left alone.
    fn start_fallback_pollers(&mut self) {
        if self.list_poller.is_none() {
            let shared = Arc::clone(&self.shared);
            let api = Arc::clone(&self.shared.api);
            self.list_poller = Some(spawn_poller(
                self.fallback_poll_config(),
                self.visibility.clone(),
                move || {
                    let api = Arc::clone(&api);
                    async move {
                        let started = Instant::now();
                        let conversations = api.list_conversations().await?;
                        let unread = api.unread_count().await?;
                        Ok::<_, PollError>((started, conversations, unread))
                    }
                },
                move |result| match result {
                    Some((started, conversations, unread)) => {
                        shared.cache.store(conversations.clone(), started);
                        shared.registry.notify_list(&conversations);
                        shared.unread.update(unread);
                    }
                    None => shared.registry.notify_list(&[]),
                },
            ));
        }
        for conversation_id in self.shared.registry.active_conversations() {
            self.spawn_conversation_poller(&conversation_id);
        }
    }

    fn spawn_conversation_poller(&mut self, conversation_id: &str) {
        if self.conversation_pollers.contains_key(conversation_id) {
            return;
        }
        let shared = Arc::clone(&self.shared);
        let api = Arc::clone(&self.shared.api);
        let fetch_id = conversation_id.to_string();
        let notify_id = conversation_id.to_string();
        let handle = spawn_poller(
            self.fallback_poll_config(),
            self.visibility.clone(),
            move || {
                let api = Arc::clone(&api);
                let conversation_id = fetch_id.clone();
                async move {
                    api.conversation_messages(&conversation_id)
                        .await
                        .map_err(PollError::from)
                }
            },
            move |result| {
                let mut messages = result.unwrap_or_default();
                sort_messages(&mut messages);
                shared.registry.notify(&notify_id, &messages);
            },
        );
        self.conversation_pollers
            .insert(conversation_id.to_string(), handle);
    }

    fn stop_fallback_pollers(&mut self) {
        if let Some(handle) = self.list_poller.take() {
            handle.cancel();
        }
        for (_, handle) in self.conversation_pollers.drain() {
            handle.cancel();
        }
    }
}

impl<T, A> fmt::Debug for MessagingManager<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessagingManager")
            .field("conversation_pollers", &self.conversation_pollers.len())
            .finish_non_exhaustive()
    }
}

/// Display order for a conversation's messages: server creation time,
/// identifier as the tie-break.
fn sort_messages(messages: &mut [Message]) {
    messages.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Caller-facing handle to the messaging subsystem.
///
/// Clones share state with the manager task; every method works the same
/// whether the manager is online or polling.
pub struct MessagingHandle<A> {
    shared: Arc<Shared<A>>,
}

impl<A> Clone for MessagingHandle<A> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<A> fmt::Debug for MessagingHandle<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessagingHandle").finish_non_exhaustive()
    }
}

impl<A: MessagingApi> MessagingHandle<A> {
    /// Subscribes to one conversation's message feed.
    ///
    /// The callback receives the full, ordered message list on every
    /// refresh, from push or poll alike.
    pub fn subscribe<C>(&self, conversation_id: &str, callback: C) -> SubscriptionHandle<A>
    where
        C: FnMut(&[Message]) + Send + 'static,
    {
        let id = self.shared.registry.add(conversation_id, Box::new(callback));
        self.shared.enqueue(ClientEvent::SubscribeConversation {
            conversation_id: conversation_id.to_string(),
        });
        SubscriptionHandle {
            shared: Arc::clone(&self.shared),
            target: Target::Conversation(conversation_id.to_string()),
            id,
            cancelled: AtomicBool::new(false),
        }
    }

    /// Subscribes to conversation list refreshes.
    pub fn subscribe_list<C>(&self, callback: C) -> SubscriptionHandle<A>
    where
        C: FnMut(&[Conversation]) + Send + 'static,
    {
        let id = self.shared.registry.add_list(Box::new(callback));
        SubscriptionHandle {
            shared: Arc::clone(&self.shared),
            target: Target::List,
            id,
            cancelled: AtomicBool::new(false),
        }
    }

    /// Conversation list, served from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns the fetch error only when the cache holds nothing to serve
    /// in its place.
    pub async fn conversations(&self) -> Result<Vec<Conversation>> {
        let api = Arc::clone(&self.shared.api);
        let conversations = self
            .shared
            .cache
            .get_with(move || async move { api.list_conversations().await })
            .await?;
        Ok(conversations)
    }

    /// Sends a message over HTTP and returns the server's copy.
    ///
    /// # Errors
    ///
    /// Returns an error for blank content or a failed request.
    pub async fn send_message(&self, conversation_id: &str, content: &str) -> Result<Message> {
        let message = self.shared.api.send_message(conversation_id, content).await?;
        self.shared.cache.invalidate();
        Ok(message)
    }

    /// Marks a conversation read and announces it to peers.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; the socket echo and badge
    /// refresh are best-effort on top of it.
    pub async fn mark_read(&self, conversation_id: &str) -> Result<()> {
        self.shared.api.mark_conversation_read(conversation_id).await?;
        self.shared.cache.invalidate();
        self.shared.enqueue(ClientEvent::ConversationRead {
            conversation_id: conversation_id.to_string(),
        });
        match self.shared.api.unread_count().await {
            Ok(count) => self.shared.unread.update(count),
            Err(err) => tracing::warn!(error = %err, "unread refresh after mark-read failed"),
        }
        Ok(())
    }

    /// Reports local typing activity.
    ///
    /// Emissions are debounced, and a start signal schedules an automatic
    /// stop after a few seconds of silence; calling this on every
    /// keystroke is the intended usage.
    pub fn set_typing(&self, conversation_id: &str, is_typing: bool) {
        let generation = self.shared.typing.bump_generation(conversation_id);
        if self.shared.typing.should_emit(conversation_id, is_typing) {
            self.shared.enqueue(ClientEvent::Typing {
                conversation_id: conversation_id.to_string(),
                is_typing,
            });
        }
        if is_typing {
            let shared = Arc::clone(&self.shared);
            let conversation_id = conversation_id.to_string();
            tokio::spawn(async move {
                tokio::time::sleep(shared.config.typing_expiry).await;
                // A later keystroke supersedes this auto-stop.
                if shared.typing.generation(&conversation_id) == generation
                    && shared.typing.should_emit(&conversation_id, false)
                {
                    shared.enqueue(ClientEvent::Typing {
                        conversation_id,
                        is_typing: false,
                    });
                }
            });
        }
    }

    /// Display names of peers currently typing in a conversation.
    #[must_use]
    pub fn typing_users(&self, conversation_id: &str) -> Vec<String> {
        self.shared.typing.typing_users(conversation_id)
    }

    /// Applies a bulk operation and returns its operation id for undo.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty id list or a failed request.
    pub async fn bulk(&self, conversation_ids: Vec<String>, action: BulkAction) -> Result<String> {
        let request = BulkRequest {
            conversation_ids,
            action,
        };
        let receipt = self.shared.api.bulk(&request).await?;
        self.shared.cache.invalidate();
        let operation_id = receipt.operation_id.clone();
        self.shared.undo.record(&receipt);
        Ok(operation_id)
    }

    /// Reverses a bulk operation if its undo window is still open.
    ///
    /// Returns `false` when the operation is unknown or expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the undo request itself fails.
    pub async fn undo(&self, operation_id: &str) -> Result<bool> {
        let Some(record) = self.shared.undo.take(operation_id) else {
            return Ok(false);
        };
        self.shared
            .api
            .undo_bulk(&record.operation_id, &record.undo_token)
            .await?;
        self.shared.cache.invalidate();
        Ok(true)
    }

    /// Bulk operations that can still be undone.
    #[must_use]
    pub fn undoable(&self) -> Vec<UndoableOperation> {
        self.shared.undo.undoable()
    }

    /// Attaches a badge sink; it receives the current count immediately.
    pub fn attach_badge_sink(&self, sink: Box<dyn BadgeSink>) {
        self.shared.unread.attach(sink);
    }

    /// Current unread count.
    #[must_use]
    pub fn unread_count(&self) -> u32 {
        self.shared.unread.count()
    }

    /// Watches the connection state.
    #[must_use]
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state_tx.subscribe()
    }

    /// Subscribes to ambient notices.
    #[must_use]
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.shared.notice_tx.subscribe()
    }

    /// Stops the manager task. Idempotent.
    pub fn shutdown(&self) {
        let _ = self.shared.shutdown_tx.send(true);
    }
}

enum Target {
    Conversation(String),
    List,
}

/// Handle to an active subscription.
///
/// Subscriptions are only released by an explicit [`cancel`]; dropping the
/// handle leaves the feed running.
///
/// [`cancel`]: SubscriptionHandle::cancel
pub struct SubscriptionHandle<A> {
    shared: Arc<Shared<A>>,
    target: Target,
    id: u64,
    cancelled: AtomicBool,
}

impl<A> SubscriptionHandle<A> {
    /// Releases the subscription. Safe to call more than once.
    ///
    /// When the last subscriber of a conversation cancels, the manager
    /// tears down that feed's wire subscription or fallback poller.
    pub fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        match &self.target {
            Target::Conversation(conversation_id) => {
                let feed_empty = self.shared.registry.remove(conversation_id, self.id);
                if feed_empty {
                    self.shared.enqueue(ClientEvent::UnsubscribeConversation {
                        conversation_id: conversation_id.clone(),
                    });
                }
            }
            Target::List => self.shared.registry.remove_list(self.id),
        }
    }

    /// Whether this subscription has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl<A> fmt::Debug for SubscriptionHandle<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}
