//! Typed events exchanged over the real-time channel.
//!
//! The wire format is an adjacently tagged JSON envelope shared with the
//! server: `{"event": "<name>", "data": {...}}`. Payload field names are
//! camelCase on the wire; event names keep the server's `domain:action`
//! convention where one exists.

use serde::{Deserialize, Serialize};

/// Payload of a `new_message` push.
///
/// The push carries identifiers only. It is a change signal; the message
/// list is re-fetched over HTTP for the authoritative content and order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessagePayload {
    /// Conversation the message belongs to.
    #[serde(rename = "conversationId")]
    pub conversation_id: String,
    /// Identifier of the new message.
    #[serde(rename = "messageId")]
    pub message_id: String,
    /// Sender of the new message.
    #[serde(rename = "senderId")]
    pub sender_id: String,
}

/// Payload of a `conversation:updated` push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationUpdatedPayload {
    /// Conversation that changed (participants, pin/archive flags, list order).
    #[serde(rename = "conversationId")]
    pub conversation_id: String,
}

/// Payload of a `typing:status` push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingStatusPayload {
    /// Conversation being typed in.
    #[serde(rename = "conversationId")]
    pub conversation_id: String,
    /// User whose typing state changed.
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Display name for rendering "X is typing".
    #[serde(rename = "displayName")]
    pub display_name: String,
    /// True while the user is typing.
    #[serde(rename = "isTyping")]
    pub is_typing: bool,
}

/// Payload of a `message:read` push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReadPayload {
    /// Conversation the receipt belongs to.
    #[serde(rename = "conversationId")]
    pub conversation_id: String,
    /// User who read the conversation.
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Events pushed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// A message arrived in a conversation.
    #[serde(rename = "new_message")]
    NewMessage(NewMessagePayload),
    /// A conversation's metadata or ordering changed.
    #[serde(rename = "conversation:updated")]
    ConversationUpdated(ConversationUpdatedPayload),
    /// A participant started or stopped typing.
    #[serde(rename = "typing:status")]
    TypingStatus(TypingStatusPayload),
    /// A participant read the conversation.
    #[serde(rename = "message:read")]
    MessageRead(MessageReadPayload),
}

/// Events emitted by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Authenticate the connection. Must be the first event after connect.
    #[serde(rename = "auth")]
    Auth {
        /// Session token.
        token: String,
    },
    /// Start receiving pushes for a conversation. Idempotent server-side.
    #[serde(rename = "subscribe_conversation")]
    SubscribeConversation {
        /// Conversation to subscribe to.
        #[serde(rename = "conversationId")]
        conversation_id: String,
    },
    /// Stop receiving pushes for a conversation.
    #[serde(rename = "unsubscribe_conversation")]
    UnsubscribeConversation {
        /// Conversation to unsubscribe from.
        #[serde(rename = "conversationId")]
        conversation_id: String,
    },
    /// Typing indicator for a conversation.
    #[serde(rename = "typing")]
    Typing {
        /// Conversation being typed in.
        #[serde(rename = "conversationId")]
        conversation_id: String,
        /// True while typing, false when stopped.
        #[serde(rename = "isTyping")]
        is_typing: bool,
    },
    /// Send a message over the socket.
    ///
    /// The client sends messages over HTTP for delivery guarantees; this
    /// event exists for server contract completeness and latency-sensitive
    /// callers that accept fire-and-forget semantics.
    #[serde(rename = "message:send")]
    MessageSend {
        /// Target conversation.
        #[serde(rename = "conversationId")]
        conversation_id: String,
        /// Message body.
        content: String,
    },
    /// Announce that the local user read a conversation.
    #[serde(rename = "conversation:read")]
    ConversationRead {
        /// Conversation that was read.
        #[serde(rename = "conversationId")]
        conversation_id: String,
    },
}

impl ServerEvent {
    /// Conversation id the event applies to.
    #[must_use]
    pub fn conversation_id(&self) -> &str {
        match self {
            Self::NewMessage(p) => &p.conversation_id,
            Self::ConversationUpdated(p) => &p.conversation_id,
            Self::TypingStatus(p) => &p.conversation_id,
            Self::MessageRead(p) => &p.conversation_id,
        }
    }
}
