//! Data transfer objects shared with the marketplace API.
//!
//! Field names are camelCase on the wire. All state here is owned by the
//! server; the client holds read-through copies that the next authoritative
//! fetch overwrites.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A participant in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// User identifier.
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Display name.
    #[serde(rename = "displayName")]
    pub display_name: String,
    /// Unread count for this participant.
    #[serde(rename = "unreadCount", default)]
    pub unread_count: u32,
    /// Whether this participant pinned the conversation.
    #[serde(default)]
    pub pinned: bool,
    /// Whether this participant archived the conversation.
    #[serde(default)]
    pub archived: bool,
}

/// Summary of the most recent message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastMessage {
    /// Sender of the message.
    #[serde(rename = "senderId")]
    pub sender_id: String,
    /// Message text, possibly truncated by the server.
    pub content: String,
    /// When the message was created.
    #[serde(rename = "sentAt")]
    pub sent_at: DateTime<Utc>,
}

/// A conversation between a fixed set of participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Conversation identifier.
    pub id: String,
    /// Participants, including the requesting user.
    pub participants: Vec<Participant>,
    /// Most recent message, if any.
    #[serde(rename = "lastMessage", default)]
    pub last_message: Option<LastMessage>,
    /// Timestamp of the last activity, used for list ordering.
    #[serde(rename = "lastActivity")]
    pub last_activity: DateTime<Utc>,
}

/// A message within a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier.
    pub id: String,
    /// Conversation this message belongs to.
    #[serde(rename = "conversationId")]
    pub conversation_id: String,
    /// Sender identifier.
    #[serde(rename = "senderId")]
    pub sender_id: String,
    /// Message text.
    pub content: String,
    /// Server-assigned creation timestamp; display order follows this.
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    /// Whether the requesting user has read the message.
    #[serde(default)]
    pub read: bool,
    /// Attached files, usually empty.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// A file attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Original filename.
    pub filename: String,
    /// Download URL.
    pub url: String,
    /// MIME type.
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    /// Size in bytes.
    pub size: u64,
}

/// Unread counter response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCount {
    /// Number of unread items for the requesting user.
    pub count: u32,
}

/// Bulk operation applied to a set of conversations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    /// Delete the conversations.
    Delete,
    /// Mark the conversations read.
    MarkRead,
    /// Flag the conversations.
    Flag,
    /// Archive the conversations.
    Archive,
}

/// Request body for a bulk operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkRequest {
    /// Conversations to operate on.
    #[serde(rename = "conversationIds")]
    pub conversation_ids: Vec<String>,
    /// Operation to apply.
    pub action: BulkAction,
}

/// Receipt for a bulk operation; holds the credential needed to undo it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkReceipt {
    /// Server-assigned operation identifier.
    #[serde(rename = "operationId")]
    pub operation_id: String,
    /// Short-lived token permitting reversal of this operation.
    #[serde(rename = "undoToken")]
    pub undo_token: String,
    /// Operation that was applied.
    pub action: BulkAction,
    /// Number of conversations affected.
    pub affected: u32,
}

/// Support ticket status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Awaiting a response from support.
    Open,
    /// Awaiting a response from the requester.
    Pending,
    /// Resolved.
    Closed,
}

/// A support ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket identifier.
    pub id: String,
    /// Ticket subject line.
    pub subject: String,
    /// Current status.
    pub status: TicketStatus,
    /// When the ticket was opened.
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    /// When the ticket last changed.
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    /// Body of the most recent reply, if any.
    #[serde(rename = "lastReply", default)]
    pub last_reply: Option<String>,
}

/// Request body for opening a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTicket {
    /// Subject line.
    pub subject: String,
    /// Initial message body.
    pub body: String,
}
