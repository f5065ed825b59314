//! Conversation and messaging endpoints.

use serde_json::json;

use crate::client::ApiClient;
use crate::model::{BulkReceipt, BulkRequest, Conversation, Message, UnreadCount};
use crate::{Error, Result};

impl ApiClient {
    /// Fetches the requesting user's conversation list.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails after retries.
    pub async fn list_conversations(&self) -> Result<Vec<Conversation>> {
        self.get("/api/conversations").await
    }

    /// Fetches the ordered message list for a conversation.
    ///
    /// The server orders by creation timestamp; this is the authoritative
    /// order pushes are reconciled against.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails after retries.
    pub async fn conversation_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        self.get(&format!("/api/conversations/{conversation_id}/messages"))
            .await
    }

    /// Sends a message and returns the server's confirmed copy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for blank content before any network
    /// call, or a request error after retries.
    pub async fn send_message(&self, conversation_id: &str, content: &str) -> Result<Message> {
        if content.trim().is_empty() {
            return Err(Error::Validation("message content is required".to_string()));
        }
        self.post(
            &format!("/api/conversations/{conversation_id}/messages"),
            &json!({ "content": content }),
        )
        .await
    }

    /// Marks every message in a conversation read.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails after retries.
    pub async fn mark_conversation_read(&self, conversation_id: &str) -> Result<()> {
        self.post_unit(
            &format!("/api/conversations/{conversation_id}/read"),
            &json!({}),
        )
        .await
    }

    /// Fetches the requesting user's unread counter.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails after retries.
    pub async fn unread_count(&self) -> Result<u32> {
        let unread: UnreadCount = self.get("/api/messages/unread-count").await?;
        Ok(unread.count)
    }

    /// Applies a bulk operation and returns its undo receipt.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty id set, or a request
    /// error after retries.
    pub async fn bulk(&self, request: &BulkRequest) -> Result<BulkReceipt> {
        if request.conversation_ids.is_empty() {
            return Err(Error::Validation(
                "bulk operation requires at least one conversation".to_string(),
            ));
        }
        self.post("/api/conversations/bulk", request).await
    }

    /// Reverses a bulk operation using its undo token.
    ///
    /// # Errors
    ///
    /// Returns an error when the token is expired or the request fails.
    pub async fn undo_bulk(&self, operation_id: &str, undo_token: &str) -> Result<()> {
        self.post_unit(
            &format!("/api/conversations/bulk/{operation_id}/undo"),
            &json!({ "undoToken": undo_token }),
        )
        .await
    }
}
