//! Backend seam used by the orchestration layer.
//!
//! The manager is generic over this trait so tests can script the backend
//! without a network. [`eventflow_api::ApiClient`] is the production
//! implementation.

use eventflow_api::{
    ApiClient, BulkReceipt, BulkRequest, Conversation, Message, Result, Ticket,
};

/// Messaging backend operations the orchestration layer depends on.
pub trait MessagingApi: Send + Sync + 'static {
    /// Fetches all conversations for the signed-in user.
    fn list_conversations(&self) -> impl Future<Output = Result<Vec<Conversation>>> + Send;

    /// Fetches the messages of one conversation.
    fn conversation_messages(
        &self,
        conversation_id: &str,
    ) -> impl Future<Output = Result<Vec<Message>>> + Send;

    /// Sends a message and returns the server's copy.
    fn send_message(
        &self,
        conversation_id: &str,
        content: &str,
    ) -> impl Future<Output = Result<Message>> + Send;

    /// Marks every message in a conversation read.
    fn mark_conversation_read(
        &self,
        conversation_id: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Fetches the total unread message count.
    fn unread_count(&self) -> impl Future<Output = Result<u32>> + Send;

    /// Applies a bulk operation and returns its undo receipt.
    fn bulk(&self, request: &BulkRequest) -> impl Future<Output = Result<BulkReceipt>> + Send;

    /// Reverses a previously acknowledged bulk operation.
    fn undo_bulk(
        &self,
        operation_id: &str,
        undo_token: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Fetches the user's support tickets.
    fn list_tickets(&self) -> impl Future<Output = Result<Vec<Ticket>>> + Send;
}

impl MessagingApi for ApiClient {
    async fn list_conversations(&self) -> Result<Vec<Conversation>> {
        ApiClient::list_conversations(self).await
    }

    async fn conversation_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        ApiClient::conversation_messages(self, conversation_id).await
    }

    async fn send_message(&self, conversation_id: &str, content: &str) -> Result<Message> {
        ApiClient::send_message(self, conversation_id, content).await
    }

    async fn mark_conversation_read(&self, conversation_id: &str) -> Result<()> {
        ApiClient::mark_conversation_read(self, conversation_id).await
    }

    async fn unread_count(&self) -> Result<u32> {
        ApiClient::unread_count(self).await
    }

    async fn bulk(&self, request: &BulkRequest) -> Result<BulkReceipt> {
        ApiClient::bulk(self, request).await
    }

    async fn undo_bulk(&self, operation_id: &str, undo_token: &str) -> Result<()> {
        ApiClient::undo_bulk(self, operation_id, undo_token).await
    }

    async fn list_tickets(&self) -> Result<Vec<Ticket>> {
        ApiClient::list_tickets(self).await
    }
}
