//! Support ticket endpoints.

use serde_json::json;

use crate::client::ApiClient;
use crate::model::{NewTicket, Ticket};
use crate::{Error, Result};

impl ApiClient {
    /// Fetches the requesting user's support tickets.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails after retries.
    pub async fn list_tickets(&self) -> Result<Vec<Ticket>> {
        self.get("/api/tickets").await
    }

    /// Opens a new support ticket.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for blank fields before any network
    /// call, or a request error after retries.
    pub async fn create_ticket(&self, ticket: &NewTicket) -> Result<Ticket> {
        if ticket.subject.trim().is_empty() {
            return Err(Error::Validation("ticket subject is required".to_string()));
        }
        if ticket.body.trim().is_empty() {
            return Err(Error::Validation("ticket body is required".to_string()));
        }
        self.post("/api/tickets", ticket).await
    }

    /// Adds a reply to an existing ticket.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a blank reply, or a request error
    /// after retries.
    pub async fn reply_ticket(&self, ticket_id: &str, body: &str) -> Result<Ticket> {
        if body.trim().is_empty() {
            return Err(Error::Validation("reply body is required".to_string()));
        }
        self.post(
            &format!("/api/tickets/{ticket_id}/reply"),
            &json!({ "body": body }),
        )
        .await
    }
}
