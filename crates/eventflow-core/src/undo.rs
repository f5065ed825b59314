//! Undo ledger for bulk conversation operations.
//!
//! Every bulk operation the backend acknowledges comes with an undo token.
//! The ledger holds those tokens for a fixed window; after that the token is
//! useless and the record is dropped on the next read.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use eventflow_api::{BulkAction, BulkReceipt};

/// How long a bulk operation stays undoable.
pub const UNDO_WINDOW: Duration = Duration::from_secs(30);

/// A bulk operation that can still be reversed.
#[derive(Debug, Clone)]
pub struct UndoableOperation {
    /// Server-assigned operation identifier.
    pub operation_id: String,
    /// One-shot token accepted by the undo endpoint.
    pub undo_token: String,
    /// What the operation did.
    pub action: BulkAction,
    /// How many conversations it touched.
    pub affected: u32,
    expires_at: Instant,
}

/// Expiring store of undoable bulk operations.
#[derive(Debug)]
pub struct UndoLedger {
    window: Duration,
    inner: Mutex<Vec<UndoableOperation>>,
}

impl UndoLedger {
    /// Ledger with the standard undo window.
    #[must_use]
    pub fn new() -> Self {
        Self::with_window(UNDO_WINDOW)
    }

    /// Ledger with a custom window.
    #[must_use]
    pub fn with_window(window: Duration) -> Self {
        Self {
            window,
            inner: Mutex::new(Vec::new()),
        }
    }

    /// Records an acknowledged bulk operation.
    pub fn record(&self, receipt: &BulkReceipt) {
        if let Ok(mut records) = self.inner.lock() {
            let now = Instant::now();
            records.retain(|record| record.expires_at > now);
            records.push(UndoableOperation {
                operation_id: receipt.operation_id.clone(),
                undo_token: receipt.undo_token.clone(),
                action: receipt.action,
                affected: receipt.affected,
                expires_at: now + self.window,
            });
        }
    }

    /// Operations whose window has not yet closed.
    #[must_use]
    pub fn undoable(&self) -> Vec<UndoableOperation> {
        self.inner.lock().map_or_else(
            |_| Vec::new(),
            |mut records| {
                let now = Instant::now();
                records.retain(|record| record.expires_at > now);
                records.clone()
            },
        )
    }

    /// Removes and returns an operation if it is still inside its window.
    ///
    /// Expired and unknown identifiers both return `None`; the caller
    /// treats that as "nothing to undo" rather than an error.
    pub fn take(&self, operation_id: &str) -> Option<UndoableOperation> {
        let Ok(mut records) = self.inner.lock() else {
            return None;
        };
        let now = Instant::now();
        records.retain(|record| record.expires_at > now);
        let index = records
            .iter()
            .position(|record| record.operation_id == operation_id)?;
        Some(records.remove(index))
    }
}

impl Default for UndoLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn receipt(operation_id: &str) -> BulkReceipt {
        BulkReceipt {
            operation_id: operation_id.to_string(),
            undo_token: format!("undo-{operation_id}"),
            action: BulkAction::Archive,
            affected: 3,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn operations_expire_after_the_window() {
        let ledger = UndoLedger::new();
        ledger.record(&receipt("op-1"));
        assert_eq!(ledger.undoable().len(), 1);

        tokio::time::advance(UNDO_WINDOW + Duration::from_millis(1)).await;
        assert!(ledger.undoable().is_empty());
        assert!(ledger.take("op-1").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn take_is_single_use() {
        let ledger = UndoLedger::new();
        ledger.record(&receipt("op-1"));

        let taken = ledger.take("op-1").unwrap();
        assert_eq!(taken.undo_token, "undo-op-1");
        assert!(ledger.take("op-1").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_identifiers_return_none() {
        let ledger = UndoLedger::new();
        ledger.record(&receipt("op-1"));
        assert!(ledger.take("op-2").is_none());
        assert_eq!(ledger.undoable().len(), 1);
    }
}
