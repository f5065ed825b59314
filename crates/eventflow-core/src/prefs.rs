//! Durable user preference storage.
//!
//! Small key/value store backed by SQLite. Holds UI choices that must
//! survive a restart: the conversation list sort order and per-notice
//! dismissal timestamps.

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::Result;

/// Sort order for the conversation list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationSort {
    /// Most recent activity first.
    #[default]
    Recent,
    /// Conversations with unread messages first.
    Unread,
    /// Alphabetical by participant name.
    Alphabetical,
}

impl ConversationSort {
    /// Stable storage token for this variant.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Recent => "recent",
            Self::Unread => "unread",
            Self::Alphabetical => "alphabetical",
        }
    }

    /// Parses a storage token; unknown tokens return `None`.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "recent" => Some(Self::Recent),
            "unread" => Some(Self::Unread),
            "alphabetical" => Some(Self::Alphabetical),
            _ => None,
        }
    }
}

const SORT_KEY: &str = "conversation_sort";

/// Repository for durable UI preferences.
pub struct PreferenceRepository {
    pool: SqlitePool,
}

impl PreferenceRepository {
    /// Create a new repository with the given database path.
    ///
    /// Creates the database and tables if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(database_path: &str) -> Result<Self> {
        let url = format!("sqlite:{database_path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let repo = Self { pool };
        repo.initialize().await?;
        Ok(repo)
    }

    /// Create an in-memory repository for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let repo = Self { pool };
        repo.initialize().await?;
        Ok(repo)
    }

    /// Initialize database schema.
    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Store a preference, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO preferences (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Read a preference.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM preferences WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| row.get("value")))
    }

    /// Store the conversation list sort order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn set_conversation_sort(&self, sort: ConversationSort) -> Result<()> {
        self.set(SORT_KEY, sort.as_str()).await
    }

    /// Read the conversation list sort order, defaulting to recent-first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn conversation_sort(&self) -> Result<ConversationSort> {
        let stored = self.get(SORT_KEY).await?;
        Ok(stored
            .as_deref()
            .and_then(ConversationSort::parse)
            .unwrap_or_default())
    }

    /// Record that a named notice was dismissed now.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn dismiss_notice(&self, notice: &str) -> Result<()> {
        self.set(&dismissal_key(notice), &Utc::now().to_rfc3339())
            .await
    }

    /// When a named notice was dismissed, if ever.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn notice_dismissed_at(&self, notice: &str) -> Result<Option<DateTime<Utc>>> {
        let stored = self.get(&dismissal_key(notice)).await?;
        Ok(stored.and_then(|value| {
            DateTime::parse_from_rfc3339(&value)
                .ok()
                .map(|parsed| parsed.with_timezone(&Utc))
        }))
    }
}

fn dismissal_key(notice: &str) -> String {
    format!("dismissed:{notice}")
}
