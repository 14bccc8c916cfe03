use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use parley_core::{Attachment, Message, MessageDraft, MessageId, Username};
use parley_store::error::StoreError;
use parley_store::store::MessageStore;

use crate::config::PostgresConfig;
use crate::migrations;

/// PostgreSQL-backed implementation of [`MessageStore`].
///
/// Uses `sqlx::PgPool` for connection pooling. Each message is a single
/// row; `persist` is one `INSERT`, so the all-or-nothing contract falls
/// out of row-level atomicity. Reads order by `(created_at, seq)` where
/// `seq` is a `BIGSERIAL` tie-break.
pub struct PostgresMessageStore {
    pool: PgPool,
    config: Arc<PostgresConfig>,
}

impl PostgresMessageStore {
    /// Create a new `PostgresMessageStore` from the provided configuration.
    ///
    /// Connects to `PostgreSQL`, creates the connection pool, and runs
    /// migrations to ensure the messages table exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] if pool creation fails, or
    /// [`StoreError::Backend`] if migrations fail.
    pub async fn new(config: PostgresConfig) -> Result<Self, StoreError> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.pool_size)
            .connect(&config.url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        migrations::run_migrations(&pool, &config)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(Self {
            pool,
            config: Arc::new(config),
        })
    }

    /// Create a `PostgresMessageStore` from an existing pool and config.
    ///
    /// Runs migrations on creation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if migrations fail.
    pub async fn from_pool(pool: PgPool, config: PostgresConfig) -> Result<Self, StoreError> {
        migrations::run_migrations(&pool, &config)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(Self {
            pool,
            config: Arc::new(config),
        })
    }

    fn row_to_message(row: &sqlx::postgres::PgRow) -> Result<Message, StoreError> {
        let id: Uuid = row
            .try_get("id")
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let sender: String = row
            .try_get("sender_username")
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let receiver: String = row
            .try_get("receiver_username")
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let text: Option<String> = row
            .try_get("message_text")
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let attachment: Option<serde_json::Value> = row
            .try_get("attachment")
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let created_at: DateTime<Utc> = row
            .try_get("created_at")
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let file: Option<Attachment> = attachment
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        Ok(Message {
            id: MessageId::new(id.to_string()),
            sender_username: Username::new(sender),
            receiver_username: Username::new(receiver),
            message_text: text,
            file,
            timestamp: created_at,
        })
    }
}

#[async_trait]
impl MessageStore for PostgresMessageStore {
    async fn persist(&self, draft: MessageDraft) -> Result<Message, StoreError> {
        let table = self.config.messages_table();
        let id = Uuid::now_v7();
        let created_at = Utc::now();

        let attachment = draft
            .file
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let insert = format!(
            "INSERT INTO {table} \
                (id, sender_username, receiver_username, message_text, attachment, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)"
        );
        sqlx::query(&insert)
            .bind(id)
            .bind(draft.sender_username.as_str())
            .bind(draft.receiver_username.as_str())
            .bind(draft.message_text.as_deref())
            .bind(attachment)
            .bind(created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(Message {
            id: MessageId::new(id.to_string()),
            sender_username: draft.sender_username,
            receiver_username: draft.receiver_username,
            message_text: draft.message_text,
            file: draft.file,
            timestamp: created_at,
        })
    }

    async fn find_all_involving(&self, user: &Username) -> Result<Vec<Message>, StoreError> {
        let table = self.config.messages_table();
        let select = format!(
            "SELECT id, sender_username, receiver_username, message_text, attachment, created_at \
             FROM {table} \
             WHERE sender_username = $1 OR receiver_username = $1 \
             ORDER BY created_at ASC, seq ASC"
        );

        let rows = sqlx::query(&select)
            .bind(user.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        rows.iter().map(Self::row_to_message).collect()
    }
}
