use sqlx::PgPool;

use crate::config::PostgresConfig;

/// Run database migrations, creating required tables if they do not exist.
///
/// Creates the messages table in the configured schema with the configured
/// table prefix. `seq` is a `BIGSERIAL` that breaks ordering ties between
/// rows with equal timestamps, preserving insertion order.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] if any DDL statement fails.
pub async fn run_migrations(pool: &PgPool, config: &PostgresConfig) -> Result<(), sqlx::Error> {
    let messages_table = config.messages_table();

    let create_messages = format!(
        "CREATE TABLE IF NOT EXISTS {messages_table} (
            id UUID PRIMARY KEY,
            seq BIGSERIAL,
            sender_username TEXT NOT NULL,
            receiver_username TEXT NOT NULL,
            message_text TEXT,
            attachment JSONB,
            created_at TIMESTAMPTZ NOT NULL
        )"
    );

    // Covers find_all_involving for either side of the conversation.
    let index_sender = format!(
        "CREATE INDEX IF NOT EXISTS {}messages_sender_idx ON {messages_table} (sender_username)",
        config.table_prefix
    );
    let index_receiver = format!(
        "CREATE INDEX IF NOT EXISTS {}messages_receiver_idx ON {messages_table} (receiver_username)",
        config.table_prefix
    );

    sqlx::query(&create_messages).execute(pool).await?;
    sqlx::query(&index_sender).execute(pool).await?;
    sqlx::query(&index_receiver).execute(pool).await?;

    Ok(())
}
