//! PostgreSQL implementation of the persistence layer.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::{GenerationStore, PersistenceError};
use crate::domain::GenerationRecord;

/// PostgreSQL-backed [`GenerationStore`] using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresGenerationStore {
    pool: PgPool,
}

impl PostgresGenerationStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` and applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] if the database is unreachable or a
    /// migration fails.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, PersistenceError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("generation_records schema is up to date");
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl GenerationStore for PostgresGenerationStore {
    async fn put(&self, record: &GenerationRecord) -> Result<(), PersistenceError> {
        // Key-value put semantics: a repeated key replaces the row.
        sqlx::query(
            "INSERT INTO generation_records \
             (user_id, timestamp, user_name, user_prompt, revised_prompt) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id, timestamp) DO UPDATE SET \
             user_name = EXCLUDED.user_name, \
             user_prompt = EXCLUDED.user_prompt, \
             revised_prompt = EXCLUDED.revised_prompt, \
             recorded_at = now()",
        )
        .bind(record.user_id.as_str())
        .bind(record.timestamp)
        .bind(&record.user_name)
        .bind(&record.user_prompt)
        .bind(&record.revised_prompt)
        .execute(&self.pool)
        .await?;

        tracing::debug!(user_id = %record.user_id, timestamp = record.timestamp, "generation record stored");
        Ok(())
    }
}
