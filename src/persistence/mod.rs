//! Persistence layer: one write per successful generation.
//!
//! [`GenerationStore`] is the seam the service writes through. The
//! concrete implementation uses `sqlx::PgPool`; [`LogOnlyStore`] stands in
//! when persistence is switched off.

pub mod postgres;

use std::fmt;

use async_trait::async_trait;

use crate::domain::GenerationRecord;

pub use postgres::PostgresGenerationStore;

/// Persistence failure.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Database driver error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed at startup.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Write-only sink for [`GenerationRecord`]s.
#[async_trait]
pub trait GenerationStore: Send + Sync + fmt::Debug {
    /// Writes one record.
    async fn put(&self, record: &GenerationRecord) -> Result<(), PersistenceError>;
}

/// Store used when `PERSISTENCE_ENABLED=false`: records are only logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOnlyStore;

#[async_trait]
impl GenerationStore for LogOnlyStore {
    async fn put(&self, record: &GenerationRecord) -> Result<(), PersistenceError> {
        tracing::info!(
            user_id = %record.user_id,
            timestamp = record.timestamp,
            "persistence disabled; generation record not stored"
        );
        Ok(())
    }
}
