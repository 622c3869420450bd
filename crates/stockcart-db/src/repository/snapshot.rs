//! # Snapshot Repository
//!
//! Key-value access to the `cart_snapshots` table.
//!
//! ## Table Layout
//! ```text
//! ┌──────────────────────┬──────────────────────────────┬──────────────────────┐
//! │ key (PK)             │ payload (BLOB)               │ updated_at           │
//! ├──────────────────────┼──────────────────────────────┼──────────────────────┤
//! │ @RocketShoes:cart    │ [{"id":1,...,"amount":2}]    │ 2026-10-19T12:00:00Z │
//! └──────────────────────┴──────────────────────────────┴──────────────────────┘
//! ```
//!
//! `put` is an upsert: the row for a key is replaced wholesale, never merged.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Repository for snapshot blobs.
#[derive(Debug, Clone)]
pub struct SnapshotRepository {
    pool: SqlitePool,
}

impl SnapshotRepository {
    /// Creates a new SnapshotRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SnapshotRepository { pool }
    }

    /// Returns the payload stored under `key`.
    ///
    /// ## Returns
    /// * `Ok(Some(bytes))` - Snapshot found
    /// * `Ok(None)` - Nothing stored under this key
    pub async fn get(&self, key: &str) -> DbResult<Option<Vec<u8>>> {
        let payload: Option<Vec<u8>> =
            sqlx::query_scalar("SELECT payload FROM cart_snapshots WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        debug!(key = %key, found = payload.is_some(), "Loaded snapshot");
        Ok(payload)
    }

    /// Stores `payload` under `key`, replacing any previous value.
    pub async fn put(&self, key: &str, payload: &[u8]) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO cart_snapshots (key, payload, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        debug!(key = %key, bytes = payload.len(), "Stored snapshot");
        Ok(())
    }
}
