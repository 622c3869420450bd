//! SQLite-backed persistence via stockcart-db.

use async_trait::async_trait;
use std::path::PathBuf;

use stockcart_db::{Database, DbConfig};

use crate::error::PersistenceError;
use crate::ports::PersistenceAdapter;

/// Stores cart snapshots in the `cart_snapshots` table.
#[derive(Debug, Clone)]
pub struct SqlitePersistence {
    db: Database,
}

impl SqlitePersistence {
    /// Wraps an open database.
    pub fn new(db: Database) -> Self {
        SqlitePersistence { db }
    }

    /// Opens (creating if needed) the database at `path` and runs migrations.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        Self::connect(DbConfig::new(path)).await
    }

    /// Opens a database with an explicit configuration.
    pub async fn connect(config: DbConfig) -> Result<Self, PersistenceError> {
        let db = Database::new(config)
            .await
            .map_err(|e| PersistenceError::Unavailable(e.to_string()))?;
        Ok(SqlitePersistence { db })
    }

    /// Returns the underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl PersistenceAdapter for SqlitePersistence {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        self.db
            .snapshots()
            .get(key)
            .await
            .map_err(|e| PersistenceError::Read(e.to_string()))
    }

    async fn save(&self, key: &str, bytes: &[u8]) -> Result<(), PersistenceError> {
        self.db
            .snapshots()
            .put(key, bytes)
            .await
            .map_err(|e| PersistenceError::Write(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_through_sqlite() {
        let storage = SqlitePersistence::connect(DbConfig::in_memory()).await.unwrap();

        assert_eq!(storage.load("cart").await.unwrap(), None);

        storage.save("cart", b"[]").await.unwrap();
        assert_eq!(storage.load("cart").await.unwrap(), Some(b"[]".to_vec()));
    }

    #[tokio::test]
    async fn test_closed_database_reports_write_error() {
        let storage = SqlitePersistence::connect(DbConfig::in_memory()).await.unwrap();
        storage.database().close().await;

        let err = storage.save("cart", b"[]").await.unwrap_err();
        assert!(matches!(err, PersistenceError::Write(_)));
    }
}
