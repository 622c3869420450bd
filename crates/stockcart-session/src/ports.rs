//! # Collaborator Ports
//!
//! The engine never talks to the network, the disk or the user directly.
//! It goes through these four traits, and the session is assembled with
//! whichever adapters fit the deployment.
//!
//! ```text
//! ┌────────────────────┬──────────────────────────────────┬─────────────────────┐
//! │ Port               │ Production adapter               │ Test adapter        │
//! ├────────────────────┼──────────────────────────────────┼─────────────────────┤
//! │ StockOracle        │ HttpCatalog (GET /stock/{id})    │ scripted fake       │
//! │ ProductCatalog     │ HttpCatalog (GET /products/{id}) │ scripted fake       │
//! │ PersistenceAdapter │ SqlitePersistence                │ InMemoryPersistence │
//! │ Notifier           │ TracingNotifier, ChannelNotifier │ recording fake      │
//! └────────────────────┴──────────────────────────────────┴─────────────────────┘
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use stockcart_core::{Product, ProductId, Stock};

use crate::error::{LookupError, PersistenceError};

/// Source of truth for available units.
#[async_trait]
pub trait StockOracle: Send + Sync {
    /// Returns the units currently available for `id`.
    async fn get_stock(&self, id: ProductId) -> Result<Stock, LookupError>;
}

/// Source of product metadata.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Returns the catalog record for `id`.
    async fn get_product(&self, id: ProductId) -> Result<Product, LookupError>;
}

/// Key-value blob storage for the cart snapshot.
#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    /// Returns the blob under `key`, or `None` if nothing is stored.
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError>;

    /// Stores `bytes` under `key`, replacing any previous blob.
    async fn save(&self, key: &str, bytes: &[u8]) -> Result<(), PersistenceError>;
}

/// How loud a notification is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// User-facing notifications. Fire-and-forget.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, severity: Severity);
}
