//! # stockcart-session: Cart Session for Stockcart
//!
//! This crate runs one shopping cart for the lifetime of a session: it loads
//! the persisted cart, applies add/remove/update against live stock, and
//! writes every change straight back to storage.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Session Architecture                        │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 CartSession (cloneable handle)                   │  │
//! │  │   get_cart · subscribe · add_item · remove_item · update_amount │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │ mpsc (single-flight)                    │
//! │  ┌────────────────────────────▼─────────────────────────────────────┐  │
//! │  │                         CartWorker                               │  │
//! │  │        one operation at a time, reply over oneshot               │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │  ┌────────────────────────────▼─────────────────────────────────────┐  │
//! │  │                         CartEngine                               │  │
//! │  │   lookup → transform working copy → commit or notify            │  │
//! │  └──────┬──────────────────────┬──────────────────────┬─────────────┘  │
//! │         ▼                      ▼                      ▼                 │
//! │  ┌──────────────┐   ┌───────────────────┐   ┌───────────────────┐     │
//! │  │  CartStore   │   │ StockOracle       │   │ Notifier          │     │
//! │  │  watch<Cart> │   │ ProductCatalog    │   │  (fire & forget)  │     │
//! │  │  write-through   │  (HttpCatalog)    │   │                   │     │
//! │  └──────┬───────┘   └───────────────────┘   └───────────────────┘     │
//! │         ▼                                                               │
//! │  PersistenceAdapter (SqlitePersistence / InMemoryPersistence)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`store`] - `CartStore`, the current cart and its write-through
//! - [`engine`] - `CartEngine` and `Outcome`
//! - [`worker`] - `CartWorker` and the `CartSession` handle
//! - [`ports`] - Collaborator traits
//! - [`adapters`] - HTTP, SQLite and in-memory implementations
//! - [`notify`] - Notifier implementations
//! - [`config`] - `CartConfig` (TOML + environment)
//! - [`error`] - Error types and user-facing messages
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stockcart_core::ProductId;
//! use stockcart_session::{CartConfig, CartSession, HttpCatalog, SqlitePersistence, TracingNotifier};
//!
//! let config = CartConfig::load_or_default(None);
//! let catalog = Arc::new(HttpCatalog::from_settings(&config.api)?);
//! let storage = SqlitePersistence::open("cart.db").await?;
//!
//! let session = CartSession::open(
//!     &config,
//!     Arc::new(storage),
//!     catalog.clone(),
//!     catalog,
//!     Arc::new(TracingNotifier),
//! )
//! .await;
//!
//! session.add_item(ProductId(1)).await;
//! println!("{} items", session.get_cart().len());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod adapters;
pub mod config;
pub mod engine;
pub mod error;
pub mod notify;
pub mod ports;
pub mod store;
pub mod worker;

#[cfg(test)]
mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use adapters::{HttpCatalog, InMemoryPersistence, SqlitePersistence};
pub use config::{ApiSettings, CartConfig, SessionSettings, StorageSettings};
pub use engine::{CartEngine, Outcome};
pub use error::{
    CartError, CartResult, ConfigError, ConfigResult, LookupError, Operation, PersistenceError,
};
pub use notify::{ChannelNotifier, NoOpNotifier, Notification, TracingNotifier};
pub use ports::{Notifier, PersistenceAdapter, ProductCatalog, Severity, StockOracle};
pub use store::CartStore;
pub use worker::{CartSession, CartWorker};
