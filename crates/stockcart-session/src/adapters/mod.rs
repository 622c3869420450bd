//! # Adapters
//!
//! Concrete implementations of the collaborator ports.
//!
//! - [`http`] - `HttpCatalog`, stock and product lookups over HTTP
//! - [`sqlite`] - `SqlitePersistence`, snapshots in the stockcart-db table
//! - [`memory`] - `InMemoryPersistence`, for tests and throwaway sessions

pub mod http;
pub mod memory;
pub mod sqlite;

pub use http::HttpCatalog;
pub use memory::InMemoryPersistence;
pub use sqlite::SqlitePersistence;
