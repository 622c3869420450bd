//! # stockcart-db: Snapshot Storage for Stockcart
//!
//! This crate is the durable side of the cart. It stores opaque snapshot
//! blobs under string keys in a local SQLite file.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockcart Data Flow                              │
//! │                                                                         │
//! │  CartStore::replace(new_cart)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqlitePersistence (stockcart-session adapter)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  stockcart-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌──────────────────┐   ┌─────────────┐  │   │
//! │  │   │   Database    │    │ SnapshotRepo     │   │ Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ get / put        │   │ (embedded)  │  │   │
//! │  │   │  SqlitePool   │    │ (upsert)         │   │             │  │   │
//! │  │   └───────────────┘    └──────────────────┘   └─────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  stockcart.db  (table: cart_snapshots)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockcart_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("stockcart.db")).await?;
//! db.snapshots().put("@RocketShoes:cart", b"[]").await?;
//! let blob = db.snapshots().get("@RocketShoes:cart").await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::snapshot::SnapshotRepository;
