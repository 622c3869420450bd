//! # Repository Module
//!
//! Database repository implementations for Stockcart.
//!
//! ## Available Repositories
//!
//! - [`SnapshotRepository`](snapshot::SnapshotRepository) - Keyed snapshot blobs

pub mod snapshot;
