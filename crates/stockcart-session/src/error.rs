//! # Session Error Types
//!
//! ## Error Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Error              Cause                          User sees            │
//! │  ─────              ─────                          ─────────            │
//! │  Validation         amount > stock                 OUT_OF_STOCK         │
//! │  Lookup             unknown product, API failure   "<op> failed"        │
//! │  NotFound           remove of an absent product    REMOVE_FAILED        │
//! │  Persistence        write-through failed           (logged; optional)   │
//! │  SessionClosed      worker already shut down       (logged)             │
//! │                                                                         │
//! │  None of these escape an operation: the engine turns them into a       │
//! │  notification and an `Outcome`.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use thiserror::Error;

use stockcart_core::{CoreError, ProductId};

// =============================================================================
// User-Facing Messages
// =============================================================================

/// Shown when an add fails for any reason other than stock.
pub const ADD_FAILED: &str = "Error adding product";

/// Shown when a remove targets a product that isn't in the cart.
pub const REMOVE_FAILED: &str = "Error removing product";

/// Shown when an amount update fails for any reason other than stock.
pub const UPDATE_FAILED: &str = "Error updating product amount";

/// Shown when the requested amount exceeds the available stock.
pub const OUT_OF_STOCK: &str = "Requested quantity is out of stock";

/// Shown when the write-through fails and persistence notifications are on.
pub const PERSIST_FAILED: &str = "Cart changes could not be saved";

// =============================================================================
// Operation
// =============================================================================

/// The three mutating cart operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Remove,
    Update,
}

impl Operation {
    /// Generic failure message for this operation.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::Add => ADD_FAILED,
            Operation::Remove => REMOVE_FAILED,
            Operation::Update => UPDATE_FAILED,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Add => write!(f, "add_item"),
            Operation::Remove => write!(f, "remove_item"),
            Operation::Update => write!(f, "update_amount"),
        }
    }
}

// =============================================================================
// Collaborator Errors
// =============================================================================

/// Failure of a stock or catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The API has no record of this product.
    #[error("Product {0} not found")]
    UnknownProduct(ProductId),

    /// The request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The request failed (connection refused, non-2xx status, ...).
    #[error("Request failed: {0}")]
    Transport(String),

    /// The response body was not what we expected.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Failure of the persistence medium.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// Reading the snapshot failed.
    #[error("Snapshot read failed: {0}")]
    Read(String),

    /// Writing the snapshot failed.
    #[error("Snapshot write failed: {0}")]
    Write(String),

    /// The storage backend could not be opened.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

// =============================================================================
// Cart Error
// =============================================================================

/// Why a cart operation did not commit.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CartError {
    /// A cart rule rejected the request.
    #[error("{operation} rejected: {source}")]
    Validation {
        operation: Operation,
        #[source]
        source: CoreError,
    },

    /// A stock or catalog lookup failed.
    #[error("{operation} lookup failed: {source}")]
    Lookup {
        operation: Operation,
        #[source]
        source: LookupError,
    },

    /// Remove targeted a product that isn't in the cart.
    #[error("Product {0} is not in the cart")]
    NotFound(ProductId),

    /// Write-through failed after the in-memory cart was replaced.
    #[error("Write-through failed: {0}")]
    Persistence(#[from] PersistenceError),

    /// The session worker has stopped.
    #[error("Cart session is closed")]
    SessionClosed(Operation),
}

impl CartError {
    /// Wraps a core rule violation raised during `operation`.
    pub fn from_core(operation: Operation, err: CoreError) -> Self {
        match err {
            CoreError::ProductNotInCart(id) if operation == Operation::Remove => {
                CartError::NotFound(id)
            }
            other => CartError::Validation {
                operation,
                source: other,
            },
        }
    }

    /// Wraps a lookup failure raised during `operation`.
    pub fn lookup(operation: Operation, source: LookupError) -> Self {
        CartError::Lookup { operation, source }
    }

    /// Message shown to the user. Never includes the underlying cause.
    pub fn user_message(&self) -> &'static str {
        match self {
            CartError::Validation {
                source: CoreError::InsufficientStock { .. },
                ..
            } => OUT_OF_STOCK,
            CartError::Validation { operation, .. } => operation.failure_message(),
            CartError::Lookup { operation, .. } => operation.failure_message(),
            CartError::NotFound(_) => REMOVE_FAILED,
            CartError::Persistence(_) => PERSIST_FAILED,
            CartError::SessionClosed(operation) => operation.failure_message(),
        }
    }
}

/// Result type for cart operations.
pub type CartResult<T> = Result<T, CartError>;

// =============================================================================
// Config Error
// =============================================================================

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value failed validation.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// Reading the config file failed.
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for this schema.
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
