//! # Error Types
//!
//! Domain-specific error types for stockcart-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockcart-core errors (this file)                                     │
//! │  ├── CoreError        - Cart rule violations                           │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  stockcart-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  stockcart-session errors                                              │
//! │  └── CartError        - Operation outcome, picks the user message      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CartError → notification          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::ProductId;

// =============================================================================
// Core Error
// =============================================================================

/// Cart rule violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The product is not in the cart.
    ///
    /// ## When This Occurs
    /// - Removing a product that was never added
    /// - Removing the same product twice
    #[error("Product {0} is not in the cart")]
    ProductNotInCart(ProductId),

    /// The product is already in the cart.
    ///
    /// Appending must go through `increment` instead.
    #[error("Product {0} is already in the cart")]
    ProductAlreadyInCart(ProductId),

    /// Requested amount is more than the stock can cover.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart holds 2, stock is 2
    ///      │
    ///      ▼
    /// add_item(id)  → requested 3
    ///      │
    ///      ▼
    /// InsufficientStock { available: 2, requested: 3 }
    ///      │
    ///      ▼
    /// UI shows: "Requested quantity is out of stock"
    /// ```
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: ProductId,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value appears more than once where it must be unique.
    #[error("{field} '{value}' appears more than once")]
    Duplicate { field: String, value: String },

    /// Persisted snapshot could not be decoded.
    #[error("snapshot has invalid format: {reason}")]
    InvalidSnapshot { reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
