//! # Domain Types
//!
//! Identifiers and the records handed to us by the catalog and stock APIs.
//!
//! ## Wire Shapes
//! ```text
//! GET /products/{id}   →  { "id": 1, "title": "...", "price": 179.9, "image": "..." }
//! GET /stock/{id}      →  { "id": 1, "amount": 5 }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// =============================================================================
// Product Id
// =============================================================================

/// Stable product identifier.
///
/// Serialized as a bare integer so snapshots stay compatible with the
/// storefront's `[{ "id": 1, ... }]` layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl ProductId {
    /// Returns the raw integer id.
    #[inline]
    pub const fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        ProductId(id)
    }
}

// =============================================================================
// Product
// =============================================================================

/// Product metadata as returned by the catalog.
///
/// ## Price
/// `price` is display data only. The cart never does arithmetic on it, so it
/// is kept exactly as the catalog reports it.
///
/// ## Extra fields
/// Catalogs send more than the cart reads (brand, sizes, ...). Anything not
/// named below lands in `extra` and is carried into the line item verbatim.
/// Missing display fields default to empty rather than failing the lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier.
    pub id: ProductId,

    /// Display name.
    #[serde(default)]
    pub title: String,

    /// Unit price as reported by the catalog.
    #[serde(default)]
    pub price: f64,

    /// Image URL.
    #[serde(default)]
    pub image: String,

    /// Every other catalog field.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =============================================================================
// Stock
// =============================================================================

/// Units of a product currently available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    /// Product identifier.
    pub id: ProductId,

    /// Available units.
    pub amount: i64,
}

impl Stock {
    /// Creates a stock record.
    pub fn new(id: ProductId, amount: i64) -> Self {
        Stock { id, amount }
    }

    /// Returns true if `requested` units can be held in the cart.
    #[inline]
    pub fn covers(&self, requested: i64) -> bool {
        requested <= self.amount
    }
}
