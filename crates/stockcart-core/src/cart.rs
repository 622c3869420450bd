//! # Cart
//!
//! The ordered cart collection and every transformation the operations
//! engine applies to it.
//!
//! ## Working-Copy Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How the engine uses this type                        │
//! │                                                                         │
//! │   snapshot ──clone──► working copy ──mutate──► Ok?  ──► replace()       │
//! │                                         │                               │
//! │                                         └──── Err ──► drop working copy │
//! │                                                                         │
//! │  Every mutator validates BEFORE touching `items`, so a failed call     │
//! │  leaves the cart exactly as it was.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Items are unique by `id`
//! - Every item has `amount >= 1`
//! - Order is the order of first add

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Product, ProductId, Stock};
use crate::validation::{check_stock, validate_line_item, validate_requested_amount};
use crate::INITIAL_AMOUNT;

// =============================================================================
// Line Item
// =============================================================================

/// One product in the cart.
///
/// ## Design Notes
/// Everything except `amount` is a frozen copy of the catalog record taken
/// when the product was first added, including fields the cart doesn't
/// know about (kept in `extra`). Nothing is ever refreshed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product identifier, unique within the cart.
    pub id: ProductId,

    /// Display name at time of adding (frozen).
    #[serde(default)]
    pub title: String,

    /// Price at time of adding (frozen, display only).
    #[serde(default)]
    pub price: f64,

    /// Image URL at time of adding (frozen).
    #[serde(default)]
    pub image: String,

    /// Units in the cart. Always >= 1.
    pub amount: i64,

    /// Remaining catalog fields, serialized inline.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LineItem {
    /// Creates a line item from a catalog product with the initial amount.
    pub fn from_product(product: &Product) -> Self {
        // a catalog "amount" would collide with ours
        let extra = product
            .extra
            .iter()
            .filter(|(key, _)| key.as_str() != "amount")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        LineItem {
            id: product.id,
            title: product.title.clone(),
            price: product.price,
            image: product.image.clone(),
            amount: INITIAL_AMOUNT,
            extra,
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The cart collection.
///
/// Serializes as a bare JSON array of line items, which is the persisted
/// snapshot layout. Decoding goes through [`Cart::from_snapshot`] so the
/// invariants are re-checked on the way in.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Builds a cart from raw items, dropping any that break the invariants.
    ///
    /// ## Behavior
    /// - Items with `amount <= 0` are dropped
    /// - Duplicate ids keep the first occurrence
    ///
    /// ## Returns
    /// The cart and the number of items dropped.
    pub fn from_items(items: Vec<LineItem>) -> (Self, usize) {
        let total = items.len();
        let mut seen = HashSet::with_capacity(total);

        let items: Vec<LineItem> = items
            .into_iter()
            .filter(|item| validate_line_item(item).is_ok())
            .filter(|item| seen.insert(item.id))
            .collect();

        let dropped = total - items.len();
        (Cart { items }, dropped)
    }

    /// Decodes a persisted snapshot, repairing what can be repaired.
    ///
    /// ## Behavior
    /// - Not a JSON array: `InvalidSnapshot` error
    /// - Entries that don't decode as a line item are dropped one by one
    /// - Invariant violations are dropped via [`Cart::from_items`]
    ///
    /// ## Returns
    /// The cart and the total number of entries dropped.
    pub fn from_snapshot(bytes: &[u8]) -> CoreResult<(Self, usize)> {
        let entries: Vec<Value> = serde_json::from_slice(bytes).map_err(|e| {
            CoreError::from(ValidationError::InvalidSnapshot {
                reason: e.to_string(),
            })
        })?;

        let total = entries.len();
        let items: Vec<LineItem> = entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect();
        let undecodable = total - items.len();

        let (cart, dropped) = Cart::from_items(items);
        Ok((cart, undecodable + dropped))
    }

    /// Encodes the cart as the persisted snapshot (JSON array).
    pub fn to_snapshot(&self) -> Vec<u8> {
        // A Vec of plain structs with string keys cannot fail to serialize.
        serde_json::to_vec(&self.items).unwrap_or_else(|_| b"[]".to_vec())
    }

    // =========================================================================
    // Read Access
    // =========================================================================

    /// Returns the items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Iterates over the items in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }

    /// Returns the number of distinct products.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the line item for a product, if present.
    pub fn find(&self, id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Checks if a product is in the cart.
    pub fn contains(&self, id: ProductId) -> bool {
        self.find(id).is_some()
    }

    /// Returns the amount held for a product, if present.
    pub fn amount_of(&self, id: ProductId) -> Option<i64> {
        self.find(id).map(|item| item.amount)
    }

    /// Returns the total number of units across all items.
    pub fn total_amount(&self) -> i64 {
        self.items.iter().map(|item| item.amount).sum()
    }

    /// Returns amounts keyed by product, for badge counters and the like.
    pub fn amount_by_product(&self) -> BTreeMap<ProductId, i64> {
        self.items.iter().map(|item| (item.id, item.amount)).collect()
    }

    // =========================================================================
    // Transformations
    // =========================================================================

    /// Appends a product that is not yet in the cart, with amount 1.
    pub fn push_new(&mut self, product: &Product) -> CoreResult<()> {
        if self.contains(product.id) {
            return Err(CoreError::ProductAlreadyInCart(product.id));
        }

        self.items.push(LineItem::from_product(product));
        Ok(())
    }

    /// Adds one unit to a product already in the cart.
    ///
    /// ## Returns
    /// The new amount.
    ///
    /// ## Errors
    /// - `ProductNotInCart` if the product is absent
    /// - `InsufficientStock` if `amount + 1` exceeds `stock` or `i64::MAX`
    pub fn increment(&mut self, id: ProductId, stock: Stock) -> CoreResult<i64> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(CoreError::ProductNotInCart(id))?;

        let requested = item
            .amount
            .checked_add(1)
            .ok_or(CoreError::InsufficientStock {
                product_id: id,
                available: stock.amount,
                requested: i64::MAX,
            })?;
        check_stock(id, requested, &stock)?;

        item.amount = requested;
        Ok(requested)
    }

    /// Sets the absolute amount of a product.
    ///
    /// ## Behavior
    /// - `amount <= 0`: validation error, nothing changes
    /// - `amount > stock`: `InsufficientStock`, nothing changes
    /// - product absent: `Ok(false)`, nothing changes (never creates an item)
    /// - otherwise: `Ok(true)` and the amount is set
    pub fn set_amount(&mut self, id: ProductId, amount: i64, stock: Stock) -> CoreResult<bool> {
        validate_requested_amount(amount)?;
        check_stock(id, amount, &stock)?;

        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.amount = amount;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Removes a product from the cart.
    ///
    /// ## Returns
    /// The removed line item.
    pub fn remove(&mut self, id: ProductId) -> CoreResult<LineItem> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(CoreError::ProductNotInCart(id))?;

        Ok(self.items.remove(index))
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
