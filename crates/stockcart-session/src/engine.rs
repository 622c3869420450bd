//! # Cart Operations Engine
//!
//! add / remove / update as validated transformations over the [`CartStore`].
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        One Operation                                    │
//! │                                                                         │
//! │  1. Lookup     StockOracle (+ ProductCatalog for a first add)          │
//! │                    │ fails ──────────────► notify "<op> failed"         │
//! │                    ▼                                                    │
//! │  2. Transform  working = store.snapshot(); mutate working              │
//! │                    │ rule broken ────────► notify (stock / not found)   │
//! │                    │ nothing to do ──────► Unchanged, no notification   │
//! │                    ▼                                                    │
//! │  3. Commit     store.replace(working)    ← exactly once, after 1 + 2   │
//! │                    │ write fails ────────► error! (+ optional notify)   │
//! │                    ▼                                                    │
//! │                Committed                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Steps 1 to 3 run under `&mut self`, so one engine never interleaves two
//! operations. [`crate::worker`] puts the engine behind a queue so callers
//! sharing a session get the same guarantee.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use stockcart_core::validation::check_stock;
use stockcart_core::{Cart, ProductId, INITIAL_AMOUNT};

use crate::error::{CartError, CartResult, Operation};
use crate::ports::{Notifier, ProductCatalog, Severity, StockOracle};
use crate::store::CartStore;

// =============================================================================
// Outcome
// =============================================================================

/// What an operation did to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The cart changed and was written through.
    Committed,

    /// Nothing to do (non-positive update amount, update of an absent
    /// product). No notification.
    Unchanged,

    /// The operation failed; the cart is as it was and the user was notified.
    Rejected,
}

impl Outcome {
    /// Returns true if the cart changed.
    pub fn is_committed(&self) -> bool {
        matches!(self, Outcome::Committed)
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Applies cart operations against one [`CartStore`].
pub struct CartEngine {
    store: CartStore,
    stock: Arc<dyn StockOracle>,
    catalog: Arc<dyn ProductCatalog>,
    notifier: Arc<dyn Notifier>,
    notify_persistence_failures: bool,
}

impl CartEngine {
    pub fn new(
        store: CartStore,
        stock: Arc<dyn StockOracle>,
        catalog: Arc<dyn ProductCatalog>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        CartEngine {
            store,
            stock,
            catalog,
            notifier,
            notify_persistence_failures: false,
        }
    }

    /// Also notify the user when the write-through fails.
    pub fn notify_persistence_failures(mut self, enabled: bool) -> Self {
        self.notify_persistence_failures = enabled;
        self
    }

    /// Returns the store this engine mutates.
    pub fn store(&self) -> &CartStore {
        &self.store
    }

    pub fn notifier(&self) -> Arc<dyn Notifier> {
        self.notifier.clone()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Adds one unit of `id`.
    ///
    /// ## Behavior
    /// - Not in cart: fetched from the catalog and appended with amount 1,
    ///   but only if stock is at least 1. With zero stock the add is
    ///   rejected as out of stock and the catalog is never called.
    /// - In cart: amount + 1, if stock allows
    ///
    /// Stock is read fresh on every call.
    pub async fn add_item(&mut self, id: ProductId) -> Outcome {
        debug!(product_id = %id, "add_item");
        let result = self.try_add(id).await;
        self.settle(Operation::Add, id, result).await
    }

    /// Removes `id` from the cart. No stock lookup.
    pub async fn remove_item(&mut self, id: ProductId) -> Outcome {
        debug!(product_id = %id, "remove_item");
        let result = self.try_remove(id);
        self.settle(Operation::Remove, id, result).await
    }

    /// Sets the amount of `id` to `amount`.
    ///
    /// ## Behavior
    /// - `amount <= 0`: Unchanged, silently, before any stock lookup
    /// - `amount > stock`: Rejected with the out-of-stock notification
    /// - product not in cart: Unchanged (never creates an item)
    pub async fn update_amount(&mut self, id: ProductId, amount: i64) -> Outcome {
        debug!(product_id = %id, amount, "update_amount");
        let result = self.try_update(id, amount).await;
        self.settle(Operation::Update, id, result).await
    }

    // =========================================================================
    // Transformations
    // =========================================================================
    //
    // Each returns the working copy to commit, or `None` when there is
    // nothing to commit. None of them touch the store.

    async fn try_add(&self, id: ProductId) -> CartResult<Option<Cart>> {
        let op = Operation::Add;
        let stock = self
            .stock
            .get_stock(id)
            .await
            .map_err(|e| CartError::lookup(op, e))?;

        let mut working = self.store.snapshot();

        if working.contains(id) {
            working
                .increment(id, stock)
                .map_err(|e| CartError::from_core(op, e))?;
        } else {
            check_stock(id, INITIAL_AMOUNT, &stock).map_err(|e| CartError::from_core(op, e))?;

            let product = self
                .catalog
                .get_product(id)
                .await
                .map_err(|e| CartError::lookup(op, e))?;

            working
                .push_new(&product)
                .map_err(|e| CartError::from_core(op, e))?;
        }

        Ok(Some(working))
    }

    fn try_remove(&self, id: ProductId) -> CartResult<Option<Cart>> {
        let mut working = self.store.snapshot();
        working
            .remove(id)
            .map_err(|e| CartError::from_core(Operation::Remove, e))?;
        Ok(Some(working))
    }

    async fn try_update(&self, id: ProductId, amount: i64) -> CartResult<Option<Cart>> {
        let op = Operation::Update;

        if amount <= 0 {
            debug!(product_id = %id, amount, "Non-positive amount, ignoring");
            return Ok(None);
        }

        let stock = self
            .stock
            .get_stock(id)
            .await
            .map_err(|e| CartError::lookup(op, e))?;

        let mut working = self.store.snapshot();
        let changed = working
            .set_amount(id, amount, stock)
            .map_err(|e| CartError::from_core(op, e))?;

        if !changed {
            warn!(product_id = %id, "update_amount on a product not in the cart");
            return Ok(None);
        }

        Ok(Some(working))
    }

    // =========================================================================
    // Commit / Reject
    // =========================================================================

    async fn settle(
        &mut self,
        operation: Operation,
        id: ProductId,
        result: CartResult<Option<Cart>>,
    ) -> Outcome {
        match result {
            Ok(Some(cart)) => self.commit(operation, id, cart).await,
            Ok(None) => Outcome::Unchanged,
            Err(e) => {
                warn!(%operation, product_id = %id, error = %e, "Cart operation rejected");
                self.notifier.notify(e.user_message(), Severity::Error);
                Outcome::Rejected
            }
        }
    }

    async fn commit(&mut self, operation: Operation, id: ProductId, cart: Cart) -> Outcome {
        let items = cart.len();
        let total = cart.total_amount();

        match self.store.replace(cart).await {
            Ok(()) => {
                info!(%operation, product_id = %id, items, total, "Cart committed");
            }
            Err(e) => {
                let err = CartError::from(e);
                error!(%operation, product_id = %id, error = %err, "Cart committed in memory only");
                if self.notify_persistence_failures {
                    self.notifier.notify(err.user_message(), Severity::Warning);
                }
            }
        }

        Outcome::Committed
    }
}
