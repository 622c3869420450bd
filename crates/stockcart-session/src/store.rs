//! # Cart Store
//!
//! Owns the current cart and keeps the persisted snapshot in step with it.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         CartStore Lifecycle                             │
//! │                                                                         │
//! │  initialize(key)                                                       │
//! │     │                                                                   │
//! │     ├── blob absent ─────────────► empty cart                          │
//! │     ├── blob malformed ──────────► empty cart + warn! + rewrite        │
//! │     ├── blob with bad items ─────► repaired cart + warn! + rewrite     │
//! │     └── blob ok ─────────────────► decoded cart                        │
//! │                                                                         │
//! │  snapshot() ──► owned copy (readers can't mutate the store)            │
//! │                                                                         │
//! │  replace(cart)                                                         │
//! │     1. swap in-memory cart (subscribers wake up)                        │
//! │     2. save(key, cart.to_snapshot())  ← write-through                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The in-memory cart lives in a `watch` channel so any number of readers can
//! observe it without going through the worker queue.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use stockcart_core::Cart;

use crate::error::PersistenceError;
use crate::ports::PersistenceAdapter;

/// The current cart plus its write-through target.
pub struct CartStore {
    key: String,
    current: watch::Sender<Cart>,
    persistence: Arc<dyn PersistenceAdapter>,
}

impl CartStore {
    /// Loads the cart persisted under `key`.
    ///
    /// Never fails: unreadable or malformed snapshots start the session with
    /// an empty cart. A malformed or repaired snapshot is overwritten with the
    /// cart actually loaded; a read error leaves storage alone.
    pub async fn initialize(persistence: Arc<dyn PersistenceAdapter>, key: impl Into<String>) -> Self {
        let key = key.into();
        let (cart, repaired) = load_cart(persistence.as_ref(), &key).await;

        if repaired {
            match persistence.save(&key, &cart.to_snapshot()).await {
                Ok(()) => info!(key = %key, items = cart.len(), "Repaired cart written back"),
                Err(e) => warn!(key = %key, error = %e, "Failed to write back repaired cart"),
            }
        }

        info!(key = %key, items = cart.len(), "Cart store initialized");

        let (current, _) = watch::channel(cart);
        CartStore {
            key,
            current,
            persistence,
        }
    }

    /// Returns the storage key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns a copy of the current cart.
    pub fn snapshot(&self) -> Cart {
        self.current.borrow().clone()
    }

    /// Returns a receiver that observes every committed cart.
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.current.subscribe()
    }

    /// Replaces the in-memory cart and writes it through.
    ///
    /// The in-memory swap always happens. A failed write is returned to the
    /// caller but not rolled back.
    pub async fn replace(&mut self, cart: Cart) -> Result<(), PersistenceError> {
        let bytes = cart.to_snapshot();
        let items = cart.len();

        self.current.send_replace(cart);
        debug!(key = %self.key, items, "In-memory cart replaced");

        self.persistence.save(&self.key, &bytes).await
    }
}

/// Returns the loaded cart and whether it differs from what storage holds.
async fn load_cart(persistence: &dyn PersistenceAdapter, key: &str) -> (Cart, bool) {
    let bytes = match persistence.load(key).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            debug!(key = %key, "No persisted cart, starting empty");
            return (Cart::new(), false);
        }
        Err(e) => {
            warn!(key = %key, error = %e, "Failed to read persisted cart, starting empty");
            return (Cart::new(), false);
        }
    };

    match Cart::from_snapshot(&bytes) {
        Ok((cart, 0)) => (cart, false),
        Ok((cart, dropped)) => {
            warn!(key = %key, dropped, "Persisted cart had invalid items, dropped them");
            (cart, true)
        }
        Err(e) => {
            warn!(key = %key, error = %e, "Persisted cart is malformed, starting empty");
            (Cart::new(), true)
        }
    }
}
