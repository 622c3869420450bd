//! # Single-Flight Worker
//!
//! Serializes every mutating call on a cart through one task.
//!
//! ## Why a queue
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Without a queue, two adds of the same product both read amount = 1    │
//! │  before either stock lookup returns:                                   │
//! │                                                                         │
//! │    add(1) ─ read 1 ─── await stock ─── write 2                         │
//! │    add(1) ──── read 1 ─── await stock ─── write 2   ← lost update      │
//! │                                                                         │
//! │  With the worker, each operation runs to completion first:            │
//! │                                                                         │
//! │    CartSession ──┐                                                     │
//! │    CartSession ──┼──mpsc──► CartWorker ──► engine.add_item(1) → 2      │
//! │    CartSession ──┘                     ──► engine.add_item(1) → 3      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads never queue: [`CartSession::get_cart`] reads the `watch` channel the
//! store publishes every commit to.
//!
//! If the worker task dies without a shutdown request, pending and later
//! calls are rejected with the operation's failure notification.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};

use stockcart_core::{Cart, ProductId};

use crate::config::CartConfig;
use crate::engine::{CartEngine, Outcome};
use crate::error::{CartError, Operation};
use crate::ports::{Notifier, PersistenceAdapter, ProductCatalog, Severity, StockOracle};
use crate::store::CartStore;

// =============================================================================
// Commands
// =============================================================================

enum Command {
    Add {
        id: ProductId,
        reply: oneshot::Sender<Outcome>,
    },
    Remove {
        id: ProductId,
        reply: oneshot::Sender<Outcome>,
    },
    Update {
        id: ProductId,
        amount: i64,
        reply: oneshot::Sender<Outcome>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

impl Command {
    fn operation(&self) -> Option<Operation> {
        match self {
            Command::Add { .. } => Some(Operation::Add),
            Command::Remove { .. } => Some(Operation::Remove),
            Command::Update { .. } => Some(Operation::Update),
            Command::Shutdown { .. } => None,
        }
    }

    /// Answers without running the operation.
    fn reject(self) {
        match self {
            Command::Add { reply, .. }
            | Command::Remove { reply, .. }
            | Command::Update { reply, .. } => {
                let _ = reply.send(Outcome::Rejected);
            }
            Command::Shutdown { reply } => {
                let _ = reply.send(());
            }
        }
    }
}

// =============================================================================
// Worker
// =============================================================================

/// Owns the engine and runs queued operations one at a time.
pub struct CartWorker {
    engine: CartEngine,
    commands: mpsc::Receiver<Command>,
    stopped: Arc<AtomicBool>,
}

impl CartWorker {
    /// Creates a worker and the session handle that feeds it.
    ///
    /// `capacity` bounds the queue; callers wait once it is full.
    pub fn new(engine: CartEngine, capacity: usize) -> (Self, CartSession) {
        let (tx, commands) = mpsc::channel(capacity.max(1));
        let cart = engine.store().subscribe();
        let notifier = engine.notifier();
        let stopped = Arc::new(AtomicBool::new(false));

        let worker = CartWorker {
            engine,
            commands,
            stopped: stopped.clone(),
        };
        let session = CartSession {
            commands: tx,
            cart,
            notifier,
            stopped,
        };

        (worker, session)
    }

    /// Runs the worker loop.
    ///
    /// This should be spawned as a background task. It returns after a
    /// shutdown request or once every session handle is dropped.
    pub async fn run(mut self) {
        self.serve().await;
        self.stopped.store(true, Ordering::SeqCst);
        info!("Cart worker stopped");
    }

    async fn serve(&mut self) {
        info!(key = %self.engine.store().key(), "Cart worker starting");

        while let Some(command) = self.commands.recv().await {
            match command {
                Command::Add { id, reply } => {
                    let outcome = self.engine.add_item(id).await;
                    let _ = reply.send(outcome);
                }
                Command::Remove { id, reply } => {
                    let outcome = self.engine.remove_item(id).await;
                    let _ = reply.send(outcome);
                }
                Command::Update { id, amount, reply } => {
                    let outcome = self.engine.update_amount(id, amount).await;
                    let _ = reply.send(outcome);
                }
                Command::Shutdown { reply } => {
                    info!("Cart worker shutting down");
                    self.drain().await;
                    // flag before replying so a waiting caller sees it
                    self.stopped.store(true, Ordering::SeqCst);
                    let _ = reply.send(());
                    break;
                }
            }
        }
    }

    /// Closes the queue and rejects whatever arrived after the shutdown request.
    async fn drain(&mut self) {
        self.commands.close();

        while let Some(command) = self.commands.recv().await {
            if let Some(operation) = command.operation() {
                warn!(%operation, "Operation queued after shutdown, rejecting");
            }
            command.reject();
        }
    }
}

// =============================================================================
// Session Handle
// =============================================================================

/// Handle to a running cart.
///
/// Cheap to clone; every clone feeds the same worker and sees the same cart.
#[derive(Clone)]
pub struct CartSession {
    commands: mpsc::Sender<Command>,
    cart: watch::Receiver<Cart>,
    notifier: Arc<dyn Notifier>,
    stopped: Arc<AtomicBool>,
}

impl CartSession {
    /// Spawns a worker for `engine` and returns its handle.
    pub fn start(engine: CartEngine, capacity: usize) -> Self {
        let (worker, session) = CartWorker::new(engine, capacity);
        tokio::spawn(worker.run());
        session
    }

    /// Loads the persisted cart and starts a session with the given collaborators.
    pub async fn open(
        config: &CartConfig,
        persistence: Arc<dyn PersistenceAdapter>,
        stock: Arc<dyn StockOracle>,
        catalog: Arc<dyn ProductCatalog>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let store = CartStore::initialize(persistence, config.cart_key()).await;
        let engine = CartEngine::new(store, stock, catalog, notifier)
            .notify_persistence_failures(config.session.notify_persistence_failures);

        Self::start(engine, config.session.queue_capacity)
    }

    /// Returns the current cart.
    pub fn get_cart(&self) -> Cart {
        self.cart.borrow().clone()
    }

    /// Returns a receiver that wakes on every committed change.
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.cart.clone()
    }

    /// Adds one unit of `id`. Waits for the operation to finish.
    pub async fn add_item(&self, id: ProductId) -> Outcome {
        self.request(Operation::Add, |reply| Command::Add { id, reply })
            .await
    }

    /// Removes `id` from the cart.
    pub async fn remove_item(&self, id: ProductId) -> Outcome {
        self.request(Operation::Remove, |reply| Command::Remove { id, reply })
            .await
    }

    /// Sets the amount of `id`.
    pub async fn update_amount(&self, id: ProductId, amount: i64) -> Outcome {
        self.request(Operation::Update, |reply| Command::Update { id, amount, reply })
            .await
    }

    /// Stops the worker after the operations already queued have run.
    ///
    /// Calls made afterwards return `Outcome::Rejected`.
    pub async fn shutdown(&self) {
        let (reply, done) = oneshot::channel();

        if self.commands.send(Command::Shutdown { reply }).await.is_err() {
            debug!("Cart worker already stopped");
            return;
        }

        let _ = done.await;
    }

    /// Returns true once the worker has stopped.
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    async fn request(
        &self,
        operation: Operation,
        command: impl FnOnce(oneshot::Sender<Outcome>) -> Command,
    ) -> Outcome {
        let (reply, outcome) = oneshot::channel();

        if self.commands.send(command(reply)).await.is_err() {
            return self.not_run(operation);
        }

        outcome.await.unwrap_or_else(|_| self.not_run(operation))
    }

    fn not_run(&self, operation: Operation) -> Outcome {
        let err = CartError::SessionClosed(operation);

        if self.stopped.load(Ordering::SeqCst) {
            warn!(error = %err, %operation, "Operation not run");
        } else {
            error!(error = %err, %operation, "Cart worker died, operation not run");
            self.notifier.notify(err.user_message(), Severity::Error);
        }

        Outcome::Rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryPersistence;
    use crate::error::{ADD_FAILED, OUT_OF_STOCK, UPDATE_FAILED};
    use crate::test_support::{line_item, RecordingNotifier, ScriptedCatalog, KEY};
    use std::time::Duration;

    async fn session_with(
        catalog: &ScriptedCatalog,
        persistence: &InMemoryPersistence,
        notifier: &RecordingNotifier,
    ) -> CartSession {
        CartSession::open(
            &CartConfig::default(),
            Arc::new(persistence.clone()),
            Arc::new(catalog.clone()),
            Arc::new(catalog.clone()),
            Arc::new(notifier.clone()),
        )
        .await
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let catalog = ScriptedCatalog::new().with_stock(1, 5);
        let persistence = InMemoryPersistence::new();
        let notifier = RecordingNotifier::new();
        let session = session_with(&catalog, &persistence, &notifier).await;

        assert_eq!(session.add_item(ProductId(1)).await, Outcome::Committed);
        assert_eq!(session.add_item(ProductId(1)).await, Outcome::Committed);
        assert_eq!(session.get_cart().amount_of(ProductId(1)), Some(2));

        assert_eq!(session.update_amount(ProductId(1), 10).await, Outcome::Rejected);
        assert_eq!(notifier.messages(), vec![OUT_OF_STOCK]);
        assert_eq!(session.get_cart().amount_of(ProductId(1)), Some(2));

        assert_eq!(session.remove_item(ProductId(1)).await, Outcome::Committed);
        assert!(session.get_cart().is_empty());
        assert_eq!(persistence.get(KEY), Some(b"[]".to_vec()));
    }

    #[tokio::test]
    async fn test_concurrent_adds_do_not_lose_updates() {
        let catalog = ScriptedCatalog::new()
            .with_stock(1, 5)
            .with_delay(Duration::from_millis(20));
        let persistence = InMemoryPersistence::new()
            .with_entry(KEY, Cart::from_items(vec![line_item(1, 1)]).0.to_snapshot());
        let notifier = RecordingNotifier::new();
        let session = session_with(&catalog, &persistence, &notifier).await;

        let other = session.clone();
        let (a, b) = tokio::join!(session.add_item(ProductId(1)), other.add_item(ProductId(1)));

        assert_eq!(a, Outcome::Committed);
        assert_eq!(b, Outcome::Committed);
        assert_eq!(session.get_cart().amount_of(ProductId(1)), Some(3));
    }

    #[tokio::test]
    async fn test_concurrent_adds_respect_stock() {
        let catalog = ScriptedCatalog::new()
            .with_stock(1, 2)
            .with_delay(Duration::from_millis(10));
        let persistence = InMemoryPersistence::new();
        let notifier = RecordingNotifier::new();
        let session = session_with(&catalog, &persistence, &notifier).await;

        let (a, b, c) = tokio::join!(
            session.add_item(ProductId(1)),
            session.add_item(ProductId(1)),
            session.add_item(ProductId(1))
        );

        let committed = [a, b, c].iter().filter(|o| o.is_committed()).count();
        assert_eq!(committed, 2);
        assert_eq!(session.get_cart().amount_of(ProductId(1)), Some(2));
        assert_eq!(notifier.messages(), vec![OUT_OF_STOCK]);
    }

    #[tokio::test]
    async fn test_subscriber_sees_commits() {
        let catalog = ScriptedCatalog::new().with_stock(3, 5);
        let persistence = InMemoryPersistence::new();
        let notifier = RecordingNotifier::new();
        let session = session_with(&catalog, &persistence, &notifier).await;
        let mut rx = session.subscribe();

        session.add_item(ProductId(3)).await;

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().amount_of(ProductId(3)), Some(1));
    }

    #[tokio::test]
    async fn test_calls_after_shutdown_are_rejected() {
        let catalog = ScriptedCatalog::new().with_stock(1, 5);
        let persistence = InMemoryPersistence::new();
        let notifier = RecordingNotifier::new();
        let session = session_with(&catalog, &persistence, &notifier).await;

        assert_eq!(session.add_item(ProductId(1)).await, Outcome::Committed);
        session.shutdown().await;

        assert!(session.is_closed());
        assert_eq!(session.add_item(ProductId(1)).await, Outcome::Rejected);
        assert_eq!(session.remove_item(ProductId(1)).await, Outcome::Rejected);

        // last committed cart stays readable
        assert_eq!(session.get_cart().amount_of(ProductId(1)), Some(1));
        assert!(notifier.is_empty());

        // second shutdown is a no-op
        session.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_runs_already_queued_operations() {
        let catalog = ScriptedCatalog::new()
            .with_stock(1, 5)
            .with_delay(Duration::from_millis(10));
        let persistence = InMemoryPersistence::new();
        let notifier = RecordingNotifier::new();
        let session = session_with(&catalog, &persistence, &notifier).await;

        let (added, _) = tokio::join!(session.add_item(ProductId(1)), async {
            tokio::task::yield_now().await;
            session.shutdown().await;
        });

        assert_eq!(added, Outcome::Committed);
        assert_eq!(session.get_cart().amount_of(ProductId(1)), Some(1));
    }

    #[tokio::test]
    async fn test_worker_panic_rejects_and_notifies() {
        let catalog = ScriptedCatalog::new().with_stock(1, 5);
        let persistence = InMemoryPersistence::new();
        let notifier = RecordingNotifier::new();
        let session = session_with(&catalog, &persistence, &notifier).await;

        assert_eq!(session.add_item(ProductId(1)).await, Outcome::Committed);

        catalog.panic_on_stock(true);
        assert_eq!(session.add_item(ProductId(1)).await, Outcome::Rejected);
        assert_eq!(notifier.messages(), vec![ADD_FAILED]);

        // later calls are refused the same way
        assert_eq!(session.update_amount(ProductId(1), 2).await, Outcome::Rejected);
        assert_eq!(notifier.messages(), vec![ADD_FAILED, UPDATE_FAILED]);

        assert!(session.is_closed());
        assert_eq!(session.get_cart().amount_of(ProductId(1)), Some(1));
        session.shutdown().await;
    }

    #[tokio::test]
    async fn test_add_at_max_amount_keeps_worker_alive() {
        let catalog = ScriptedCatalog::new().with_stock(1, i64::MAX);
        let persistence = InMemoryPersistence::new()
            .with_entry(KEY, Cart::from_items(vec![line_item(1, i64::MAX)]).0.to_snapshot());
        let notifier = RecordingNotifier::new();
        let session = session_with(&catalog, &persistence, &notifier).await;

        assert_eq!(session.add_item(ProductId(1)).await, Outcome::Rejected);
        assert_eq!(notifier.messages(), vec![OUT_OF_STOCK]);

        assert_eq!(session.update_amount(ProductId(1), 3).await, Outcome::Committed);
        assert_eq!(session.get_cart().amount_of(ProductId(1)), Some(3));
        assert!(!session.is_closed());
    }
}
