//! Fakes shared by the session tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use stockcart_core::{LineItem, Product, ProductId, Stock};

use crate::error::LookupError;
use crate::ports::{Notifier, ProductCatalog, Severity, StockOracle};

pub const KEY: &str = "@RocketShoes:cart";

pub fn product(id: i64) -> Product {
    Product {
        id: ProductId(id),
        title: format!("Sneaker {}", id),
        price: 139.9,
        image: format!("https://img.example.com/{}.jpg", id),
        extra: serde_json::json!({ "brand": "Rocket", "sizes": [39, 40, 41] })
            .as_object()
            .cloned()
            .unwrap_or_default(),
    }
}

pub fn line_item(id: i64, amount: i64) -> LineItem {
    LineItem {
        amount,
        ..LineItem::from_product(&product(id))
    }
}

// =============================================================================
// Scripted catalog
// =============================================================================

/// Stock oracle and product catalog answering from a table.
///
/// Products without a stock entry are unknown to both lookups.
#[derive(Clone, Default)]
pub struct ScriptedCatalog {
    stock: Arc<Mutex<HashMap<ProductId, i64>>>,
    fail_stock: Arc<AtomicBool>,
    fail_catalog: Arc<AtomicBool>,
    panic_stock: Arc<AtomicBool>,
    delay: Option<Duration>,
    stock_calls: Arc<AtomicUsize>,
    catalog_calls: Arc<AtomicUsize>,
}

impl ScriptedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stock(self, id: i64, amount: i64) -> Self {
        self.set_stock(id, amount);
        self
    }

    /// Sleeps before answering each stock lookup.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_stock(&self, id: i64, amount: i64) {
        self.stock.lock().unwrap().insert(ProductId(id), amount);
    }

    pub fn fail_stock(&self, fail: bool) {
        self.fail_stock.store(fail, Ordering::SeqCst);
    }

    pub fn fail_catalog(&self, fail: bool) {
        self.fail_catalog.store(fail, Ordering::SeqCst);
    }

    /// Makes the next stock lookups panic instead of answering.
    pub fn panic_on_stock(&self, panic: bool) {
        self.panic_stock.store(panic, Ordering::SeqCst);
    }

    pub fn stock_calls(&self) -> usize {
        self.stock_calls.load(Ordering::SeqCst)
    }

    pub fn catalog_calls(&self) -> usize {
        self.catalog_calls.load(Ordering::SeqCst)
    }

    fn known(&self, id: ProductId) -> Option<i64> {
        self.stock.lock().unwrap().get(&id).copied()
    }
}

#[async_trait]
impl StockOracle for ScriptedCatalog {
    async fn get_stock(&self, id: ProductId) -> Result<Stock, LookupError> {
        self.stock_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.panic_stock.load(Ordering::SeqCst) {
            panic!("stock lookup blew up");
        }

        if self.fail_stock.load(Ordering::SeqCst) {
            return Err(LookupError::Transport("connection refused".to_string()));
        }

        self.known(id)
            .map(|amount| Stock::new(id, amount))
            .ok_or(LookupError::UnknownProduct(id))
    }
}

#[async_trait]
impl ProductCatalog for ScriptedCatalog {
    async fn get_product(&self, id: ProductId) -> Result<Product, LookupError> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_catalog.load(Ordering::SeqCst) {
            return Err(LookupError::Timeout);
        }

        self.known(id)
            .map(|_| product(id.get()))
            .ok_or(LookupError::UnknownProduct(id))
    }
}

// =============================================================================
// Recording notifier
// =============================================================================

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    seen: Arc<Mutex<Vec<(String, Severity)>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|(message, _)| message.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.lock().unwrap().is_empty()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        self.seen.lock().unwrap().push((message.to_string(), severity));
    }
}
