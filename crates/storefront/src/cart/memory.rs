//! In-memory cart backend for tests and local tooling.
//!
//! Stores raw [`CartDocument`]s per shopper, publishes a [`CartChange`] after
//! every successful write, and can be told to fail the next call of a given
//! kind.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, broadcast};
use tracing::debug;
use uniform_shop_core::{CartDocument, LineItem, ProductId, ShopperId, validate_quantity};

use super::backend::{BackendError, CartBackend, CartChange};

const FEED_CAPACITY: usize = 64;

/// Remote operation kinds, used for failure injection and the call log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOp {
    Fetch,
    Add,
    Update,
    Remove,
    Clear,
}

#[derive(Default)]
struct MemoryState {
    carts: HashMap<ShopperId, CartDocument>,
    feeds: HashMap<ShopperId, broadcast::Sender<CartChange>>,
    failures: HashMap<BackendOp, BackendError>,
    calls: Vec<BackendOp>,
}

impl MemoryState {
    /// Record the call and take any injected failure for it.
    fn begin(&mut self, op: BackendOp) -> Result<(), BackendError> {
        self.calls.push(op);
        self.failures.remove(&op).map_or(Ok(()), Err)
    }

    fn publish(&mut self, shopper: &ShopperId) {
        // No subscribers is fine
        let _ = self.feed(shopper).send(CartChange {
            shopper: shopper.clone(),
        });
    }

    fn feed(&mut self, shopper: &ShopperId) -> &broadcast::Sender<CartChange> {
        self.feeds
            .entry(shopper.clone())
            .or_insert_with(|| broadcast::channel(FEED_CAPACITY).0)
    }
}

/// In-memory [`CartBackend`].
///
/// Cheap to clone; clones share the same carts.
#[derive(Clone, Default)]
pub struct InMemoryCartBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryCartBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a shopper's stored document, as another device would, and
    /// notify subscribers.
    pub async fn seed(&self, shopper: &ShopperId, document: CartDocument) {
        let mut state = self.state.lock().await;
        state.carts.insert(shopper.clone(), document);
        state.publish(shopper);
    }

    /// The stored document for `shopper`, if any.
    pub async fn document(&self, shopper: &ShopperId) -> Option<CartDocument> {
        self.state.lock().await.carts.get(shopper).cloned()
    }

    /// Make the next `op` call fail with `error`.
    pub async fn fail_next(&self, op: BackendOp, error: BackendError) {
        self.state.lock().await.failures.insert(op, error);
    }

    /// Every call received so far, in order.
    pub async fn calls(&self) -> Vec<BackendOp> {
        self.state.lock().await.calls.clone()
    }

    /// Number of calls of kind `op` received so far.
    pub async fn call_count(&self, op: BackendOp) -> usize {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| **c == op)
            .count()
    }
}

#[async_trait]
impl CartBackend for InMemoryCartBackend {
    async fn fetch_cart(&self, shopper: &ShopperId) -> Result<Option<CartDocument>, BackendError> {
        let mut state = self.state.lock().await;
        state.begin(BackendOp::Fetch)?;
        Ok(state.carts.get(shopper).cloned())
    }

    async fn add_item(&self, shopper: &ShopperId, item: &LineItem) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;
        state.begin(BackendOp::Add)?;

        let document = state.carts.entry(shopper.clone()).or_default();
        match document
            .items
            .iter_mut()
            .find(|r| r.product_id == item.product_id)
        {
            Some(existing) => {
                let current = existing.quantity.unwrap_or(0).max(0);
                let merged = current.saturating_add(i64::from(item.quantity));
                validate_quantity(merged).map_err(|e| BackendError::Rejected(e.to_string()))?;
                existing.quantity = Some(merged);
            }
            None => document.items.push(item.to_record()),
        }
        debug!(shopper = %shopper, product_id = %item.product_id, "Stored cart line");

        state.publish(shopper);
        Ok(())
    }

    async fn update_item(
        &self,
        shopper: &ShopperId,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;
        state.begin(BackendOp::Update)?;

        let record = state
            .carts
            .get_mut(shopper)
            .and_then(|doc| doc.items.iter_mut().find(|r| &r.product_id == product_id))
            .ok_or_else(|| BackendError::NotFound(product_id.clone()))?;
        record.quantity = Some(i64::from(quantity));

        state.publish(shopper);
        Ok(())
    }

    async fn remove_item(
        &self,
        shopper: &ShopperId,
        product_id: &ProductId,
    ) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;
        state.begin(BackendOp::Remove)?;

        if let Some(document) = state.carts.get_mut(shopper) {
            document.items.retain(|r| &r.product_id != product_id);
        }

        state.publish(shopper);
        Ok(())
    }

    async fn clear_cart(&self, shopper: &ShopperId) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;
        state.begin(BackendOp::Clear)?;

        if let Some(document) = state.carts.get_mut(shopper) {
            document.items.clear();
        }

        state.publish(shopper);
        Ok(())
    }

    async fn subscribe(&self, shopper: &ShopperId) -> broadcast::Receiver<CartChange> {
        self.state.lock().await.feed(shopper).subscribe()
    }
}
