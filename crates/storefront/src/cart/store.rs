//! Local mirror of each shopper's remote cart.
//!
//! Every mutation is write-through: the remote store is written first and the
//! mirror changes only after it confirms. A mutation holds the shopper's
//! state lock across the remote call, so readers see either the state before
//! it or the state after it.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, broadcast::error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};
use uniform_shop_core::catalog::{SelectionError, Selection};
use uniform_shop_core::{
    CartLines, CartTotals, LineItem, LineItemAttributes, LineItemError, Placeholders,
    PriceAggregator, ProductId, ShopperId, validate_quantity,
};

use super::backend::{BackendError, CartBackend};
use super::notify::{Notification, NotificationSink, Outcome};
use crate::catalog::CatalogSource;
use crate::config::StorefrontConfig;
use crate::error::{CartError, CartOperation, Result};

/// Where the mirror stands relative to the remote cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum CartStatus {
    /// Not yet loaded.
    Loading,
    /// Mirrors the remote cart.
    Ready,
    /// The last load failed; items are empty.
    Failed(String),
}

/// A consistent read of one shopper's cart.
///
/// `totals` is always computed from `items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub status: CartStatus,
    pub items: Vec<LineItem>,
    pub totals: CartTotals,
}

impl CartSnapshot {
    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Quantity of `product_id` in the cart, if present.
    #[must_use]
    pub fn quantity_of(&self, product_id: &ProductId) -> Option<u32> {
        self.items
            .iter()
            .find(|i| &i.product_id == product_id)
            .map(|i| i.quantity)
    }
}

struct CartState {
    lines: CartLines,
    status: CartStatus,
}

impl CartState {
    const fn new() -> Self {
        Self {
            lines: CartLines::new(),
            status: CartStatus::Loading,
        }
    }

    fn is_ready(&self) -> bool {
        self.status == CartStatus::Ready
    }
}

/// Cart store shared across the UI layer.
///
/// Cheap to clone; clones share the same mirrors.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    backend: Arc<dyn CartBackend>,
    pricing: PriceAggregator,
    placeholders: Placeholders,
    notifier: Option<Arc<dyn NotificationSink>>,
    carts: Mutex<HashMap<ShopperId, Arc<Mutex<CartState>>>>,
    watchers: Mutex<HashMap<ShopperId, JoinHandle<()>>>,
}

impl CartStore {
    /// Create a store over `backend` using the configured pricing and placeholders.
    #[must_use]
    pub fn new(backend: Arc<dyn CartBackend>, config: &StorefrontConfig) -> Self {
        Self::build(backend, config, None)
    }

    /// Create a store that reports every finished mutation to `notifier`.
    #[must_use]
    pub fn with_notifier(
        backend: Arc<dyn CartBackend>,
        config: &StorefrontConfig,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self::build(backend, config, Some(notifier))
    }

    fn build(
        backend: Arc<dyn CartBackend>,
        config: &StorefrontConfig,
        notifier: Option<Arc<dyn NotificationSink>>,
    ) -> Self {
        Self {
            inner: Arc::new(CartStoreInner {
                backend,
                pricing: config.pricing(),
                placeholders: config.placeholders(),
                notifier,
                carts: Mutex::new(HashMap::new()),
                watchers: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// The aggregator used for snapshot totals.
    #[must_use]
    pub fn pricing(&self) -> &PriceAggregator {
        &self.inner.pricing
    }

    async fn state(&self, shopper: &ShopperId) -> Arc<Mutex<CartState>> {
        Arc::clone(
            self.inner
                .carts
                .lock()
                .await
                .entry(shopper.clone())
                .or_insert_with(|| Arc::new(Mutex::new(CartState::new()))),
        )
    }

    fn snapshot_of(&self, state: &CartState) -> CartSnapshot {
        CartSnapshot {
            status: state.status.clone(),
            items: state.lines.as_slice().to_vec(),
            totals: self.inner.pricing.totals(&state.lines),
        }
    }

    /// Reject `lines` if its totals cannot be represented.
    fn check_totals(&self, lines: &CartLines) -> Result<()> {
        self.inner
            .pricing
            .checked_totals(lines)
            .map(|_| ())
            .ok_or(CartError::Validation(LineItemError::TotalTooLarge))
    }

    /// Current view of `shopper`'s cart. An unseen shopper reads as `Loading`.
    pub async fn snapshot(&self, shopper: &ShopperId) -> CartSnapshot {
        let state = self.state(shopper).await;
        let guard = state.lock().await;
        self.snapshot_of(&guard)
    }

    // =========================================================================
    // Load
    // =========================================================================

    /// Replace the mirror with the remote cart.
    ///
    /// Idempotent. Missing prices, names and images are normalized.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Persistence`] if the remote read fails; the mirror
    /// is then empty with status [`CartStatus::Failed`].
    #[instrument(skip(self), fields(shopper = %shopper))]
    pub async fn load(&self, shopper: &ShopperId) -> Result<CartSnapshot> {
        let state = self.state(shopper).await;
        let mut guard = state.lock().await;
        self.reload_locked(shopper, &mut guard).await?;
        Ok(self.snapshot_of(&guard))
    }

    async fn reload_locked(
        &self,
        shopper: &ShopperId,
        state: &mut CartState,
    ) -> std::result::Result<(), BackendError> {
        match self.inner.backend.fetch_cart(shopper).await {
            Ok(document) => {
                state.lines = document
                    .map(|doc| CartLines::from_document(&doc, &self.inner.placeholders))
                    .unwrap_or_default();
                state.status = CartStatus::Ready;
                debug!(lines = state.lines.len(), "Cart loaded");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to load cart");
                state.lines.clear();
                state.status = CartStatus::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Refresh after a confirmed write when the mirror was not loaded.
    ///
    /// The write already succeeded, so a failed refresh is only logged.
    async fn refresh_after_write(&self, shopper: &ShopperId, state: &mut CartState) {
        if let Err(e) = self.reload_locked(shopper, state).await {
            warn!(error = %e, "Cart written but refresh failed");
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` of a product, or increase the quantity already in the cart.
    ///
    /// An existing line keeps the price and attributes it was first added with.
    ///
    /// # Errors
    ///
    /// - [`CartError::Validation`] if `quantity < 1`, `price` is negative, or
    ///   the merged quantity or resulting totals are too large; nothing is
    ///   sent to the remote store.
    /// - [`CartError::Persistence`] if the remote write fails; the mirror is
    ///   unchanged.
    #[instrument(skip(self, price, attributes), fields(shopper = %shopper, product_id = %product_id))]
    pub async fn add_item(
        &self,
        shopper: &ShopperId,
        product_id: ProductId,
        quantity: i64,
        price: Decimal,
        attributes: LineItemAttributes,
    ) -> Result<CartSnapshot> {
        let reported = product_id.clone();
        let result = self
            .add_line(shopper, product_id, quantity, price, attributes)
            .await;
        self.report(shopper, CartOperation::Add, Some(reported), &result);
        result
    }

    async fn add_line(
        &self,
        shopper: &ShopperId,
        product_id: ProductId,
        quantity: i64,
        price: Decimal,
        attributes: LineItemAttributes,
    ) -> Result<CartSnapshot> {
        let item = LineItem::new(
            product_id,
            quantity,
            price,
            attributes,
            &self.inner.placeholders,
        )?;

        let state = self.state(shopper).await;
        let mut guard = state.lock().await;

        let next = if guard.is_ready() {
            let mut next = guard.lines.clone();
            let quantity = next.add(item.clone())?;
            self.check_totals(&next)?;
            Some((next, quantity))
        } else {
            None
        };

        self.inner
            .backend
            .add_item(shopper, &item)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to add item"))?;

        if let Some((lines, quantity)) = next {
            guard.lines = lines;
            info!(quantity, "Item added to cart");
        } else {
            self.refresh_after_write(shopper, &mut guard).await;
        }
        Ok(self.snapshot_of(&guard))
    }

    /// Add a catalog product with the shopper's chosen options.
    ///
    /// The product's current price, name and primary image become the line's
    /// snapshot. The requested quantity plus whatever is already in the cart
    /// must not exceed the product's stock.
    ///
    /// # Errors
    ///
    /// - [`CartError::Catalog`] if the product cannot be looked up.
    /// - [`CartError::Selection`] if the options are not offered or stock is short.
    /// - Otherwise as [`CartStore::add_item`].
    #[instrument(skip(self, catalog, selection), fields(shopper = %shopper, product_id = %product_id))]
    pub async fn add_product(
        &self,
        shopper: &ShopperId,
        catalog: &dyn CatalogSource,
        product_id: &ProductId,
        selection: &Selection,
    ) -> Result<CartSnapshot> {
        let result = self.add_selected(shopper, catalog, product_id, selection).await;
        self.report(shopper, CartOperation::Add, Some(product_id.clone()), &result);
        result
    }

    async fn add_selected(
        &self,
        shopper: &ShopperId,
        catalog: &dyn CatalogSource,
        product_id: &ProductId,
        selection: &Selection,
    ) -> Result<CartSnapshot> {
        let product = catalog.product(product_id).await?;
        let quantity = product.check_selection(selection)?;

        let in_cart = self.snapshot(shopper).await.quantity_of(product_id).unwrap_or(0);
        let requested = in_cart.saturating_add(quantity);
        if requested > product.details.stock {
            return Err(SelectionError::ExceedsStock {
                requested,
                available: product.details.stock,
            }
            .into());
        }

        self.add_line(
            shopper,
            product.id.clone(),
            i64::from(quantity),
            product.details.price.amount(),
            product.line_attributes(selection),
        )
        .await
    }

    /// Set a line's quantity.
    ///
    /// A quantity below 1 is ignored and nothing is sent to the remote store;
    /// use [`CartStore::remove_item`] to delete a line.
    ///
    /// # Errors
    ///
    /// - [`CartError::ItemNotFound`] if the product is not in the cart.
    /// - [`CartError::Validation`] if the quantity or resulting totals are too
    ///   large to store.
    /// - [`CartError::Persistence`] if the remote write fails; the mirror is
    ///   unchanged.
    #[instrument(skip(self), fields(shopper = %shopper, product_id = %product_id))]
    pub async fn update_quantity(
        &self,
        shopper: &ShopperId,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<CartSnapshot> {
        if quantity < 1 {
            debug!(quantity, "Ignoring quantity below 1");
            return Ok(self.snapshot(shopper).await);
        }

        let result = self.set_line_quantity(shopper, product_id, quantity).await;
        self.report(
            shopper,
            CartOperation::UpdateQuantity,
            Some(product_id.clone()),
            &result,
        );
        result
    }

    async fn set_line_quantity(
        &self,
        shopper: &ShopperId,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<CartSnapshot> {
        let quantity = validate_quantity(quantity)?;

        let state = self.state(shopper).await;
        let mut guard = state.lock().await;

        let next = if guard.is_ready() {
            let mut next = guard.lines.clone();
            if !next.set_quantity(product_id, quantity) {
                return Err(CartError::ItemNotFound(product_id.clone()));
            }
            self.check_totals(&next)?;
            Some(next)
        } else {
            None
        };

        match self
            .inner
            .backend
            .update_item(shopper, product_id, quantity)
            .await
        {
            Ok(()) => {}
            Err(BackendError::NotFound(id)) => return Err(CartError::ItemNotFound(id)),
            Err(e) => {
                error!(error = %e, "Failed to update quantity");
                return Err(e.into());
            }
        }

        if let Some(lines) = next {
            guard.lines = lines;
        } else {
            self.refresh_after_write(shopper, &mut guard).await;
        }
        Ok(self.snapshot_of(&guard))
    }

    /// Delete a line. Removing a product that is not in the cart succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Persistence`] if the remote write fails; the
    /// mirror is unchanged.
    #[instrument(skip(self), fields(shopper = %shopper, product_id = %product_id))]
    pub async fn remove_item(
        &self,
        shopper: &ShopperId,
        product_id: &ProductId,
    ) -> Result<CartSnapshot> {
        let result = self.remove_line(shopper, product_id).await;
        self.report(
            shopper,
            CartOperation::Remove,
            Some(product_id.clone()),
            &result,
        );
        result
    }

    async fn remove_line(
        &self,
        shopper: &ShopperId,
        product_id: &ProductId,
    ) -> Result<CartSnapshot> {
        let state = self.state(shopper).await;
        let mut guard = state.lock().await;

        match self.inner.backend.remove_item(shopper, product_id).await {
            Ok(()) => {}
            Err(BackendError::NotFound(_)) => debug!("Item already absent remotely"),
            Err(e) => {
                error!(error = %e, "Failed to remove item");
                return Err(e.into());
            }
        }

        if guard.is_ready() {
            if guard.lines.remove(product_id).is_none() {
                debug!("Item was not in the cart");
            }
        } else {
            self.refresh_after_write(shopper, &mut guard).await;
        }
        Ok(self.snapshot_of(&guard))
    }

    /// Remove every line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Persistence`] if the remote write fails; the
    /// mirror is unchanged.
    #[instrument(skip(self), fields(shopper = %shopper))]
    pub async fn clear_cart(&self, shopper: &ShopperId) -> Result<CartSnapshot> {
        let result = self.clear_lines(shopper).await;
        self.report(shopper, CartOperation::Clear, None, &result);
        result
    }

    async fn clear_lines(&self, shopper: &ShopperId) -> Result<CartSnapshot> {
        let state = self.state(shopper).await;
        let mut guard = state.lock().await;

        self.inner
            .backend
            .clear_cart(shopper)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to clear cart"))?;

        guard.lines.clear();
        guard.status = CartStatus::Ready;
        info!("Cart cleared");
        Ok(self.snapshot_of(&guard))
    }

    // =========================================================================
    // Change feed
    // =========================================================================

    /// Reload `shopper`'s mirror whenever the remote cart changes.
    ///
    /// Registers once per shopper; returns `false` if a watcher is already
    /// running.
    pub async fn watch(&self, shopper: &ShopperId) -> bool {
        let mut watchers = self.inner.watchers.lock().await;
        if watchers.get(shopper).is_some_and(|h| !h.is_finished()) {
            return false;
        }

        let mut feed = self.inner.backend.subscribe(shopper).await;
        let store = self.clone();
        let watched = shopper.clone();
        let handle = tokio::spawn(async move {
            loop {
                match feed.recv().await {
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(shopper = %watched, skipped, "Cart change feed lagged");
                    }
                    Err(RecvError::Closed) => {
                        debug!(shopper = %watched, "Cart change feed closed");
                        break;
                    }
                }
                // Drain queued pushes; one reload covers them all
                while feed.try_recv().is_ok() {}

                if let Err(e) = store.load(&watched).await {
                    warn!(shopper = %watched, error = %e, "Reload after remote change failed");
                }
            }
        });
        watchers.insert(shopper.clone(), handle);
        true
    }

    /// Stop watching `shopper`'s cart. Returns whether a watcher was running.
    pub async fn unwatch(&self, shopper: &ShopperId) -> bool {
        self.inner
            .watchers
            .lock()
            .await
            .remove(shopper)
            .is_some_and(|handle| {
                let running = !handle.is_finished();
                handle.abort();
                running
            })
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    fn report(
        &self,
        shopper: &ShopperId,
        operation: CartOperation,
        product_id: Option<ProductId>,
        result: &Result<CartSnapshot>,
    ) {
        let Some(notifier) = self.inner.notifier.clone() else {
            return;
        };
        let outcome = match result {
            Ok(_) => Outcome::Succeeded,
            Err(e) => Outcome::Failed {
                reason: e.user_message(operation),
            },
        };
        let notification = Notification::new(shopper.clone(), operation, product_id, outcome);

        tokio::spawn(async move {
            if let Err(e) = notifier.notify(notification).await {
                warn!(error = %e, "Cart notification dropped");
            }
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use uniform_shop_core::{CartDocument, CartLineRecord, Size};

    use super::*;
    use crate::cart::memory::{BackendOp, InMemoryCartBackend};

    fn setup() -> (CartStore, InMemoryCartBackend, ShopperId) {
        let backend = InMemoryCartBackend::new();
        let store = CartStore::new(Arc::new(backend.clone()), &StorefrontConfig::default());
        (store, backend, ShopperId::new("user_1"))
    }

    fn pid(id: &str) -> ProductId {
        ProductId::new(id)
    }

    fn ten() -> Decimal {
        Decimal::new(1000, 2)
    }

    /// A price whose double does not fit in a `Decimal`.
    fn huge() -> Decimal {
        Decimal::from_i128_with_scale(50_000_000_000_000_000_000_000_000_000, 0)
    }

    fn named(name: &str) -> LineItemAttributes {
        LineItemAttributes {
            name: Some(name.to_string()),
            ..LineItemAttributes::default()
        }
    }

    #[tokio::test]
    async fn test_unseen_shopper_is_loading() {
        let (store, _, shopper) = setup();
        let snapshot = store.snapshot(&shopper).await;
        assert_eq!(snapshot.status, CartStatus::Loading);
        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_load_normalizes_records() {
        let (store, backend, shopper) = setup();
        backend
            .seed(
                &shopper,
                CartDocument {
                    items: vec![CartLineRecord {
                        product_id: pid("A"),
                        quantity: Some(2),
                        price: None,
                        name: None,
                        image: None,
                        size: Some("M".to_string()),
                        custom_size: None,
                    }],
                },
            )
            .await;

        let snapshot = store.load(&shopper).await.unwrap();
        assert_eq!(snapshot.status, CartStatus::Ready);
        let line = &snapshot.items[0];
        assert_eq!(line.name, Placeholders::DEFAULT_NAME);
        assert_eq!(line.image, Placeholders::DEFAULT_IMAGE);
        assert_eq!(line.price.amount(), Decimal::ZERO);
        assert_eq!(line.size, Some(Size::Medium));
        assert_eq!(snapshot.totals.subtotal, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_load_failure_sets_failed_status() {
        let (store, backend, shopper) = setup();
        store.load(&shopper).await.unwrap();
        store
            .add_item(&shopper, pid("A"), 1, ten(), named("Shirt"))
            .await
            .unwrap();

        backend
            .fail_next(BackendOp::Fetch, BackendError::Unavailable("offline".to_string()))
            .await;
        let err = store.load(&shopper).await.unwrap_err();
        assert!(matches!(err, CartError::Persistence(_)));

        let snapshot = store.snapshot(&shopper).await;
        assert!(matches!(snapshot.status, CartStatus::Failed(_)));
        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_add_same_product_twice_merges() {
        let (store, _, shopper) = setup();
        store.load(&shopper).await.unwrap();

        store
            .add_item(&shopper, pid("A"), 2, ten(), named("Shirt"))
            .await
            .unwrap();
        let snapshot = store
            .add_item(&shopper, pid("A"), 1, ten(), named("Shirt"))
            .await
            .unwrap();

        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.quantity_of(&pid("A")), Some(3));
        assert_eq!(snapshot.totals.subtotal, Decimal::new(3000, 2));
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_before_remote() {
        let (store, backend, shopper) = setup();
        store.load(&shopper).await.unwrap();

        let err = store
            .add_item(&shopper, pid("A"), 0, ten(), named("Shirt"))
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::Validation(_)));

        let err = store
            .add_item(&shopper, pid("A"), 1, Decimal::new(-1, 0), named("Shirt"))
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::Validation(_)));
        assert_eq!(backend.call_count(BackendOp::Add).await, 0);
    }

    #[tokio::test]
    async fn test_failed_add_leaves_state() {
        let (store, backend, shopper) = setup();
        store.load(&shopper).await.unwrap();
        store
            .add_item(&shopper, pid("A"), 2, ten(), named("Shirt"))
            .await
            .unwrap();
        let before = store.snapshot(&shopper).await;

        backend
            .fail_next(BackendOp::Add, BackendError::Unavailable("timeout".to_string()))
            .await;
        let err = store
            .add_item(&shopper, pid("B"), 1, ten(), named("Tie"))
            .await
            .unwrap_err();

        assert!(matches!(err, CartError::Persistence(_)));
        assert_eq!(store.snapshot(&shopper).await, before);
    }

    #[tokio::test]
    async fn test_add_with_unrepresentable_total_is_rejected() {
        let (store, backend, shopper) = setup();
        store.load(&shopper).await.unwrap();

        let err = store
            .add_item(&shopper, pid("A"), 2, huge(), named("Gold"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CartError::Validation(LineItemError::TotalTooLarge)
        ));

        store
            .add_item(&shopper, pid("A"), 1, huge(), named("Gold"))
            .await
            .unwrap();
        let err = store
            .add_item(&shopper, pid("B"), 1, huge(), named("Crown"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CartError::Validation(LineItemError::TotalTooLarge)
        ));

        assert_eq!(backend.call_count(BackendOp::Add).await, 1);
        let snapshot = store.snapshot(&shopper).await;
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.totals.subtotal, huge());
    }

    #[tokio::test]
    async fn test_merge_past_quantity_limit_is_rejected() {
        let (store, backend, shopper) = setup();
        store.load(&shopper).await.unwrap();
        store
            .add_item(&shopper, pid("A"), i64::from(u32::MAX), Decimal::ONE, named("Sock"))
            .await
            .unwrap();

        let err = store
            .add_item(&shopper, pid("A"), 5, Decimal::ONE, named("Sock"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CartError::Validation(LineItemError::QuantityTooHigh(_))
        ));
        assert_eq!(backend.call_count(BackendOp::Add).await, 1);

        let reloaded = store.load(&shopper).await.unwrap();
        assert_eq!(reloaded.quantity_of(&pid("A")), Some(u32::MAX));
    }

    #[tokio::test]
    async fn test_update_with_unrepresentable_total_is_rejected() {
        let (store, backend, shopper) = setup();
        store.load(&shopper).await.unwrap();
        store
            .add_item(&shopper, pid("A"), 1, huge(), named("Gold"))
            .await
            .unwrap();

        let err = store
            .update_quantity(&shopper, &pid("A"), 2)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CartError::Validation(LineItemError::TotalTooLarge)
        ));
        assert_eq!(backend.call_count(BackendOp::Update).await, 0);
        assert_eq!(store.snapshot(&shopper).await.quantity_of(&pid("A")), Some(1));
    }

    #[tokio::test]
    async fn test_update_below_one_is_noop() {
        let (store, backend, shopper) = setup();
        store.load(&shopper).await.unwrap();
        store
            .add_item(&shopper, pid("A"), 2, ten(), named("Shirt"))
            .await
            .unwrap();

        for quantity in [0, -1] {
            let snapshot = store
                .update_quantity(&shopper, &pid("A"), quantity)
                .await
                .unwrap();
            assert_eq!(snapshot.quantity_of(&pid("A")), Some(2));
        }
        assert_eq!(backend.call_count(BackendOp::Update).await, 0);
    }

    #[tokio::test]
    async fn test_update_missing_is_item_not_found() {
        let (store, backend, shopper) = setup();
        store.load(&shopper).await.unwrap();
        store
            .add_item(&shopper, pid("A"), 1, ten(), named("Shirt"))
            .await
            .unwrap();
        let before = store.snapshot(&shopper).await;

        let err = store
            .update_quantity(&shopper, &pid("B"), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::ItemNotFound(ref id) if id == &pid("B")));
        assert_eq!(store.snapshot(&shopper).await, before);
        assert_eq!(backend.call_count(BackendOp::Update).await, 0);
    }

    #[tokio::test]
    async fn test_update_before_load_maps_remote_not_found() {
        let (store, _, shopper) = setup();
        let err = store
            .update_quantity(&shopper, &pid("B"), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::ItemNotFound(_)));
    }

    #[tokio::test]
    async fn test_update_sets_quantity() {
        let (store, backend, shopper) = setup();
        store.load(&shopper).await.unwrap();
        store
            .add_item(&shopper, pid("A"), 1, ten(), named("Shirt"))
            .await
            .unwrap();

        let snapshot = store.update_quantity(&shopper, &pid("A"), 4).await.unwrap();
        assert_eq!(snapshot.quantity_of(&pid("A")), Some(4));
        assert_eq!(
            backend.document(&shopper).await.unwrap().items[0].quantity,
            Some(4)
        );
    }

    #[tokio::test]
    async fn test_remove_absent_is_ok() {
        let (store, _, shopper) = setup();
        store.load(&shopper).await.unwrap();
        store
            .add_item(&shopper, pid("A"), 1, ten(), named("Shirt"))
            .await
            .unwrap();
        let before = store.snapshot(&shopper).await;

        let after = store.remove_item(&shopper, &pid("zzz")).await.unwrap();
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn test_clear_resets_to_shipping_only() {
        let (store, _, shopper) = setup();
        store.load(&shopper).await.unwrap();
        store
            .add_item(&shopper, pid("A"), 2, ten(), named("Shirt"))
            .await
            .unwrap();

        let snapshot = store.clear_cart(&shopper).await.unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.totals.total, snapshot.totals.shipping);
        assert_eq!(snapshot.totals.shipping, Decimal::new(499, 2));
    }

    #[tokio::test]
    async fn test_mutation_before_load_refreshes_from_remote() {
        let (store, backend, shopper) = setup();
        backend
            .seed(
                &shopper,
                CartDocument {
                    items: vec![
                        LineItem::new(pid("A"), 1, ten(), named("Shirt"), &Placeholders::default())
                            .unwrap()
                            .to_record(),
                    ],
                },
            )
            .await;

        let snapshot = store
            .add_item(&shopper, pid("B"), 1, ten(), named("Tie"))
            .await
            .unwrap();
        assert_eq!(snapshot.status, CartStatus::Ready);
        assert_eq!(snapshot.items.len(), 2);
    }

    #[tokio::test]
    async fn test_watch_reloads_on_remote_change() {
        let (store, backend, shopper) = setup();
        store.load(&shopper).await.unwrap();
        assert!(store.watch(&shopper).await);
        assert!(!store.watch(&shopper).await);

        let other_device = LineItem::new(pid("X"), 3, ten(), named("Blazer"), &Placeholders::default())
            .unwrap();
        backend
            .seed(
                &shopper,
                CartDocument {
                    items: vec![other_device.to_record()],
                },
            )
            .await;

        let mut seen = None;
        for _ in 0..100 {
            let snapshot = store.snapshot(&shopper).await;
            if !snapshot.is_empty() {
                seen = Some(snapshot);
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(seen.unwrap().quantity_of(&pid("X")), Some(3));
        assert!(store.unwatch(&shopper).await);
    }

    #[tokio::test]
    async fn test_shoppers_are_isolated() {
        let (store, _, alice) = setup();
        let bob = ShopperId::new("user_2");
        store.load(&alice).await.unwrap();
        store.load(&bob).await.unwrap();

        store
            .add_item(&alice, pid("A"), 1, ten(), named("Shirt"))
            .await
            .unwrap();
        assert!(store.snapshot(&bob).await.is_empty());
    }
}
