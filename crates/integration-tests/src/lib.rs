//! Integration tests for the uniform shop.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p uniform-shop-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_scenarios` - Cart store behavior against the in-memory backend
//! - `add_to_cart` - Adding catalog products with size and stock checks
//! - `change_feed` - Reloads driven by remote pushes
//!
//! Every test builds its own [`TestContext`]; nothing is shared between tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use uniform_shop_core::catalog::{Product, ProductDraft};
use uniform_shop_core::{Gender, LineItemAttributes, Price, ProductId, SchoolId, ShopperId, Size};
use uniform_shop_storefront::cart::{
    CartSnapshot, CartStore, InMemoryCartBackend, Notification, NotificationSink, NotifyError,
};
use uniform_shop_storefront::catalog::InMemoryCatalog;
use uniform_shop_storefront::config::StorefrontConfig;

/// Sink that keeps every notification, optionally failing each delivery.
#[derive(Default)]
pub struct RecordingNotifier {
    received: Mutex<Vec<Notification>>,
    fail: bool,
}

impl RecordingNotifier {
    /// A sink whose every delivery fails after recording.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            received: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Notifications received so far.
    pub async fn received(&self) -> Vec<Notification> {
        self.received.lock().await.clone()
    }

    /// Wait until at least `count` notifications have arrived.
    pub async fn wait_for(&self, count: usize) -> Vec<Notification> {
        for _ in 0..200 {
            let received = self.received().await;
            if received.len() >= count {
                return received;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.received().await
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        self.received.lock().await.push(notification);
        if self.fail {
            return Err(NotifyError("sink offline".to_string()));
        }
        Ok(())
    }
}

/// A cart store wired to in-memory collaborators.
pub struct TestContext {
    pub store: CartStore,
    pub backend: InMemoryCartBackend,
    pub catalog: InMemoryCatalog,
    pub notifier: Arc<RecordingNotifier>,
    pub shopper: ShopperId,
}

impl TestContext {
    /// Default configuration, a recording notifier and a fresh guest shopper.
    #[must_use]
    pub fn new() -> Self {
        Self::with_notifier(RecordingNotifier::default())
    }

    /// Same as [`TestContext::new`] with a custom notifier.
    #[must_use]
    pub fn with_notifier(notifier: RecordingNotifier) -> Self {
        let backend = InMemoryCartBackend::new();
        let notifier = Arc::new(notifier);
        let store = CartStore::with_notifier(
            Arc::new(backend.clone()),
            &StorefrontConfig::default(),
            Arc::clone(&notifier) as Arc<dyn NotificationSink>,
        );

        Self {
            store,
            backend,
            catalog: InMemoryCatalog::new(),
            notifier,
            shopper: ShopperId::guest(),
        }
    }

    /// Load the shopper's cart, panicking on failure.
    pub async fn loaded() -> Self {
        let ctx = Self::new();
        ctx.store
            .load(&ctx.shopper)
            .await
            .unwrap_or_else(|e| panic!("initial load failed: {e}"));
        ctx
    }

    /// Add `quantity` of `id` at `price` with a display name.
    pub async fn add(
        &self,
        id: &str,
        quantity: i64,
        price: Decimal,
    ) -> Result<CartSnapshot, uniform_shop_storefront::error::CartError> {
        self.store
            .add_item(
                &self.shopper,
                ProductId::new(id),
                quantity,
                price,
                LineItemAttributes {
                    name: Some(format!("Product {id}")),
                    ..LineItemAttributes::default()
                },
            )
            .await
    }

    /// Poll until `check` holds for the shopper's snapshot.
    pub async fn eventually<F>(&self, check: F) -> Option<CartSnapshot>
    where
        F: Fn(&CartSnapshot) -> bool,
    {
        for _ in 0..200 {
            let snapshot = self.store.snapshot(&self.shopper).await;
            if check(&snapshot) {
                return Some(snapshot);
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        None
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// `units` and `cents` as a decimal amount.
#[must_use]
pub fn money(units: i64, cents: i64) -> Decimal {
    Decimal::new(units * 100 + cents, 2)
}

/// A school shirt offered in S, M and L with ten units in stock.
#[must_use]
pub fn shirt(id: &str) -> Product {
    Product::new(
        ProductId::new(id),
        ProductDraft {
            name: "School Shirt".to_string(),
            description: Some("Cotton, half sleeve".to_string()),
            price: Price::from_minor_units(45_000),
            original_price: None,
            category: Some("shirts".to_string()),
            school_id: SchoolId::new("green-valley"),
            image_urls: vec!["https://cdn.example.com/shirt.webp".to_string()],
            sizes: vec![Size::Small, Size::Medium, Size::Large],
            gender: Gender::Unisex,
            class_level: Some("5-8".to_string()),
            stock: 10,
            in_stock: true,
            allow_custom_size: false,
            is_featured: false,
            is_new: true,
            is_sale: false,
        },
    )
}
