//! Remote cart contract.
//!
//! The hosted database owns cart identity and persistence. Each write is
//! atomic from the caller's point of view; reads return the stored document
//! as-is and normalization happens on the way into the local mirror.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;
use uniform_shop_core::{CartDocument, LineItem, ProductId, ShopperId};

/// Errors reported by the remote cart store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// Network or service failure.
    #[error("cart service unavailable: {0}")]
    Unavailable(String),

    /// The shopper identity was not accepted.
    #[error("shopper is not authenticated")]
    Unauthenticated,

    /// The product has no line in the remote cart.
    #[error("product {0} is not in the cart")]
    NotFound(ProductId),

    /// The request was understood but refused.
    #[error("request rejected: {0}")]
    Rejected(String),
}

/// Pushed by the remote store whenever a shopper's cart document changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartChange {
    pub shopper: ShopperId,
}

/// Remote cart persistence.
///
/// `add_item` merges into an existing line for the same product by adding
/// quantities; the stored snapshot fields of that line are kept.
#[async_trait]
pub trait CartBackend: Send + Sync {
    /// Current cart document, or `None` if the shopper has never added anything.
    async fn fetch_cart(&self, shopper: &ShopperId) -> Result<Option<CartDocument>, BackendError>;

    /// Add `item`, creating the cart if needed.
    async fn add_item(&self, shopper: &ShopperId, item: &LineItem) -> Result<(), BackendError>;

    /// Set the quantity of an existing line.
    async fn update_item(
        &self,
        shopper: &ShopperId,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), BackendError>;

    /// Delete the line for `product_id`.
    async fn remove_item(
        &self,
        shopper: &ShopperId,
        product_id: &ProductId,
    ) -> Result<(), BackendError>;

    /// Remove every line.
    async fn clear_cart(&self, shopper: &ShopperId) -> Result<(), BackendError>;

    /// Change feed for `shopper`'s cart document.
    async fn subscribe(&self, shopper: &ShopperId) -> broadcast::Receiver<CartChange>;
}
