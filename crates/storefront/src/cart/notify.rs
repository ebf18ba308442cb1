//! Cart notifications.
//!
//! The store reports every finished mutation to an optional sink. Delivery is
//! fire-and-forget: a sink error is logged and never reaches the caller.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uniform_shop_core::{ProductId, ShopperId};

use crate::error::CartOperation;

/// How a mutation ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Succeeded,
    Failed { reason: String },
}

/// A finished cart mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub shopper: ShopperId,
    pub operation: CartOperation,
    pub product_id: Option<ProductId>,
    pub outcome: Outcome,
    pub occurred_at: DateTime<Utc>,
}

impl Notification {
    /// Build a notification stamped with the current time.
    #[must_use]
    pub fn new(
        shopper: ShopperId,
        operation: CartOperation,
        product_id: Option<ProductId>,
        outcome: Outcome,
    ) -> Self {
        Self {
            shopper,
            operation,
            product_id,
            outcome,
            occurred_at: Utc::now(),
        }
    }

    /// Short text for a toast.
    #[must_use]
    pub fn headline(&self) -> String {
        match (&self.outcome, self.operation) {
            (Outcome::Failed { .. }, op) => format!("Failed to {op}"),
            (Outcome::Succeeded, CartOperation::Add) => "Added to cart".to_string(),
            (Outcome::Succeeded, CartOperation::UpdateQuantity) => "Cart updated".to_string(),
            (Outcome::Succeeded, CartOperation::Remove) => "Item removed".to_string(),
            (Outcome::Succeeded, CartOperation::Clear) => "Cart cleared".to_string(),
        }
    }
}

/// Error from a notification sink.
#[derive(Debug, Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Receives cart notifications.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// Sink that emits each notification as a structured `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl NotificationSink for TracingNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        match &notification.outcome {
            Outcome::Succeeded => info!(
                shopper = %notification.shopper,
                operation = %notification.operation,
                product_id = ?notification.product_id,
                "{}",
                notification.headline()
            ),
            Outcome::Failed { reason } => warn!(
                shopper = %notification.shopper,
                operation = %notification.operation,
                product_id = ?notification.product_id,
                reason = %reason,
                "{}",
                notification.headline()
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headlines() {
        let ok = Notification::new(
            ShopperId::new("u"),
            CartOperation::Add,
            Some(ProductId::new("A")),
            Outcome::Succeeded,
        );
        assert_eq!(ok.headline(), "Added to cart");

        let failed = Notification::new(
            ShopperId::new("u"),
            CartOperation::Clear,
            None,
            Outcome::Failed {
                reason: "timeout".to_string(),
            },
        );
        assert_eq!(failed.headline(), "Failed to clear cart");
    }

    #[tokio::test]
    async fn test_tracing_notifier_accepts_everything() {
        let n = Notification::new(
            ShopperId::new("u"),
            CartOperation::Remove,
            Some(ProductId::new("A")),
            Outcome::Succeeded,
        );
        assert!(TracingNotifier.notify(n).await.is_ok());
    }

    #[test]
    fn test_notification_wire_shape() {
        let n = Notification::new(
            ShopperId::new("u"),
            CartOperation::UpdateQuantity,
            None,
            Outcome::Failed {
                reason: "x".to_string(),
            },
        );
        let json = serde_json::to_value(&n).unwrap_or_default();
        assert_eq!(json["operation"], "update_quantity");
        assert_eq!(json["outcome"]["status"], "failed");
        assert!(json.get("occurredAt").is_some());
    }
}
