//! Unified cart error type.
//!
//! Every `CartStore` operation returns `Result<T, CartError>`. Internal
//! details stay in `Display` for logs; [`CartError::user_message`] gives the
//! text a shopper sees.

use std::fmt;

use thiserror::Error;
use uniform_shop_core::catalog::SelectionError;
use uniform_shop_core::{LineItemError, ProductId};

use crate::cart::BackendError;
use crate::catalog::CatalogError;

/// Error returned by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Quantity or price rejected before any remote call.
    #[error("Validation error: {0}")]
    Validation(#[from] LineItemError),

    /// The product cannot be added with the chosen options.
    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    /// Product lookup failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// The remote cart store rejected or failed the operation.
    #[error("Persistence error: {0}")]
    Persistence(#[from] BackendError),

    /// An update referenced a product that is not in the cart.
    #[error("Item not found in cart: {0}")]
    ItemNotFound(ProductId),
}

/// Cart operation, used for logging and shopper-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartOperation {
    Add,
    UpdateQuantity,
    Remove,
    Clear,
}

impl CartOperation {
    /// Short verb phrase for messages ("add item", "clear cart").
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Add => "add item",
            Self::UpdateQuantity => "update quantity",
            Self::Remove => "remove item",
            Self::Clear => "clear cart",
        }
    }
}

impl fmt::Display for CartOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

impl CartError {
    /// Message safe to show a shopper after `operation` failed.
    ///
    /// Remote failures never expose their cause.
    #[must_use]
    pub fn user_message(&self, operation: CartOperation) -> String {
        match self {
            Self::Persistence(_) | Self::Catalog(CatalogError::Unavailable(_)) => {
                format!("Failed to {operation}. Please try again.")
            }
            Self::Validation(LineItemError::Price(_)) => "Invalid price.".to_string(),
            Self::Validation(LineItemError::QuantityTooLow(_)) => {
                "Quantity must be at least 1.".to_string()
            }
            Self::Validation(LineItemError::QuantityTooHigh(_)) => {
                "That quantity is too large.".to_string()
            }
            Self::Validation(LineItemError::TotalTooLarge) => {
                "Your cart total is too large.".to_string()
            }
            Self::Selection(err) => capitalize(&err.to_string()),
            Self::Catalog(CatalogError::NotFound(_)) => {
                "This product is no longer available.".to_string()
            }
            Self::ItemNotFound(_) => "That item is no longer in your cart.".to_string(),
        }
    }

    /// Whether retrying the same operation could succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Persistence(BackendError::Unavailable(_))
                | Self::Catalog(CatalogError::Unavailable(_))
        )
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect::<String>() + "."
    })
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_display() {
        let err = CartError::ItemNotFound(ProductId::new("B"));
        assert_eq!(err.to_string(), "Item not found in cart: B");

        let err = CartError::from(LineItemError::QuantityTooLow(0));
        assert_eq!(
            err.to_string(),
            "Validation error: quantity must be at least 1 (got 0)"
        );
    }

    #[test]
    fn test_user_message_hides_remote_details() {
        let err = CartError::from(BackendError::Unavailable("connection reset".to_string()));
        let message = err.user_message(CartOperation::Add);
        assert_eq!(message, "Failed to add item. Please try again.");
        assert!(!message.contains("connection reset"));

        assert_eq!(
            err.user_message(CartOperation::Clear),
            "Failed to clear cart. Please try again."
        );
    }

    #[test]
    fn test_user_message_for_selection() {
        let err = CartError::from(SelectionError::SizeRequired);
        assert_eq!(err.user_message(CartOperation::Add), "Please choose a size.");
    }

    #[test]
    fn test_user_message_for_validation() {
        let message = |e: LineItemError| CartError::from(e).user_message(CartOperation::Add);

        assert_eq!(
            message(LineItemError::QuantityTooLow(0)),
            "Quantity must be at least 1."
        );
        assert_eq!(
            message(LineItemError::QuantityTooHigh(i64::from(u32::MAX) + 1)),
            "That quantity is too large."
        );
        assert_eq!(
            message(LineItemError::TotalTooLarge),
            "Your cart total is too large."
        );
    }

    #[test]
    fn test_retryable() {
        assert!(CartError::from(BackendError::Unavailable("timeout".to_string())).is_retryable());
        assert!(!CartError::from(BackendError::Unauthenticated).is_retryable());
        assert!(!CartError::ItemNotFound(ProductId::new("x")).is_retryable());
    }
}
