//! Display data for the cart page.

use serde::Serialize;
use uniform_shop_core::{LineItem, format_amount};

use super::store::{CartSnapshot, CartStatus};

/// Cart item display data for templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItemView {
    pub product_id: String,
    pub name: String,
    pub image: String,
    pub quantity: u32,
    /// Size label, custom measurements summary, or both.
    pub size: Option<String>,
    pub price: String,
    pub line_price: String,
}

/// Cart display data for templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub shipping: String,
    pub total: String,
    pub item_count: u64,
    /// Shopper-facing error, when the cart could not be loaded.
    pub error: Option<String>,
    pub loading: bool,
}

impl CartView {
    /// Build the view from a snapshot, formatting prices with `symbol`.
    #[must_use]
    pub fn from_snapshot(snapshot: &CartSnapshot, symbol: &str) -> Self {
        let totals = &snapshot.totals;
        Self {
            items: snapshot
                .items
                .iter()
                .map(|item| CartItemView::from_line(item, symbol))
                .collect(),
            subtotal: format_amount(totals.subtotal, symbol),
            shipping: format_amount(totals.shipping, symbol),
            total: format_amount(totals.total, symbol),
            item_count: totals.item_count,
            error: match snapshot.status {
                CartStatus::Failed(_) => Some("Failed to load cart. Please try again.".to_string()),
                _ => None,
            },
            loading: snapshot.status == CartStatus::Loading,
        }
    }

    /// Whether the empty-cart message should be shown.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && !self.loading
    }
}

impl CartItemView {
    fn from_line(item: &LineItem, symbol: &str) -> Self {
        let custom = item.custom_size.as_ref().map(|c| {
            let parts: Vec<String> = [("Chest", c.chest), ("Waist", c.waist), ("Height", c.height)]
                .into_iter()
                .filter_map(|(label, value)| value.map(|v| format!("{label} {v}")))
                .collect();
            if parts.is_empty() {
                "Custom".to_string()
            } else {
                format!("Custom ({})", parts.join(", "))
            }
        });

        let size = match (item.size, custom) {
            (Some(size), Some(custom)) => Some(format!("{size} / {custom}")),
            (Some(size), None) => Some(size.to_string()),
            (None, custom) => custom,
        };

        Self {
            product_id: item.product_id.to_string(),
            name: item.name.clone(),
            image: item.image.clone(),
            quantity: item.quantity,
            size,
            price: item.price.display(symbol),
            line_price: format_amount(item.line_total(), symbol),
        }
    }
}
