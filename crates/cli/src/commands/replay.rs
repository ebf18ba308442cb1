//! Replay a scripted cart session against an in-memory backend.
//!
//! # Usage
//!
//! ```bash
//! shop-cli replay session.json
//! ```
//!
//! The script is a JSON array of steps:
//!
//! ```json
//! [
//!   { "op": "add", "productId": "A", "quantity": 2, "price": "10.00", "name": "Shirt" },
//!   { "op": "update", "productId": "A", "quantity": 3 },
//!   { "op": "remove", "productId": "A" },
//!   { "op": "clear" }
//! ]
//! ```
//!
//! Each step prints the resulting cart. A failed step prints the shopper
//! message and the replay continues, as the cart page would.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use uniform_shop_core::{LineItemAttributes, ProductId, ShopperId};
use uniform_shop_storefront::cart::{CartStore, CartView, InMemoryCartBackend, TracingNotifier};
use uniform_shop_storefront::config::StorefrontConfig;
use uniform_shop_storefront::error::{CartError, CartOperation};

use super::{CommandError, read_json};

/// One scripted cart action.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    #[serde(rename_all = "camelCase")]
    Add {
        product_id: ProductId,
        quantity: i64,
        price: Decimal,
        #[serde(flatten)]
        attributes: LineItemAttributes,
    },
    #[serde(rename_all = "camelCase")]
    Update { product_id: ProductId, quantity: i64 },
    #[serde(rename_all = "camelCase")]
    Remove { product_id: ProductId },
    Clear,
}

impl Step {
    const fn operation(&self) -> CartOperation {
        match self {
            Self::Add { .. } => CartOperation::Add,
            Self::Update { .. } => CartOperation::UpdateQuantity,
            Self::Remove { .. } => CartOperation::Remove,
            Self::Clear => CartOperation::Clear,
        }
    }
}

/// Run `steps` for a fresh guest shopper and return the transcript.
///
/// # Errors
///
/// Returns an error only if the initial cart load fails; step failures are
/// written to the transcript.
pub async fn replay(steps: Vec<Step>, config: &StorefrontConfig) -> Result<String, CartError> {
    let backend = Arc::new(InMemoryCartBackend::new());
    let store = CartStore::with_notifier(backend, config, Arc::new(TracingNotifier));
    let shopper = ShopperId::guest();
    store.load(&shopper).await?;

    let mut out = String::new();
    for (index, step) in steps.into_iter().enumerate() {
        let operation = step.operation();
        let result = match step {
            Step::Add {
                product_id,
                quantity,
                price,
                attributes,
            } => {
                store
                    .add_item(&shopper, product_id, quantity, price, attributes)
                    .await
            }
            Step::Update {
                product_id,
                quantity,
            } => store.update_quantity(&shopper, &product_id, quantity).await,
            Step::Remove { product_id } => store.remove_item(&shopper, &product_id).await,
            Step::Clear => store.clear_cart(&shopper).await,
        };

        let _ = write!(out, "#{} {operation}: ", index + 1);
        match result {
            Ok(snapshot) => {
                let view = CartView::from_snapshot(&snapshot, &config.currency_symbol);
                let _ = writeln!(
                    out,
                    "{} item(s), subtotal {}, shipping {}, total {}",
                    view.item_count, view.subtotal, view.shipping, view.total
                );
                for item in &view.items {
                    let _ = writeln!(
                        out,
                        "    {} x {} @ {} = {}",
                        item.quantity, item.name, item.price, item.line_price
                    );
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Replay step failed");
                let _ = writeln!(out, "{}", e.user_message(operation));
            }
        }
    }
    Ok(out)
}

/// Run the `replay` command.
pub async fn run(path: &Path) -> Result<(), CommandError> {
    let config = StorefrontConfig::from_env()?;
    let steps: Vec<Step> = read_json(path)?;
    let transcript = replay(steps, &config).await?;
    #[allow(clippy::print_stdout)]
    {
        print!("{transcript}");
    }
    Ok(())
}
