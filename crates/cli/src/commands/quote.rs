//! Quote a stored cart document.
//!
//! # Usage
//!
//! ```bash
//! shop-cli quote cart.json
//! shop-cli quote cart.json --json
//! ```
//!
//! The input is the remote cart document shape:
//! `{ "items": [ { "productId": "A", "quantity": 2, "price": "10.00" } ] }`.
//! Records with a missing price or quantity count as zero, and repeated
//! product ids are folded into one line at the first record's price.

use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;
use uniform_shop_core::{CartDocument, CartLines, CartTotals, format_amount};
use uniform_shop_storefront::config::StorefrontConfig;

use super::{CommandError, read_json};

/// A priced cart document.
#[derive(Debug, Serialize)]
pub struct Quote {
    pub lines: CartLines,
    pub totals: CartTotals,
    /// Records that were priced as zero or skipped.
    pub skipped: usize,
}

/// Price `document` with the configured flat shipping rate.
#[must_use]
pub fn quote(document: &CartDocument, config: &StorefrontConfig) -> Quote {
    let lines = CartLines::from_document(document, &config.placeholders());
    let totals = config.pricing().totals(&lines);
    let skipped = document
        .items
        .iter()
        .filter(|r| r.normalize(&config.placeholders()).is_none())
        .count();

    Quote {
        lines,
        totals,
        skipped,
    }
}

/// Render a quote as a plain-text receipt.
#[must_use]
pub fn render(quote: &Quote, symbol: &str) -> String {
    let mut out = String::new();
    for line in &quote.lines {
        let size = line.size.map(|s| format!(" ({s})")).unwrap_or_default();
        let _ = writeln!(
            out,
            "{:>3} x {}{} @ {} = {}",
            line.quantity,
            line.name,
            size,
            line.price.display(symbol),
            format_amount(line.line_total(), symbol)
        );
    }
    if quote.skipped > 0 {
        let _ = writeln!(out, "({} unpriced line(s) skipped)", quote.skipped);
    }
    let _ = writeln!(out, "Subtotal: {}", format_amount(quote.totals.subtotal, symbol));
    let _ = writeln!(out, "Shipping: {}", format_amount(quote.totals.shipping, symbol));
    let _ = writeln!(out, "Total:    {}", format_amount(quote.totals.total, symbol));
    out
}

/// Run the `quote` command.
pub fn run(path: &Path, json: bool) -> Result<(), CommandError> {
    let config = StorefrontConfig::from_env()?;
    let document: CartDocument = read_json(path)?;
    let quote = quote(&document, &config);

    tracing::info!(
        lines = quote.lines.len(),
        total = %quote.totals.total,
        "Cart quoted"
    );

    let output = if json {
        serde_json::to_string_pretty(&quote)?
    } else {
        render(&quote, &config.currency_symbol)
    };
    #[allow(clippy::print_stdout)]
    {
        println!("{output}");
    }
    Ok(())
}
