//! Admin catalog form checks.
//!
//! # Usage
//!
//! ```bash
//! shop-cli check-product product-form.json
//! shop-cli check-school school-form.json
//! ```
//!
//! Prints the validated draft as JSON, or the first reason the form would be
//! rejected by the admin console.

use std::path::Path;

use uniform_shop_core::catalog::{ProductForm, SchoolForm};

use super::{CommandError, read_json};

/// Validate a product form file and return the draft as pretty JSON.
pub fn check_product(path: &Path) -> Result<String, CommandError> {
    let form: ProductForm = read_json(path)?;
    let draft = form.validate()?;
    tracing::info!(name = %draft.name, sizes = draft.sizes.len(), "Product form valid");
    Ok(serde_json::to_string_pretty(&draft)?)
}

/// Validate a school form file and return the draft as pretty JSON.
pub fn check_school(path: &Path) -> Result<String, CommandError> {
    let form: SchoolForm = read_json(path)?;
    let draft = form.validate()?;
    tracing::info!(name = %draft.name, slug = %draft.slug, "School form valid");
    Ok(serde_json::to_string_pretty(&draft)?)
}
