//! Command implementations.

pub mod catalog;
pub mod quote;
pub mod replay;

use std::path::Path;

use serde::de::DeserializeOwned;
use thiserror::Error;
use uniform_shop_core::catalog::CatalogFormError;
use uniform_shop_storefront::config::ConfigError;
use uniform_shop_storefront::error::CartError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Input file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// Input file is not valid JSON for the expected shape.
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    /// Output could not be serialized.
    #[error("Failed to render output: {0}")]
    Render(#[from] serde_json::Error),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Catalog form rejected.
    #[error("Form rejected: {0}")]
    Form(#[from] CatalogFormError),

    /// Cart operation failed.
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Read and parse a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CommandError> {
    let display = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| CommandError::Read {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CommandError::Json {
        path: display,
        source,
    })
}
