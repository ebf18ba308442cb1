//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `SHOP_SHIPPING_FLAT_RATE` - Flat shipping charge per order (default: 4.99)
//! - `SHOP_CURRENCY_SYMBOL` - Symbol prefixed to displayed prices (default: ₹)
//! - `SHOP_CATALOG_CACHE_TTL_SECS` - Catalog cache time-to-live (default: 300)
//! - `SHOP_CATALOG_CACHE_CAPACITY` - Catalog cache entry limit (default: 1000)
//! - `SHOP_PLACEHOLDER_IMAGE` - Image shown for lines without one
//!   (default: /images/placeholder.webp)

use std::time::Duration;

use thiserror::Error;
use uniform_shop_core::{Placeholders, Price, PriceAggregator};

const DEFAULT_CURRENCY_SYMBOL: &str = "₹";
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_CACHE_CAPACITY: u64 = 1000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    /// Flat shipping charge added to every order
    pub shipping_flat_rate: Price,
    /// Currency symbol for display formatting
    pub currency_symbol: String,
    /// Image shown for cart lines that never captured one
    pub placeholder_image: String,
    /// Catalog cache settings
    pub catalog_cache: CatalogCacheConfig,
}

/// Catalog cache settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogCacheConfig {
    /// How long a cached product or school stays valid
    pub ttl: Duration,
    /// Maximum number of cached entries
    pub capacity: u64,
}

impl Default for CatalogCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            shipping_flat_rate: PriceAggregator::default().flat_rate(),
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            placeholder_image: Placeholders::DEFAULT_IMAGE.to_string(),
            catalog_cache: CatalogCacheConfig::default(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Lookup(lookup);

        let shipping_flat_rate = env
            .get_or_default("SHOP_SHIPPING_FLAT_RATE", "4.99")
            .parse::<Price>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SHOP_SHIPPING_FLAT_RATE".to_string(), e.to_string())
            })?;
        let currency_symbol = env.get_or_default("SHOP_CURRENCY_SYMBOL", DEFAULT_CURRENCY_SYMBOL);
        let placeholder_image =
            env.get_or_default("SHOP_PLACEHOLDER_IMAGE", Placeholders::DEFAULT_IMAGE);

        let ttl_secs = env.get_parsed("SHOP_CATALOG_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?;
        let capacity = env.get_parsed("SHOP_CATALOG_CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY)?;
        if capacity == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SHOP_CATALOG_CACHE_CAPACITY".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            shipping_flat_rate,
            currency_symbol,
            placeholder_image,
            catalog_cache: CatalogCacheConfig {
                ttl: Duration::from_secs(ttl_secs),
                capacity,
            },
        })
    }

    /// Price aggregator charging the configured flat rate.
    #[must_use]
    pub const fn pricing(&self) -> PriceAggregator {
        PriceAggregator::with_flat_rate(self.shipping_flat_rate)
    }

    /// Display fallbacks for cart lines.
    #[must_use]
    pub fn placeholders(&self) -> Placeholders {
        Placeholders {
            image: self.placeholder_image.clone(),
            ..Placeholders::default()
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Lookup<F>(F);

impl<F> Lookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get a variable with a default value. Blank values count as unset.
    fn get_or_default(&self, key: &str, default: &str) -> String {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    /// Get a variable parsed as `T`, falling back to `default` when unset.
    fn get_parsed<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match (self.0)(key).map(|v| v.trim().to_string()) {
            Some(value) if !value.is_empty() => value
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
            _ => Ok(default),
        }
    }
}
