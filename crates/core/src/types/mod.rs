//! Core types for the uniform shop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod size;
pub mod status;

pub use id::*;
pub use price::{Price, PriceError, format_amount};
pub use size::{CustomSize, Size, SizeError};
pub use status::*;
