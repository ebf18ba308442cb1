//! Status enums for catalog entities.

use serde::{Deserialize, Serialize};

/// Who a uniform item is cut for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Boy,
    Girl,
    #[default]
    Unisex,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boy => write!(f, "boy"),
            Self::Girl => write!(f, "girl"),
            Self::Unisex => write!(f, "unisex"),
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "boy" => Ok(Self::Boy),
            "girl" => Ok(Self::Girl),
            "unisex" => Ok(Self::Unisex),
            _ => Err(format!("invalid gender: {s}")),
        }
    }
}

/// Availability of a product as shown to shoppers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// Listed and purchasable.
    InStock,
    /// Listed but flagged out of stock by an admin.
    OutOfStock,
    /// In stock but with fewer units than the low-stock threshold.
    LowStock,
}
