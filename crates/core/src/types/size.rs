//! Garment sizes and custom measurements.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Size`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SizeError {
    /// The label is not one of the standard sizes.
    #[error("unknown size: {0}")]
    Unknown(String),
}

/// A standard garment size.
///
/// Serialized as the upper-case label shown in the storefront (`"XS"`, `"M"`,
/// `"XXXL"`). Parsing is case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Size {
    #[serde(rename = "XS")]
    ExtraSmall,
    #[serde(rename = "S")]
    Small,
    #[serde(rename = "M")]
    Medium,
    #[serde(rename = "L")]
    Large,
    #[serde(rename = "XL")]
    ExtraLarge,
    #[serde(rename = "XXL")]
    DoubleExtraLarge,
    #[serde(rename = "XXXL")]
    TripleExtraLarge,
}

impl Size {
    /// Every size the admin console offers, smallest first.
    pub const ALL: [Self; 7] = [
        Self::ExtraSmall,
        Self::Small,
        Self::Medium,
        Self::Large,
        Self::ExtraLarge,
        Self::DoubleExtraLarge,
        Self::TripleExtraLarge,
    ];

    /// The display label for this size.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ExtraSmall => "XS",
            Self::Small => "S",
            Self::Medium => "M",
            Self::Large => "L",
            Self::ExtraLarge => "XL",
            Self::DoubleExtraLarge => "XXL",
            Self::TripleExtraLarge => "XXXL",
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Size {
    type Err = SizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|size| size.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| SizeError::Unknown(trimmed.to_owned()))
    }
}

/// Free-form measurements for made-to-measure garments.
///
/// Only valid on products that allow custom sizing. Measurements are in
/// centimetres as entered by the shopper; none are required.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CustomSize {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chest: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waist: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CustomSize {
    /// Returns `true` if no measurement or note was provided.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chest.is_none()
            && self.waist.is_none()
            && self.height.is_none()
            && self.notes.as_deref().is_none_or(|n| n.trim().is_empty())
    }

    /// Returns `true` if every provided measurement is a positive, finite number.
    #[must_use]
    pub fn has_valid_measurements(&self) -> bool {
        [self.chest, self.waist, self.height]
            .into_iter()
            .flatten()
            .all(|m| m.is_finite() && m > 0.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("m".parse::<Size>().unwrap(), Size::Medium);
        assert_eq!(" xxl ".parse::<Size>().unwrap(), Size::DoubleExtraLarge);
        assert_eq!("XXXL".parse::<Size>().unwrap(), Size::TripleExtraLarge);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            "XXXXL".parse::<Size>(),
            Err(SizeError::Unknown("XXXXL".to_string()))
        );
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&Size::ExtraSmall).unwrap();
        assert_eq!(json, "\"XS\"");
        let size: Size = serde_json::from_str("\"XL\"").unwrap();
        assert_eq!(size, Size::ExtraLarge);
    }

    #[test]
    fn test_custom_size_empty() {
        assert!(CustomSize::default().is_empty());
        let notes_only = CustomSize {
            notes: Some("  ".to_string()),
            ..CustomSize::default()
        };
        assert!(notes_only.is_empty());

        let chest = CustomSize {
            chest: Some(86.0),
            ..CustomSize::default()
        };
        assert!(!chest.is_empty());
    }

    #[test]
    fn test_custom_size_measurements() {
        let ok = CustomSize {
            chest: Some(86.0),
            waist: Some(70.5),
            height: None,
            notes: None,
        };
        assert!(ok.has_valid_measurements());

        let bad = CustomSize {
            waist: Some(-2.0),
            ..CustomSize::default()
        };
        assert!(!bad.has_valid_measurements());
    }
}
