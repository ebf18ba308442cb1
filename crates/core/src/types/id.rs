//! Newtype IDs for type-safe entity references.
//!
//! Document ids issued by the remote store are opaque strings. Use the
//! `define_id!` macro to create wrappers that prevent accidentally mixing ids
//! from different entity types.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Into<String>` implementations
///
/// # Example
///
/// ```rust
/// # use uniform_shop_core::define_id;
/// define_id!(BlazerId);
/// define_id!(TieId);
///
/// let blazer = BlazerId::new("j57a");
/// let tie = TieId::new("j57a");
///
/// // These are different types, so this won't compile:
/// // let _: BlazerId = tie;
/// assert_eq!(blazer.as_str(), tie.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(ProductId);
define_id!(SchoolId);
define_id!(CategoryId);
define_id!(ShopperId);

impl ShopperId {
    /// Generate an identity for a shopper without an account.
    ///
    /// Guest carts are keyed by this id until the remote store links them to
    /// a signed-in identity.
    #[must_use]
    pub fn guest() -> Self {
        Self(format!("guest_{}", uuid::Uuid::new_v4().simple()))
    }

    /// Whether this identity was produced by [`ShopperId::guest`].
    #[must_use]
    pub fn is_guest(&self) -> bool {
        self.0.starts_with("guest_")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_as_str() {
        let id = ProductId::new("k97abc");
        assert_eq!(id.as_str(), "k97abc");
        assert_eq!(id.to_string(), "k97abc");
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = SchoolId::new("school_1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"school_1\"");

        let parsed: SchoolId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_guest_ids_are_unique() {
        let a = ShopperId::guest();
        let b = ShopperId::guest();
        assert_ne!(a, b);
        assert!(a.is_guest());
        assert!(!ShopperId::new("user_42").is_guest());
    }
}
