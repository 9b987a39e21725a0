//! Newtype IDs for type-safe entity references.
//!
//! The external data service keys every row by a UUID string, so IDs are
//! thin wrappers over `String`. Use the `define_id!` macro to create
//! type-safe ID wrappers that prevent accidentally mixing IDs from
//! different entity types.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `short()` for compact display (order numbers, subscription IDs)
/// - `From<String>` and `From<&str>` implementations
///
/// # Example
///
/// ```rust
/// # use trizen_core::define_id;
/// define_id!(UserId);
/// define_id!(OrderId);
///
/// let user_id = UserId::new("7f6c1b2e-0000-0000-0000-000000000000");
/// let order_id = OrderId::new("7f6c1b2e-0000-0000-0000-000000000000");
///
/// // These are different types, so this won't compile:
/// // let _: UserId = order_id;
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

            /// Consume the ID and return its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// First eight characters of the ID, for compact display
            /// (e.g. "#a1b2c3d4" order numbers).
            #[must_use]
            pub fn short(&self) -> &str {
                self.0.get(..8).unwrap_or(&self.0)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
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

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(UserId);
define_id!(ProductId);
define_id!(CategoryId);
define_id!(BannerId);
define_id!(OrderId);
define_id!(OrderItemId);
define_id!(AddressId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_short_truncates_to_eight_chars() {
        let id = OrderId::new("a1b2c3d4-e5f6-7890-abcd-ef1234567890");
        assert_eq!(id.short(), "a1b2c3d4");
    }

    #[test]
    fn test_short_keeps_short_ids_whole() {
        let id = ProductId::new("p1");
        assert_eq!(id.short(), "p1");
    }

    #[test]
    fn test_serde_transparent() {
        let id = ProductId::new("p1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"p1\"");

        let parsed: ProductId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_display() {
        let id = UserId::new("u-42");
        assert_eq!(id.to_string(), "u-42");
    }
}
