//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create string-backed ID wrappers that prevent
//! accidentally mixing a product ID with a message or sender ID.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Macro to define a type-safe, string-backed ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `Display`, `From<&str>` and `From<String>` implementations
///
/// Deserialization is left to the caller so each ID can decide which wire
/// shapes it accepts.
///
/// # Example
///
/// ```rust
/// # use cinecart_core::define_id;
/// define_id!(OrderId);
/// define_id!(CouponId);
///
/// let order_id = OrderId::new("42");
/// let coupon_id = CouponId::new("42");
///
/// // These are different types, so this won't compile:
/// // let _: OrderId = coupon_id;
/// # let _ = (order_id, coupon_id);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, ::serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from anything string-like.
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

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

define_id!(ProductId);
define_id!(MessageId);
define_id!(SenderId);
define_id!(OrderId);

/// Identifier of the assistant in the AI chat.
const ASSISTANT_SENDER: &str = "ai";

/// Identifier the AI chat uses for the person typing.
const LOCAL_USER_SENDER: &str = "user";

const UNKNOWN_SENDER: &str = "unknown";

impl MessageId {
    /// Generate a fresh, globally unique message ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl SenderId {
    /// The synthetic, non-user identity used for assistant replies and
    /// locally fabricated error messages.
    #[must_use]
    pub fn assistant() -> Self {
        Self(ASSISTANT_SENDER.to_owned())
    }

    /// The fixed identity of the person typing in the AI chat.
    #[must_use]
    pub fn local_user() -> Self {
        Self(LOCAL_USER_SENDER.to_owned())
    }

    /// Stand-in for payloads that name no sender.
    #[must_use]
    pub fn unknown() -> Self {
        Self(UNKNOWN_SENDER.to_owned())
    }

    /// A random per-session identity for the live chat (`user-<16 hex>`).
    #[must_use]
    pub fn random_user() -> Self {
        let suffix: u64 = rand::random();
        Self(format!("user-{suffix:016x}"))
    }
}

/// Wire representation of an ID that may arrive as a string or a number.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Integer(i64),
    Unsigned(u64),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Unsigned(n) => write!(f, "{n}"),
        }
    }
}

/// Deserialize a string-or-number ID into its canonical string form.
///
/// `"1"` and `1` produce the same ID.
pub(crate) fn deserialize_flexible<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(|raw| raw.to_string())
}

/// Same as [`deserialize_flexible`], for optional fields.
pub(crate) fn deserialize_flexible_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawId>::deserialize(deserializer).map(|raw| raw.map(|r| r.to_string()))
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_flexible(deserializer).map(Self)
    }
}

impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_flexible(deserializer).map(Self)
    }
}

impl<'de> Deserialize<'de> for OrderId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_flexible(deserializer).map(Self)
    }
}

impl<'de> Deserialize<'de> for SenderId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_from_string_or_number() {
        let from_str: ProductId = serde_json::from_str("\"1\"").unwrap();
        let from_num: ProductId = serde_json::from_str("1").unwrap();
        assert_eq!(from_str, from_num);
        assert_eq!(from_num.as_str(), "1");
    }

    #[test]
    fn test_product_id_serializes_as_string() {
        let id = ProductId::new("42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"42\"");
    }

    #[test]
    fn test_generated_message_ids_are_unique() {
        assert_ne!(MessageId::generate(), MessageId::generate());
    }

    #[test]
    fn test_random_user_shape() {
        let id = SenderId::random_user();
        let suffix = id.as_str().strip_prefix("user-").unwrap();
        assert_eq!(suffix.len(), 16);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, SenderId::random_user());
    }

    #[test]
    fn test_well_known_senders() {
        assert_eq!(SenderId::assistant().as_str(), "ai");
        assert_eq!(SenderId::local_user().as_str(), "user");
        assert_ne!(SenderId::assistant(), SenderId::local_user());
    }

    #[test]
    fn test_display() {
        let id = OrderId::from("ord-7");
        assert_eq!(format!("{id}"), "ord-7");
    }
}
