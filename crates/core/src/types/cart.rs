//! Shopping cart and its text codec.
//!
//! The row store keeps a user's cart as a single TEXT column holding the
//! product IDs joined by [`SEPARATOR`]:
//!
//! ```text
//! []        <->  ""
//! [1, 2, 3] <->  "1,2,3"
//! ```
//!
//! Decoding is lenient. Tokens that are not base-10 integers are logged and
//! dropped rather than failing the whole read, so one bad entry never makes a
//! user unreadable.

use serde::{Deserialize, Serialize};

/// Separator between IDs in the encoded form.
pub const SEPARATOR: char = ',';

/// Encode an ordered sequence of IDs as separator-joined decimal text.
///
/// ```
/// use shop_core::cart::encode;
///
/// assert_eq!(encode(&[]), "");
/// assert_eq!(encode(&[4, 8, 15]), "4,8,15");
/// ```
#[must_use]
pub fn encode(ids: &[i64]) -> String {
    ids.iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(&SEPARATOR.to_string())
}

/// Decode separator-joined text into an ordered sequence of IDs.
///
/// Empty input yields an empty sequence. Whitespace around a token is ignored.
/// Malformed tokens are skipped with a warning.
///
/// ```
/// use shop_core::cart::decode;
///
/// assert_eq!(decode(""), Vec::<i64>::new());
/// assert_eq!(decode("1,x,3"), vec![1, 3]);
/// ```
#[must_use]
pub fn decode(text: &str) -> Vec<i64> {
    if text.is_empty() {
        return Vec::new();
    }

    text.split(SEPARATOR)
        .filter_map(|token| match token.trim().parse::<i64>() {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(token, error = %e, "Skipping malformed cart entry");
                None
            }
        })
        .collect()
}

/// A user's cart: an ordered list of product IDs.
///
/// Entries are not checked against existing products and may repeat.
/// Serializes as a JSON array of numbers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart(Vec<i64>);

impl Cart {
    /// Create a cart from product IDs.
    #[must_use]
    pub const fn new(ids: Vec<i64>) -> Self {
        Self(ids)
    }

    /// Parse a cart from its stored text form.
    #[must_use]
    pub fn decode(text: &str) -> Self {
        Self(decode(text))
    }

    /// Render the cart in its stored text form.
    #[must_use]
    pub fn encode(&self) -> String {
        encode(&self.0)
    }

    /// The product IDs in order.
    #[must_use]
    pub fn ids(&self) -> &[i64] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<i64>> for Cart {
    fn from(ids: Vec<i64>) -> Self {
        Self(ids)
    }
}

// SQLx support (with sqlite feature): stored as TEXT via the codec.
#[cfg(feature = "sqlite")]
impl sqlx::Type<sqlx::Sqlite> for Cart {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <String as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

#[cfg(feature = "sqlite")]
impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for Cart {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let text = <&str as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(Self::decode(text))
    }
}

#[cfg(feature = "sqlite")]
impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for Cart {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Sqlite as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<'q, sqlx::Sqlite>>::encode(self.encode(), buf)
    }
}
