//! External user identifier.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`ExternalId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ExternalIdError {
    /// The input is empty or only whitespace.
    #[error("user id cannot be empty")]
    Empty,
    /// The input is too long.
    #[error("user id must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains whitespace or control characters.
    #[error("user id cannot contain whitespace or control characters")]
    InvalidCharacter,
}

/// The identifier a member registers under (card number, phone-derived code, ...).
///
/// Assigned by the registrant, unique across users and immutable once
/// registered. Leading and trailing whitespace is trimmed before validation.
///
/// ## Constraints
///
/// - Length: 1-64 characters after trimming
/// - No interior whitespace or control characters
///
/// ## Examples
///
/// ```
/// use loyalty_core::ExternalId;
///
/// assert!(ExternalId::parse("MEM-0001").is_ok());
/// assert_eq!(ExternalId::parse("  A17  ").unwrap().as_str(), "A17");
///
/// assert!(ExternalId::parse("").is_err());
/// assert!(ExternalId::parse("two words").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct ExternalId(String);

impl ExternalId {
    /// Maximum length of an external identifier.
    pub const MAX_LENGTH: usize = 64;

    /// Parse an `ExternalId` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, longer than 64
    /// characters, or contains whitespace or control characters.
    pub fn parse(s: &str) -> Result<Self, ExternalIdError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ExternalIdError::Empty);
        }

        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(ExternalIdError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if trimmed
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(ExternalIdError::InvalidCharacter);
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `ExternalId` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ExternalId {
    type Err = ExternalIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ExternalId {
    type Error = ExternalIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ExternalId> for String {
    fn from(id: ExternalId) -> Self {
        id.0
    }
}

impl AsRef<str> for ExternalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for ExternalId {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ExternalId {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for ExternalId {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_ids() {
        assert!(ExternalId::parse("U1").is_ok());
        assert!(ExternalId::parse("0812345678").is_ok());
        assert!(ExternalId::parse("member_42-b").is_ok());
    }

    #[test]
    fn test_parse_trims() {
        let id = ExternalId::parse("\tABC \n").unwrap();
        assert_eq!(id.as_str(), "ABC");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(ExternalId::parse(""), Err(ExternalIdError::Empty));
        assert_eq!(ExternalId::parse("   "), Err(ExternalIdError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "x".repeat(ExternalId::MAX_LENGTH + 1);
        assert!(matches!(
            ExternalId::parse(&long),
            Err(ExternalIdError::TooLong { .. })
        ));
        assert!(ExternalId::parse(&"x".repeat(ExternalId::MAX_LENGTH)).is_ok());
    }

    #[test]
    fn test_parse_interior_whitespace() {
        assert_eq!(
            ExternalId::parse("a b"),
            Err(ExternalIdError::InvalidCharacter)
        );
    }

    #[test]
    fn test_deserialize_validates() {
        let parsed: ExternalId = serde_json::from_str("\" M-9 \"").unwrap();
        assert_eq!(parsed.as_str(), "M-9");

        assert!(serde_json::from_str::<ExternalId>("\"\"").is_err());
    }

    #[test]
    fn test_serialize_is_plain_string() {
        let id = ExternalId::parse("M-9").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"M-9\"");
    }
}
