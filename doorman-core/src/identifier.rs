//! Role & application identifiers

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ulid::Ulid;
use utoipa::ToSchema;

/// Canonical identifier of a role.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "01H9ZQ2V9QJ0YV3QF2C2B4K2QS")]
pub struct RoleId(Ulid);

/// Canonical identifier of an application.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "01H9ZQ35V1T8GJTW8Z1BMDGB5R")]
pub struct AppId(Ulid);

macro_rules! id_impls {
    ($name:ident) => {
        impl $name {
            /// Mint a fresh identifier.
            pub fn new() -> Self {
                Self(Ulid::new())
            }

            /// The underlying ULID.
            pub fn as_ulid(&self) -> &Ulid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Ulid> for $name {
            fn from(value: Ulid) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = ulid::DecodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Ulid::from_string(s)?))
            }
        }
    };
}

id_impls!(RoleId);
id_impls!(AppId);

/// A caller-supplied reference to a role or application: either a
/// well-formed canonical ID or a human-readable name, disambiguated by
/// attempting the ID parse first.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum IdentifierRef {
    /// A canonical identifier, ready to use as-is.
    Id(Ulid),
    /// A name to look up in the role/app registry.
    Name(String),
}

impl IdentifierRef {
    /// Classify a raw reference string.
    ///
    /// Empty (or whitespace-only) references are invalid rather than
    /// being treated as a name that will never resolve.
    pub fn parse(raw: &str) -> Result<Self, InvalidReference> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(InvalidReference);
        }
        match Ulid::from_string(raw) {
            Ok(id) => Ok(IdentifierRef::Id(id)),
            Err(_) => Ok(IdentifierRef::Name(raw.to_string())),
        }
    }
}

/// An empty role/app reference.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[error("empty role/app reference")]
pub struct InvalidReference;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_ids_parse_as_ids() {
        let id = Ulid::new();
        assert_eq!(
            IdentifierRef::parse(&id.to_string()),
            Ok(IdentifierRef::Id(id))
        );
    }

    #[test]
    fn everything_else_is_a_name() {
        assert_eq!(
            IdentifierRef::parse("billing"),
            Ok(IdentifierRef::Name("billing".to_string()))
        );
        // Too short to be a ULID, still a perfectly fine name
        assert_eq!(
            IdentifierRef::parse("x"),
            Ok(IdentifierRef::Name("x".to_string()))
        );
    }

    #[test]
    fn empty_references_are_invalid() {
        assert_eq!(IdentifierRef::parse(""), Err(InvalidReference));
        assert_eq!(IdentifierRef::parse("   "), Err(InvalidReference));
    }
}
