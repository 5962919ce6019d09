//! Grant lifecycle status

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

/// Lifecycle status of a single access grant.
///
/// The only forward transition offered by the verification flow is
/// `Pending -> Active`. Revocation moves any status to `Inactive`.
/// Explicit grant patches may set any of the three variants, but nothing
/// outside them: the mutation layer rejects unknown status strings.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub enum GrantStatus {
    /// Created by enrollment, waiting for code verification.
    #[default]
    Pending,
    /// Verified (or explicitly activated).
    Active,
    /// Revoked or explicitly deactivated. Grants are never removed.
    Inactive,
}

impl GrantStatus {
    /// Canonical storage spelling of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantStatus::Pending => "Pending",
            GrantStatus::Active => "Active",
            GrantStatus::Inactive => "Inactive",
        }
    }
}

impl std::fmt::Display for GrantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrantStatus {
    type Err = UnknownStatus;

    /// Case-insensitive parse. Stored data from older deployments spells
    /// revoked grants `"inactive"`, so casing is not significant.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(GrantStatus::Pending),
            "active" => Ok(GrantStatus::Active),
            "inactive" => Ok(GrantStatus::Inactive),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// Error returned when parsing a status string that is none of
/// `Pending`, `Active`, `Inactive`.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown grant status: {0}")]
pub struct UnknownStatus(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_any_casing() {
        assert_eq!("Pending".parse::<GrantStatus>(), Ok(GrantStatus::Pending));
        assert_eq!("active".parse::<GrantStatus>(), Ok(GrantStatus::Active));
        assert_eq!("inactive".parse::<GrantStatus>(), Ok(GrantStatus::Inactive));
        assert_eq!("INACTIVE".parse::<GrantStatus>(), Ok(GrantStatus::Inactive));
    }

    #[test]
    fn rejects_unknown_variants() {
        assert!("Suspended".parse::<GrantStatus>().is_err());
        assert!("".parse::<GrantStatus>().is_err());
    }

    #[test]
    fn serializes_capitalized() {
        assert_eq!(
            serde_json::to_string(&GrantStatus::Inactive).unwrap(),
            "\"Inactive\""
        );
    }
}
