//! User model: the aggregate owning a user's access grants

use crate::grants::codes::{self, CodeGenerator};
use chrono::{DateTime, Utc};
use doorman_core::{
    common::{GrantView, UserProfile},
    identifier::{AppId, RoleId},
    status::GrantStatus,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ulid::Ulid;

/// Unique identifier for a user.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Ulid);

impl UserId {
    /// Mint a fresh identifier.
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UserId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

/// One access grant: a (role, application) pair with its own lifecycle
/// status and one-time verification code.
///
/// # Invariants
/// - `role` and `app` are always resolved canonical IDs.
/// - `code` is non-empty only while the grant is `Pending` and unverified;
///   successful verification clears `code` and `code_expiration`.
/// - No two grants of the same user share a (role, app) pair.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Grant {
    /// Canonical role ID
    pub role: RoleId,
    /// Canonical application ID
    pub app: AppId,
    /// One-time verification code; empty once consumed
    pub code: String,
    /// Reserved session token slot
    pub token: String,
    /// Lifecycle status
    pub status: GrantStatus,
    /// Code expiry, `YYYY/MM/DD HH:MM:SS` UTC; empty once consumed
    pub code_expiration: String,
    /// Whether the grant currently has an active session
    pub is_session_active: bool,
}

impl Grant {
    /// Build a fresh grant for a resolved (role, app) pair.
    ///
    /// The grant starts `Pending` with a code from the given generator,
    /// expiring five minutes after `now`.
    pub fn issue(role: RoleId, app: AppId, generator: CodeGenerator, now: DateTime<Utc>) -> Self {
        Self {
            role,
            app,
            code: generator.generate(),
            token: String::new(),
            status: GrantStatus::Pending,
            code_expiration: codes::expiry_timestamp(now),
            is_session_active: false,
        }
    }

    /// Whether this grant is for the given (role, app) pair. Status is
    /// irrelevant: a revoked grant for the pair still counts.
    pub fn matches_pair(&self, role: &RoleId, app: &AppId) -> bool {
        self.role == *role && self.app == *app
    }

    /// Whether the verification code has expired relative to `now`.
    ///
    /// An expiry that does not parse in the fixed format counts as
    /// no expiry at all: a malformed timestamp must not block
    /// verification.
    pub fn is_code_expired(&self, now: DateTime<Utc>) -> bool {
        match codes::parse_expiry(&self.code_expiration) {
            Some(expiry) => expiry < now.naive_utc(),
            None => false,
        }
    }

    /// Consume the verification code and activate the grant.
    pub fn activate(&mut self) {
        self.status = GrantStatus::Active;
        self.code.clear();
        self.code_expiration.clear();
    }

    /// Deactivate the grant and drop its session.
    pub fn revoke(&mut self) {
        self.status = GrantStatus::Inactive;
        self.is_session_active = false;
    }
}

/// A user record: identity plus the ordered sequence of grants.
///
/// Grants are appended in enrollment order and never reordered or
/// removed; revocation flips status instead of deleting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// User ID
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Email address, unique across users
    pub email: String,
    /// Argon2 hash of the password
    pub password: String,
    /// The user's grants, in insertion order
    #[serde(default)]
    pub apps: Vec<Grant>,
    /// Pending password-reset code, if a reset was initiated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_code: Option<String>,
    /// Expiry of the pending reset code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_expiration: Option<DateTime<Utc>>,
    /// Argon2 hash of the temporary credential issued by the reset flow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_password: Option<String>,
}

impl User {
    /// Whether any existing grant already covers the (role, app) pair,
    /// regardless of its status.
    pub fn has_grant_for(&self, role: &RoleId, app: &AppId) -> bool {
        self.apps.iter().any(|grant| grant.matches_pair(role, app))
    }

    /// Position of the first grant whose stored code equals `code`.
    ///
    /// Empty submissions never match: consumed grants keep an empty
    /// code, and those must not be re-verifiable.
    pub fn grant_position_by_code(&self, code: &str) -> Option<usize> {
        if code.is_empty() {
            return None;
        }
        self.apps.iter().position(|grant| grant.code == code)
    }

    /// Set every grant `Inactive` with no active session. A no-op on a
    /// user without grants.
    pub fn revoke_all_grants(&mut self) {
        for grant in &mut self.apps {
            grant.revoke();
        }
    }

    /// Whether the user holds at least one `Active` grant.
    pub fn has_active_grant(&self) -> bool {
        self.apps
            .iter()
            .any(|grant| grant.status == GrantStatus::Active)
    }

    /// Outward-facing projection: no credential hashes, no codes, no
    /// tokens, no reset state.
    pub fn to_profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.to_string(),
            name: self.name.clone(),
            email: self.email.clone(),
            apps: self
                .apps
                .iter()
                .map(|grant| GrantView {
                    role: grant.role,
                    app: grant.app,
                    status: grant.status,
                    is_session_active: grant.is_session_active,
                })
                .collect(),
        }
    }
}

/// Data required to create a user (the stored ID is minted by the store).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewUser {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Argon2 hash of the password
    pub password: String,
    /// Initial grants
    pub apps: Vec<Grant>,
}

/// Field updates for a single grant, applied by the store's
/// predicate-targeted update. `None` fields are left untouched.
#[derive(Clone, Debug, Default)]
pub struct GrantChanges {
    /// Overwrite the status
    pub status: Option<GrantStatus>,
    /// Overwrite the role
    pub role: Option<RoleId>,
    /// Overwrite the session flag
    pub is_session_active: Option<bool>,
}

impl GrantChanges {
    /// Whether this update changes anything at all.
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.role.is_none() && self.is_session_active.is_none()
    }

    /// Apply the changes to a grant in place.
    pub fn apply(&self, grant: &mut Grant) {
        if let Some(status) = self.status {
            grant.status = status;
        }
        if let Some(role) = self.role {
            grant.role = role;
        }
        if let Some(active) = self.is_session_active {
            grant.is_session_active = active;
        }
    }
}
