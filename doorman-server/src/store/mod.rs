//! Persistence gateway for user documents and the role/app registries.
//!
//! Backends implement these traits so the grant flows never see a
//! concrete database. Two update shapes are deliberately exposed, and
//! flows are expected to prefer the first wherever the target can be
//! expressed as a predicate:
//!
//! - [`UserStore::patch_grant`] / [`UserStore::revoke_all`]: conditional,
//!   element-targeted updates that touch only the matching grant(s) and
//!   are safe against concurrent writes to the user's *other* grants;
//! - [`UserStore::replace_grants`]: whole-array replacement, used where
//!   the matching key (the one-time code) is the very value being
//!   cleared and therefore cannot serve as a stable update predicate.
//!   A later `replace_grants` can clobber a concurrent grant change on
//!   the same user; this trade-off is accepted.

use crate::models::{
    registry::{AppRecord, RoleRecord},
    user::{GrantChanges, Grant, NewUser, User, UserId},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use doorman_core::identifier::AppId;

pub mod data_api;
pub mod memory;

/// Uniform error type for all store backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated on insert.
    #[error("already exists: {0}")]
    AlreadyExists(String),
    /// The backend failed or returned something unintelligible.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Gateway to the user collection.
#[async_trait]
pub trait UserStore: Clone + Send + Sync + std::fmt::Debug + 'static {
    /// Fetch a user by email.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Fetch a user by ID.
    async fn find_by_id(&self, id: &UserId) -> StoreResult<Option<User>>;

    /// Insert a new user, minting and returning its ID. Fails with
    /// [`StoreError::AlreadyExists`] when the email is taken.
    async fn insert_user(&self, user: NewUser) -> StoreResult<UserId>;

    /// Replace a user's entire grant array (whole-document strategy).
    async fn replace_grants(&self, email: &str, grants: &[Grant]) -> StoreResult<()>;

    /// Conditionally update the single grant matching `app` for the
    /// given user. Returns the matched count: `0` means no such
    /// (user, app) pair exists.
    async fn patch_grant(
        &self,
        user_id: &UserId,
        app: &AppId,
        changes: &GrantChanges,
    ) -> StoreResult<u64>;

    /// Conditionally set every grant of the user `Inactive` with no
    /// active session. Returns the matched count: `0` means the update
    /// predicate found nothing, in which case callers fall back to an
    /// explicit read-modify-write so revocation still succeeds.
    async fn revoke_all(&self, user_id: &UserId) -> StoreResult<u64>;

    /// List users, optionally restricted to those holding a grant for
    /// the given application.
    async fn list(&self, app: Option<&AppId>) -> StoreResult<Vec<User>>;

    /// Record password-reset state on the user. Returns whether a user
    /// was actually updated.
    async fn set_reset_info(
        &self,
        email: &str,
        code: &str,
        expiration: DateTime<Utc>,
        temp_password_hash: &str,
    ) -> StoreResult<bool>;

    /// Replace the user's credential hash.
    async fn update_password(&self, email: &str, password_hash: &str) -> StoreResult<()>;

    /// Cheap connectivity probe for healthchecks.
    async fn ping(&self) -> StoreResult<()>;
}

/// Read-only lookup into the role and application registries.
#[async_trait]
pub trait Registry: Clone + Send + Sync + std::fmt::Debug + 'static {
    /// Find a role by its human-readable name.
    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<RoleRecord>>;

    /// Find an application by its human-readable name.
    async fn find_app_by_name(&self, name: &str) -> StoreResult<Option<AppRecord>>;
}
