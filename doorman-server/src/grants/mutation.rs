//! Targeted grant updates and bulk revocation.

use crate::{
    app_state::AppState,
    grants::{error::FlowError, resolver},
    models::user::{GrantChanges, User, UserId},
    setups::ServerSetup,
    store::UserStore,
};
use doorman_core::common::GrantPatchRequest;

/// Patch a single grant, addressed by its application reference.
///
/// Exactly one grant element is mutated, selected by `app == resolved
/// reference`: a positional, predicate-targeted update, never an array
/// index. Returns the updated user.
pub async fn patch_grant<S: ServerSetup>(
    state: &AppState<S>,
    user_id: &UserId,
    request: GrantPatchRequest,
) -> Result<User, FlowError> {
    let app_ref = request.app_id.trim();
    if app_ref.is_empty() {
        return Err(FlowError::AppRefRequired);
    }
    let app = resolver::resolve_app(&state.registry, app_ref).await?;

    let mut changes = GrantChanges {
        is_session_active: request.is_session_active,
        ..Default::default()
    };
    if let Some(raw) = request.status.as_deref() {
        changes.status = Some(raw.parse().map_err(|_| FlowError::InvalidStatus)?);
    }
    if let Some(role_ref) = request.role.as_deref().filter(|r| !r.trim().is_empty()) {
        changes.role = Some(resolver::resolve_role(&state.registry, role_ref).await?);
    }

    if changes.is_empty() {
        return Err(FlowError::NoChanges);
    }

    let matched = state.store.patch_grant(user_id, &app, &changes).await?;
    if matched == 0 {
        return Err(FlowError::AssignmentNotFound);
    }

    tracing::info!(user = %user_id, app = %app, "patched grant");
    state
        .store
        .find_by_id(user_id)
        .await?
        .ok_or(FlowError::UserNotFound)
}

/// Revoke every grant of the user: status `Inactive`, session flag off.
///
/// The conditional all-elements update is tried first; if it matches
/// nothing, an explicit read-modify-write guarantees idempotent success,
/// so revocation never fails merely because there was nothing to revoke.
/// The user record itself is kept. Returns the updated user.
pub async fn revoke_all<S: ServerSetup>(
    state: &AppState<S>,
    user_id: &UserId,
) -> Result<User, FlowError> {
    let matched = state.store.revoke_all(user_id).await?;

    if matched == 0 {
        let mut user = state
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(FlowError::UserNotFound)?;
        user.revoke_all_grants();
        state.store.replace_grants(&user.email, &user.apps).await?;
    }

    tracing::info!(user = %user_id, "revoked all grants");
    state
        .store
        .find_by_id(user_id)
        .await?
        .ok_or(FlowError::UserNotFound)
}
