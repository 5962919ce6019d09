//! Identifier resolution: ID-or-name references to canonical IDs.

use crate::{grants::error::FlowError, store::Registry};
use doorman_core::identifier::{AppId, IdentifierRef, RoleId};

/// Resolve a role reference. A well-formed canonical ID passes straight
/// through without a registry round-trip; anything else is a name
/// lookup. Empty and unknown references both fail as an invalid role.
pub async fn resolve_role<R: Registry>(registry: &R, reference: &str) -> Result<RoleId, FlowError> {
    match IdentifierRef::parse(reference) {
        Err(_) => Err(FlowError::InvalidRole(reference.to_string())),
        Ok(IdentifierRef::Id(id)) => Ok(RoleId::from(id)),
        Ok(IdentifierRef::Name(name)) => match registry.find_role_by_name(&name).await? {
            Some(role) => Ok(role.id),
            None => Err(FlowError::InvalidRole(name)),
        },
    }
}

/// Resolve an application reference, same contract as [`resolve_role`]
/// but failing as application-not-found.
pub async fn resolve_app<R: Registry>(registry: &R, reference: &str) -> Result<AppId, FlowError> {
    match IdentifierRef::parse(reference) {
        Err(_) => Err(FlowError::AppNotFound(reference.to_string())),
        Ok(IdentifierRef::Id(id)) => Ok(AppId::from(id)),
        Ok(IdentifierRef::Name(name)) => match registry.find_app_by_name(&name).await? {
            Some(app) => Ok(app.id),
            None => Err(FlowError::AppNotFound(name)),
        },
    }
}
