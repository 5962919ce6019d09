//! In-memory store and registry, used by the test setup.

use crate::{
    models::{
        registry::{AppRecord, RoleRecord},
        user::{Grant, GrantChanges, NewUser, User, UserId},
    },
    store::{Registry, StoreError, StoreResult, UserStore},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use doorman_core::identifier::{AppId, RoleId};
use std::sync::Arc;

/// An implementation of [`UserStore`] backed by process memory.
#[derive(Clone, Debug, Default)]
pub struct InMemoryUserStore {
    users: Arc<DashMap<UserId, User>>,
}

impl InMemoryUserStore {
    fn id_for_email(&self, email: &str) -> Option<UserId> {
        self.users
            .iter()
            .find(|entry| entry.value().email == email)
            .map(|entry| *entry.key())
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .id_for_email(email)
            .and_then(|id| self.users.get(&id).map(|entry| entry.value().clone())))
    }

    async fn find_by_id(&self, id: &UserId) -> StoreResult<Option<User>> {
        Ok(self.users.get(id).map(|entry| entry.value().clone()))
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<UserId> {
        if self.id_for_email(&user.email).is_some() {
            return Err(StoreError::AlreadyExists(user.email));
        }

        let id = UserId::new();
        self.users.insert(
            id,
            User {
                id,
                name: user.name,
                email: user.email,
                password: user.password,
                apps: user.apps,
                reset_code: None,
                reset_expiration: None,
                temp_password: None,
            },
        );
        Ok(id)
    }

    async fn replace_grants(&self, email: &str, grants: &[Grant]) -> StoreResult<()> {
        let Some(id) = self.id_for_email(email) else {
            return Err(StoreError::Backend(format!("no user with email {email}")));
        };
        if let Some(mut entry) = self.users.get_mut(&id) {
            entry.apps = grants.to_vec();
        }
        Ok(())
    }

    async fn patch_grant(
        &self,
        user_id: &UserId,
        app: &AppId,
        changes: &GrantChanges,
    ) -> StoreResult<u64> {
        let Some(mut entry) = self.users.get_mut(user_id) else {
            return Ok(0);
        };
        match entry.apps.iter_mut().find(|grant| grant.app == *app) {
            Some(grant) => {
                changes.apply(grant);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn revoke_all(&self, user_id: &UserId) -> StoreResult<u64> {
        match self.users.get_mut(user_id) {
            Some(mut entry) => {
                entry.revoke_all_grants();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn list(&self, app: Option<&AppId>) -> StoreResult<Vec<User>> {
        Ok(self
            .users
            .iter()
            .filter(|entry| match app {
                Some(app) => entry.value().apps.iter().any(|grant| grant.app == *app),
                None => true,
            })
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn set_reset_info(
        &self,
        email: &str,
        code: &str,
        expiration: DateTime<Utc>,
        temp_password_hash: &str,
    ) -> StoreResult<bool> {
        let Some(id) = self.id_for_email(email) else {
            return Ok(false);
        };
        if let Some(mut entry) = self.users.get_mut(&id) {
            entry.reset_code = Some(code.to_string());
            entry.reset_expiration = Some(expiration);
            entry.temp_password = Some(temp_password_hash.to_string());
        }
        Ok(true)
    }

    async fn update_password(&self, email: &str, password_hash: &str) -> StoreResult<()> {
        let Some(id) = self.id_for_email(email) else {
            return Err(StoreError::Backend(format!("no user with email {email}")));
        };
        if let Some(mut entry) = self.users.get_mut(&id) {
            entry.password = password_hash.to_string();
        }
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// An implementation of [`Registry`] backed by process memory, seedable
/// from tests.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRegistry {
    roles: Arc<DashMap<String, RoleId>>,
    apps: Arc<DashMap<String, AppId>>,
}

impl InMemoryRegistry {
    /// Register a role under a name, returning its minted ID.
    pub fn add_role(&self, name: &str) -> RoleId {
        let id = RoleId::new();
        self.roles.insert(name.to_string(), id);
        id
    }

    /// Register an application under a name, returning its minted ID.
    pub fn add_app(&self, name: &str) -> AppId {
        let id = AppId::new();
        self.apps.insert(name.to_string(), id);
        id
    }
}

#[async_trait]
impl Registry for InMemoryRegistry {
    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<RoleRecord>> {
        Ok(self.roles.get(name).map(|entry| RoleRecord {
            id: *entry.value(),
            name: name.to_string(),
        }))
    }

    async fn find_app_by_name(&self, name: &str) -> StoreResult<Option<AppRecord>> {
        Ok(self.apps.get(name).map(|entry| AppRecord {
            id: *entry.value(),
            name: name.to_string(),
        }))
    }
}
