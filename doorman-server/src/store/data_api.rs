//! HTTP document-store client.
//!
//! Talks to a MongoDB-compatible data API (`findOne`/`find`/`insertOne`/
//! `updateOne` actions) configured in `settings.toml`. The update shapes
//! use the positional operators `apps.$` (single matched element) and
//! `apps.$[]` (all elements), so targeted grant updates never rewrite
//! the rest of the array.

use crate::{
    models::{
        registry::{AppRecord, RoleRecord},
        user::{Grant, GrantChanges, NewUser, User, UserId},
    },
    settings,
    store::{Registry, StoreError, StoreResult, UserStore},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use doorman_core::identifier::AppId;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

const USERS: &str = "users";
const ROLES: &str = "roles";
const APPS: &str = "apps";

/// A client for the document-store data API, serving both as the user
/// gateway and the role/app registry.
#[derive(Clone, Debug)]
pub struct DataApiClient {
    client: ClientWithMiddleware,
    endpoint: String,
    data_source: String,
    database: String,
    api_key: String,
}

#[derive(Debug, serde::Deserialize)]
struct FindOneResponse<T> {
    document: Option<T>,
}

#[derive(Debug, serde::Deserialize)]
struct FindResponse<T> {
    documents: Vec<T>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateResponse {
    matched_count: u64,
    #[allow(dead_code)]
    modified_count: u64,
}

impl DataApiClient {
    /// Build a client from settings, with transient-failure retries on
    /// the underlying HTTP client.
    pub fn new(settings: &settings::Database) -> Self {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);
        let client = ClientBuilder::new(reqwest::Client::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Self {
            client,
            endpoint: settings.endpoint_url.trim_end_matches('/').to_string(),
            data_source: settings.data_source.clone(),
            database: settings.database.clone(),
            api_key: settings.api_key.clone(),
        }
    }

    fn body(&self, collection: &str, extra: Value) -> Value {
        let mut body = json!({
            "dataSource": self.data_source,
            "database": self.database,
            "collection": collection,
        });
        if let (Value::Object(body), Value::Object(extra)) = (&mut body, extra) {
            body.extend(extra);
        }
        body
    }

    async fn action<R: DeserializeOwned>(&self, action: &str, body: Value) -> StoreResult<R> {
        let url = format!("{}/action/{}", self.endpoint, action);
        tracing::debug!(action, "calling document store data API");

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(StoreError::Backend(format!(
                "data API {action} returned {status}: {text}"
            )));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn find_one<T: DeserializeOwned>(
        &self,
        collection: &str,
        filter: Value,
    ) -> StoreResult<Option<T>> {
        let response: FindOneResponse<T> = self
            .action("findOne", self.body(collection, json!({ "filter": filter })))
            .await?;
        Ok(response.document)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Value,
        update: Value,
    ) -> StoreResult<u64> {
        let response: UpdateResponse = self
            .action(
                "updateOne",
                self.body(collection, json!({ "filter": filter, "update": update })),
            )
            .await?;
        Ok(response.matched_count)
    }
}

#[async_trait]
impl UserStore for DataApiClient {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.find_one(USERS, json!({ "email": email })).await
    }

    async fn find_by_id(&self, id: &UserId) -> StoreResult<Option<User>> {
        self.find_one(USERS, json!({ "_id": id.to_string() })).await
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<UserId> {
        // The data API exposes no unique-index errors, so probe first.
        if self.find_by_email(&user.email).await?.is_some() {
            return Err(StoreError::AlreadyExists(user.email));
        }

        let id = UserId::new();
        let document = User {
            id,
            name: user.name,
            email: user.email,
            password: user.password,
            apps: user.apps,
            reset_code: None,
            reset_expiration: None,
            temp_password: None,
        };

        let _: Value = self
            .action(
                "insertOne",
                self.body(USERS, json!({ "document": document })),
            )
            .await?;
        Ok(id)
    }

    async fn replace_grants(&self, email: &str, grants: &[Grant]) -> StoreResult<()> {
        let matched = self
            .update_one(
                USERS,
                json!({ "email": email }),
                json!({ "$set": { "apps": grants } }),
            )
            .await?;
        if matched == 0 {
            return Err(StoreError::Backend(format!("no user with email {email}")));
        }
        Ok(())
    }

    async fn patch_grant(
        &self,
        user_id: &UserId,
        app: &AppId,
        changes: &GrantChanges,
    ) -> StoreResult<u64> {
        let mut set = serde_json::Map::new();
        if let Some(status) = changes.status {
            set.insert("apps.$.status".to_string(), json!(status));
        }
        if let Some(role) = changes.role {
            set.insert("apps.$.role".to_string(), json!(role));
        }
        if let Some(active) = changes.is_session_active {
            set.insert("apps.$.is_session_active".to_string(), json!(active));
        }

        self.update_one(
            USERS,
            json!({ "_id": user_id.to_string(), "apps.app": app }),
            json!({ "$set": Value::Object(set) }),
        )
        .await
    }

    async fn revoke_all(&self, user_id: &UserId) -> StoreResult<u64> {
        self.update_one(
            USERS,
            json!({ "_id": user_id.to_string() }),
            json!({ "$set": {
                "apps.$[].status": "Inactive",
                "apps.$[].is_session_active": false,
            }}),
        )
        .await
    }

    async fn list(&self, app: Option<&AppId>) -> StoreResult<Vec<User>> {
        let filter = match app {
            Some(app) => json!({ "apps": { "$elemMatch": { "app": app } } }),
            None => json!({}),
        };
        let response: FindResponse<User> = self
            .action("find", self.body(USERS, json!({ "filter": filter })))
            .await?;
        Ok(response.documents)
    }

    async fn set_reset_info(
        &self,
        email: &str,
        code: &str,
        expiration: DateTime<Utc>,
        temp_password_hash: &str,
    ) -> StoreResult<bool> {
        let matched = self
            .update_one(
                USERS,
                json!({ "email": email }),
                json!({ "$set": {
                    "reset_code": code,
                    "reset_expiration": expiration,
                    "temp_password": temp_password_hash,
                }}),
            )
            .await?;
        Ok(matched > 0)
    }

    async fn update_password(&self, email: &str, password_hash: &str) -> StoreResult<()> {
        let matched = self
            .update_one(
                USERS,
                json!({ "email": email }),
                json!({ "$set": { "password": password_hash } }),
            )
            .await?;
        if matched == 0 {
            return Err(StoreError::Backend(format!("no user with email {email}")));
        }
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        let _: Option<Value> = self.find_one(USERS, json!({ "_id": "" })).await?;
        Ok(())
    }
}

#[async_trait]
impl Registry for DataApiClient {
    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<RoleRecord>> {
        self.find_one(ROLES, json!({ "name": name })).await
    }

    async fn find_app_by_name(&self, name: &str) -> StoreResult<Option<AppRecord>> {
        self.find_one(APPS, json!({ "name": name })).await
    }
}
