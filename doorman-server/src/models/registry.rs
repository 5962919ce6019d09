//! Role & application registry records

use doorman_core::identifier::{AppId, RoleId};
use serde::{Deserialize, Serialize};

/// A role as stored in the role registry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoleRecord {
    /// Canonical role ID
    #[serde(rename = "_id")]
    pub id: RoleId,
    /// Human-readable role name, unique within the registry
    pub name: String,
}

/// An application as stored in the application registry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppRecord {
    /// Canonical application ID
    #[serde(rename = "_id")]
    pub id: AppId,
    /// Human-readable application name, unique within the registry
    pub name: String,
}
