//! Request and response data types that are common and useful between clients of and the doorman server

use crate::{
    identifier::{AppId, RoleId},
    status::GrantStatus,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Enrollment request struct
///
/// Two shapes of role/app assignment are accepted and may be combined:
/// a single `role_name`/`app_name` pair (both or neither), and an `apps`
/// array whose items reference roles and applications by canonical ID or
/// by name.
#[derive(Deserialize, Serialize, Clone, Debug, ToSchema)]
pub struct EnrollmentRequest {
    /// Display name of the user signing up
    #[serde(default)]
    pub name: String,
    /// The email address of the user signing up
    #[serde(default)]
    pub email: String,
    /// Plaintext password; only ever stored hashed
    #[serde(default)]
    pub password: String,
    /// Role name for the single-assignment shape
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
    /// Application name for the single-assignment shape
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    /// Batch-assignment shape: one entry per role/app pair
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub apps: Vec<GrantSpec>,
}

/// One requested role/app assignment, each side given as a canonical ID
/// or a registry name.
#[derive(Deserialize, Serialize, Clone, Debug, ToSchema)]
pub struct GrantSpec {
    /// Role reference (ID or name)
    pub role: String,
    /// Application reference (ID or name)
    pub app: String,
}

/// Verification request struct
#[derive(Deserialize, Serialize, Clone, Debug, ToSchema)]
pub struct VerificationRequest {
    /// The email address the code was sent to
    #[serde(default)]
    pub user_email: String,
    /// The submitted one-time code
    #[serde(default)]
    pub verification_code: String,
}

/// Targeted update of a single grant, addressed by application.
#[derive(Deserialize, Serialize, Clone, Debug, Default, ToSchema)]
pub struct GrantPatchRequest {
    /// Application reference (ID or name) selecting the grant to update
    #[serde(default)]
    pub app_id: String,
    /// New status, one of `Pending`, `Active`, `Inactive`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// New role reference (ID or name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// New session flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_session_active: Option<bool>,
}

/// Password reset initiation request struct
#[derive(Deserialize, Serialize, Clone, Debug, ToSchema)]
pub struct PasswordResetRequest {
    /// The email address of the account to reset
    #[serde(default)]
    pub email: String,
}

/// Password change request struct
#[derive(Deserialize, Serialize, Clone, Debug, ToSchema)]
pub struct PasswordChangeRequest {
    /// The email address of the account
    #[serde(default)]
    pub user_email: String,
    /// The current password
    #[serde(default)]
    pub old_password: String,
    /// The replacement password
    #[serde(default)]
    pub new_password: String,
    /// Repeated replacement password
    #[serde(default)]
    pub confirm_password: String,
}

/// Response carrying a human-readable message and its stable code
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct MessageResponse {
    /// Human-readable outcome description
    pub msg: String,
    /// Stable machine-readable message code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl MessageResponse {
    /// A message without a stable code.
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            code: None,
        }
    }

    /// A message carrying a stable code.
    pub fn with_code(msg: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            code: Some(code.into()),
        }
    }
}

/// Outward-facing view of one grant. Verification codes and tokens are
/// deliberately absent.
#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct GrantView {
    /// Canonical role ID
    pub role: RoleId,
    /// Canonical application ID
    pub app: AppId,
    /// Lifecycle status
    pub status: GrantStatus,
    /// Whether the grant currently has an active session
    pub is_session_active: bool,
}

/// Outward-facing view of a user. Credentials, codes and reset state are
/// deliberately absent.
#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct UserProfile {
    /// User ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// The user's grants, in insertion order
    pub apps: Vec<GrantView>,
}

/// Response wrapping a list of user profiles
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct UsersResponse {
    /// The matching users
    pub users: Vec<UserProfile>,
}
