//! Domain errors for the grant flows.
//!
//! Every public flow returns exactly one of these kinds; the boundary
//! layer maps them to HTTP statuses and, where API clients depend on
//! them, stable message codes.

use crate::store::StoreError;
use doorman_core::identifier::{AppId, RoleId};
use http::StatusCode;

/// Stable message codes shared with existing API clients.
pub mod message_code {
    /// Enrollment success (created or updated).
    pub const CREATED: &str = "CREATED";
    /// Name failed validation.
    pub const INVALID_NAME: &str = "INVALID_NAME";
    /// Email failed validation.
    pub const INVALID_EMAIL_DOMAIN: &str = "INVALID_EMAIL_DOMAIN";
    /// Password failed the length check.
    pub const INVALID_PASSWORD: &str = "INVALID_PASSWORD";
    /// Duplicate (role, app) assignment.
    pub const USER_ALREADY_REGISTERED: &str = "USER_ALREADY_REGISTERED";
    /// No user for the given email or ID.
    pub const USER_NOT_FOUND: &str = "USER_NOT_FOUND";
    /// User has no active grant.
    pub const USER_NOT_ACTIVE: &str = "USER_NOT_ACTIVE";
    /// Old password did not verify.
    pub const INVALID_OLD_PASSWORD: &str = "INVALID_OLD_PASSWORD";
    /// New and confirmation passwords differ.
    pub const PASSWORDS_DO_NOT_MATCH: &str = "PASSWORDS_DO_NOT_MATCH";
    /// A required field was missing or empty.
    pub const MISSING_REQUIRED_FIELDS: &str = "MISSING_REQUIRED_FIELDS";
    /// Submitted verification code matched no grant.
    pub const INVALID_VERIFICATION_CODE: &str = "INVALID_VERIFICATION_CODE";
    /// Submitted verification code was past its expiry.
    pub const VERIFICATION_EXPIRED: &str = "VERIFICATION_EXPIRED";
    /// Verification succeeded.
    pub const VERIFICATION_SUCCESSFUL: &str = "VERIFICATION_SUCCESSFUL";
    /// Password change succeeded.
    pub const PASSWORD_UPDATED_SUCCESSFULLY: &str = "PASSWORD_UPDATED_SUCCESSFULLY";
    /// Password reset was initiated.
    pub const PASSWORD_RESET_INITIATED: &str = "PASSWORD_RESET_INITIATED";
    /// The reset state could not be persisted.
    pub const UPDATE_USER_FAILED: &str = "UPDATE_USER_FAILED";
    /// Catch-all for infrastructure failures.
    pub const UNEXPECTED_ERROR: &str = "UNEXPECTED_ERROR";
}

/// A terminal domain error from one of the grant flows.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// Name absent or shorter than two characters after trimming.
    #[error("The name does not meet the established standards")]
    InvalidName,
    /// Email absent or syntactically invalid.
    #[error("The provided email is not valid")]
    InvalidEmail,
    /// Password absent or shorter than eight characters.
    #[error("The password does not meet the established standards")]
    InvalidPassword,
    /// Password failed the policy check; carries the policy message.
    #[error("{0}")]
    PasswordPolicy(&'static str),
    /// Only one of `role_name` / `app_name` was supplied.
    #[error("Both 'role_name' and 'app_name' are required")]
    IncompletePair,
    /// A batch item was missing its role or app reference.
    #[error("Each app item must include 'role' and 'app'")]
    SpecItemIncomplete,
    /// Role reference was empty or resolved to nothing.
    #[error("Invalid role: {0}")]
    InvalidRole(String),
    /// Application reference was empty or resolved to nothing.
    #[error("Application not found: {0}")]
    AppNotFound(String),
    /// The request produced zero buildable grants.
    #[error("At least one role/app assignment is required.")]
    MissingAssignment,
    /// A (role, app) pair is already granted (or requested twice).
    #[error("User already assigned to role '{role}' and app '{app}'.")]
    AlreadyAssigned {
        /// The duplicated role.
        role: RoleId,
        /// The duplicated application.
        app: AppId,
    },
    /// No user for the given email or ID.
    #[error("User not found")]
    UserNotFound,
    /// Submitted verification code matched no grant.
    #[error("Invalid verification code")]
    InvalidCode,
    /// Submitted verification code was past its expiry.
    #[error("Verification code expired")]
    CodeExpired,
    /// A grant patch arrived without an application reference.
    #[error("Field 'app_id' is required to update app fields (status, role, is_session_active).")]
    AppRefRequired,
    /// A grant patch carried a status outside the known enum.
    #[error("Invalid status: must be one of Pending, Active, Inactive")]
    InvalidStatus,
    /// A grant patch carried no fields at all.
    #[error("No changes provided")]
    NoChanges,
    /// The (user, app) pair addressed by a patch does not exist.
    #[error("User or app assignment not found")]
    AssignmentNotFound,
    /// The reset flow needs an email address.
    #[error("User email is required")]
    EmailRequired,
    /// The password change flow got an empty field.
    #[error("All fields are required: user_email, old_password, new_password, confirm_password")]
    MissingFields,
    /// Password change requires at least one active grant.
    #[error("User is not active")]
    UserNotActive,
    /// The supplied old password did not verify.
    #[error("Old password is incorrect")]
    InvalidOldPassword,
    /// New and confirmation passwords differ.
    #[error("New password and confirm password do not match")]
    PasswordsDoNotMatch,
    /// The store reported no user updated during reset initiation.
    #[error("Failed to update user information")]
    UpdateFailed,
    /// Persistence failure during a primary write or read.
    #[error("An unexpected error occurred.")]
    Store(#[from] StoreError),
    /// Anything else that should never surface as a domain kind.
    #[error("An unexpected error occurred.")]
    Unexpected(#[source] anyhow::Error),
}

impl FlowError {
    /// The HTTP status this error maps to at the boundary.
    pub fn status(&self) -> StatusCode {
        match self {
            FlowError::InvalidName
            | FlowError::InvalidEmail
            | FlowError::InvalidPassword
            | FlowError::InvalidRole(_)
            | FlowError::SpecItemIncomplete
            | FlowError::InvalidStatus => StatusCode::UNPROCESSABLE_ENTITY,
            FlowError::PasswordPolicy(_)
            | FlowError::IncompletePair
            | FlowError::MissingAssignment
            | FlowError::AppRefRequired
            | FlowError::NoChanges
            | FlowError::EmailRequired
            | FlowError::MissingFields
            | FlowError::PasswordsDoNotMatch => StatusCode::BAD_REQUEST,
            FlowError::AppNotFound(_)
            | FlowError::UserNotFound
            | FlowError::AssignmentNotFound => StatusCode::NOT_FOUND,
            FlowError::AlreadyAssigned { .. } => StatusCode::CONFLICT,
            FlowError::InvalidCode
            | FlowError::CodeExpired
            | FlowError::InvalidOldPassword => StatusCode::UNAUTHORIZED,
            FlowError::UserNotActive => StatusCode::FORBIDDEN,
            FlowError::UpdateFailed | FlowError::Store(_) | FlowError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The stable message code, for kinds existing clients match on.
    pub fn message_code(&self) -> Option<&'static str> {
        match self {
            FlowError::InvalidName => Some(message_code::INVALID_NAME),
            FlowError::InvalidEmail => Some(message_code::INVALID_EMAIL_DOMAIN),
            FlowError::InvalidPassword => Some(message_code::INVALID_PASSWORD),
            FlowError::AlreadyAssigned { .. } => Some(message_code::USER_ALREADY_REGISTERED),
            FlowError::UserNotFound => Some(message_code::USER_NOT_FOUND),
            FlowError::InvalidCode => Some(message_code::INVALID_VERIFICATION_CODE),
            FlowError::CodeExpired => Some(message_code::VERIFICATION_EXPIRED),
            FlowError::EmailRequired | FlowError::MissingFields => {
                Some(message_code::MISSING_REQUIRED_FIELDS)
            }
            FlowError::UserNotActive => Some(message_code::USER_NOT_ACTIVE),
            FlowError::InvalidOldPassword => Some(message_code::INVALID_OLD_PASSWORD),
            FlowError::PasswordsDoNotMatch => Some(message_code::PASSWORDS_DO_NOT_MATCH),
            FlowError::UpdateFailed => Some(message_code::UPDATE_USER_FAILED),
            FlowError::Store(_) | FlowError::Unexpected(_) => {
                Some(message_code::UNEXPECTED_ERROR)
            }
            _ => None,
        }
    }
}
