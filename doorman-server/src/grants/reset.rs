//! Password reset: temporary credential issuance and password change.

use crate::{
    app_state::AppState,
    crypto,
    grants::{
        codes::{CodeGenerator, CODE_TTL_MINUTES},
        error::FlowError,
    },
    setups::{ServerSetup, VerificationCodeSender},
    store::UserStore,
};
use chrono::{Duration, Utc};
use doorman_core::{common::PasswordChangeRequest, password};

/// Initiate a password reset for the given email.
///
/// Issues a fresh code and a temporary credential (the email local-part
/// concatenated with the code), stores the code, its expiry and the
/// *hashed* credential on the user, then delivers the plaintext
/// credential best-effort. These are user-level reset fields, distinct
/// from any per-grant verification state.
pub async fn initiate<S: ServerSetup>(state: &AppState<S>, email: &str) -> Result<(), FlowError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(FlowError::EmailRequired);
    }

    let user = state
        .store
        .find_by_email(email)
        .await?
        .ok_or(FlowError::UserNotFound)?;

    let code = CodeGenerator::Secure.generate();
    let expiration = Utc::now() + Duration::minutes(CODE_TTL_MINUTES);
    let local_part = email.split('@').next().unwrap_or_default();
    let temporary_password = format!("{local_part}{code}");
    let temporary_hash =
        crypto::hash_password(&temporary_password).map_err(FlowError::Unexpected)?;

    let updated = state
        .store
        .set_reset_info(&user.email, &code, expiration, &temporary_hash)
        .await?;
    if !updated {
        return Err(FlowError::UpdateFailed);
    }

    if let Err(error) = state
        .verification_code_sender
        .send_temporary_password(email, &temporary_password)
        .await
    {
        tracing::warn!(email, %error, "temporary credential delivery failed");
    }

    tracing::info!(user = %user.id, "password reset initiated");
    Ok(())
}

/// Change the password of an active user.
///
/// Requires at least one `Active` grant, the current password, a
/// policy-compliant replacement and a matching confirmation, in that
/// order of checks.
pub async fn confirm<S: ServerSetup>(
    state: &AppState<S>,
    request: PasswordChangeRequest,
) -> Result<(), FlowError> {
    if [
        &request.user_email,
        &request.old_password,
        &request.new_password,
        &request.confirm_password,
    ]
    .iter()
    .any(|field| field.trim().is_empty())
    {
        return Err(FlowError::MissingFields);
    }

    let user = state
        .store
        .find_by_email(&request.user_email)
        .await?
        .ok_or(FlowError::UserNotFound)?;

    if !user.has_active_grant() {
        return Err(FlowError::UserNotActive);
    }

    if !crypto::verify_password(&request.old_password, &user.password) {
        return Err(FlowError::InvalidOldPassword);
    }

    if let Some(message) = password::check(&request.new_password) {
        return Err(FlowError::PasswordPolicy(message));
    }

    if request.new_password != request.confirm_password {
        return Err(FlowError::PasswordsDoNotMatch);
    }

    let hash = crypto::hash_password(&request.new_password).map_err(FlowError::Unexpected)?;
    state.store.update_password(&user.email, &hash).await?;

    tracing::info!(user = %user.id, "password updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        app_state::AppStateBuilder,
        models::user::{Grant, NewUser},
        setups::test::{TestSetup, TestVerificationCodeSender},
        store::{
            memory::{InMemoryRegistry, InMemoryUserStore},
            UserStore,
        },
    };
    use assert_matches::assert_matches;
    use doorman_core::identifier::{AppId, RoleId};
    use testresult::TestResult;

    fn state() -> AppState<TestSetup> {
        AppStateBuilder::default()
            .with_user_store(InMemoryUserStore::default())
            .with_registry(InMemoryRegistry::default())
            .with_verification_code_sender(TestVerificationCodeSender::default())
            .finalize()
            .unwrap()
    }

    async fn seed_user(state: &AppState<TestSetup>, active: bool) -> TestResult {
        let mut grant = Grant::issue(
            RoleId::new(),
            AppId::new(),
            CodeGenerator::Secure,
            Utc::now(),
        );
        if active {
            grant.activate();
        }
        state
            .store
            .insert_user(NewUser {
                name: "Ada".to_string(),
                email: "ada@x.com".to_string(),
                password: crypto::hash_password("Old!Pass1")?,
                apps: vec![grant],
            })
            .await?;
        Ok(())
    }

    fn change_request() -> PasswordChangeRequest {
        PasswordChangeRequest {
            user_email: "ada@x.com".to_string(),
            old_password: "Old!Pass1".to_string(),
            new_password: "New!Pass2".to_string(),
            confirm_password: "New!Pass2".to_string(),
        }
    }

    #[test_log::test(tokio::test)]
    async fn initiate_stores_hashed_credential_and_delivers_plaintext() -> TestResult {
        let state = state();
        seed_user(&state, true).await?;

        initiate(&state, "ada@x.com").await?;

        let user = state.store.find_by_email("ada@x.com").await?.unwrap();
        let code = user.reset_code.clone().expect("reset code stored");
        assert!(user.reset_expiration.is_some());

        let sent = state.verification_code_sender.get_temporary_passwords();
        assert_eq!(sent.len(), 1);
        let (to, plaintext) = &sent[0];
        assert_eq!(to, "ada@x.com");
        // Temporary credential = local part ++ code.
        assert_eq!(plaintext, &format!("ada{code}"));
        // Only the hash is stored, and it verifies against the plaintext.
        let stored = user.temp_password.expect("temporary hash stored");
        assert_ne!(&stored, plaintext);
        assert!(crypto::verify_password(plaintext, &stored));

        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn initiate_requires_a_known_user() -> TestResult {
        let state = state();

        assert_matches!(
            initiate(&state, "ghost@x.com").await,
            Err(FlowError::UserNotFound)
        );
        assert_matches!(initiate(&state, "  ").await, Err(FlowError::EmailRequired));

        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn confirm_replaces_the_credential() -> TestResult {
        let state = state();
        seed_user(&state, true).await?;

        confirm(&state, change_request()).await?;

        let user = state.store.find_by_email("ada@x.com").await?.unwrap();
        assert!(crypto::verify_password("New!Pass2", &user.password));
        assert!(!crypto::verify_password("Old!Pass1", &user.password));

        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn confirm_precondition_failures() -> TestResult {
        let state = state();
        seed_user(&state, true).await?;

        let mut request = change_request();
        request.confirm_password = String::new();
        assert_matches!(
            confirm(&state, request).await,
            Err(FlowError::MissingFields)
        );

        let mut request = change_request();
        request.old_password = "Wrong!Pass1".to_string();
        assert_matches!(
            confirm(&state, request).await,
            Err(FlowError::InvalidOldPassword)
        );

        let mut request = change_request();
        request.new_password = "weakpass1!".to_string();
        request.confirm_password = "weakpass1!".to_string();
        assert_matches!(
            confirm(&state, request).await,
            Err(FlowError::PasswordPolicy(_))
        );

        let mut request = change_request();
        request.confirm_password = "Other!Pass3".to_string();
        assert_matches!(
            confirm(&state, request).await,
            Err(FlowError::PasswordsDoNotMatch)
        );

        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn confirm_requires_an_active_grant() -> TestResult {
        let state = state();
        seed_user(&state, false).await?;

        assert_matches!(
            confirm(&state, change_request()).await,
            Err(FlowError::UserNotActive)
        );

        Ok(())
    }
}
