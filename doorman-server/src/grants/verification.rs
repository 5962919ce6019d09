//! Verification: one-time code submission activating a single grant.

use crate::{
    app_state::AppState, grants::error::FlowError, setups::ServerSetup, store::UserStore,
};
use chrono::Utc;

/// Verify a submitted one-time code for the given email.
///
/// The grant is selected purely by code match, so codes are unique
/// within a user's grant sequence by construction (generation-time
/// entropy), not re-checked here. Exactly one grant transitions to
/// `Active`; its siblings are untouched. Expired and unknown codes
/// mutate nothing.
pub async fn verify<S: ServerSetup>(
    state: &AppState<S>,
    email: &str,
    submitted_code: &str,
) -> Result<(), FlowError> {
    let mut user = state
        .store
        .find_by_email(email)
        .await?
        .ok_or(FlowError::UserNotFound)?;

    let position = user
        .grant_position_by_code(submitted_code)
        .ok_or(FlowError::InvalidCode)?;

    if user.apps[position].is_code_expired(Utc::now()) {
        return Err(FlowError::CodeExpired);
    }

    user.apps[position].activate();

    // The matching key was the code itself, and activation just cleared
    // it, so there is no stable predicate for a targeted update: this is
    // the one flow that must rewrite the whole grant array.
    state.store.replace_grants(&user.email, &user.apps).await?;

    tracing::info!(user = %user.id, "grant verified and activated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        app_state::AppStateBuilder,
        grants::{codes, enrollment},
        setups::test::{TestSetup, TestVerificationCodeSender},
        store::{
            memory::{InMemoryRegistry, InMemoryUserStore},
            UserStore,
        },
    };
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};
    use doorman_core::{common::EnrollmentRequest, status::GrantStatus};
    use testresult::TestResult;

    fn state() -> AppState<TestSetup> {
        AppStateBuilder::default()
            .with_user_store(InMemoryUserStore::default())
            .with_registry(InMemoryRegistry::default())
            .with_verification_code_sender(TestVerificationCodeSender::default())
            .finalize()
            .unwrap()
    }

    async fn enroll_ada(state: &AppState<TestSetup>) -> TestResult<String> {
        state.registry.add_role("admin");
        state.registry.add_app("billing");
        state.registry.add_app("payroll");

        enrollment::enroll(
            state,
            EnrollmentRequest {
                name: "Ada".to_string(),
                email: "ada@x.com".to_string(),
                password: "Str0ng!Pass".to_string(),
                role_name: Some("admin".to_string()),
                app_name: Some("billing".to_string()),
                apps: vec![doorman_core::common::GrantSpec {
                    role: "admin".to_string(),
                    app: "payroll".to_string(),
                }],
            },
        )
        .await?;

        let user = state.store.find_by_email("ada@x.com").await?.unwrap();
        Ok(user.apps[0].code.clone())
    }

    #[test_log::test(tokio::test)]
    async fn correct_code_activates_exactly_one_grant() -> TestResult {
        let state = state();
        let code = enroll_ada(&state).await?;

        let sibling_before = state.store.find_by_email("ada@x.com").await?.unwrap().apps[1].clone();

        verify(&state, "ada@x.com", &code).await?;

        let user = state.store.find_by_email("ada@x.com").await?.unwrap();
        assert_eq!(user.apps[0].status, GrantStatus::Active);
        assert!(user.apps[0].code.is_empty());
        assert!(user.apps[0].code_expiration.is_empty());
        // Sibling grants are value-identical before and after.
        assert_eq!(user.apps[1], sibling_before);

        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn unknown_code_fails_without_mutation() -> TestResult {
        let state = state();
        enroll_ada(&state).await?;
        let before = state.store.find_by_email("ada@x.com").await?.unwrap();

        let result = verify(&state, "ada@x.com", "nope").await;
        assert_matches!(result, Err(FlowError::InvalidCode));

        let after = state.store.find_by_email("ada@x.com").await?.unwrap();
        assert_eq!(before, after);

        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn expired_code_fails_without_mutation() -> TestResult {
        let state = state();
        let code = enroll_ada(&state).await?;

        // Backdate the expiry well past the TTL.
        let mut user = state.store.find_by_email("ada@x.com").await?.unwrap();
        user.apps[0].code_expiration =
            codes::expiry_timestamp(Utc::now() - Duration::minutes(30));
        state.store.replace_grants("ada@x.com", &user.apps).await?;

        let result = verify(&state, "ada@x.com", &code).await;
        assert_matches!(result, Err(FlowError::CodeExpired));

        let after = state.store.find_by_email("ada@x.com").await?.unwrap();
        assert_eq!(after.apps[0].status, GrantStatus::Pending);
        assert_eq!(after.apps[0].code, code);

        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn malformed_expiry_does_not_block_verification() -> TestResult {
        let state = state();
        let code = enroll_ada(&state).await?;

        let mut user = state.store.find_by_email("ada@x.com").await?.unwrap();
        user.apps[0].code_expiration = "garbage".to_string();
        state.store.replace_grants("ada@x.com", &user.apps).await?;

        verify(&state, "ada@x.com", &code).await?;

        let after = state.store.find_by_email("ada@x.com").await?.unwrap();
        assert_eq!(after.apps[0].status, GrantStatus::Active);

        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn unknown_user_and_empty_code_fail() -> TestResult {
        let state = state();
        enroll_ada(&state).await?;

        assert_matches!(
            verify(&state, "ghost@x.com", "123456").await,
            Err(FlowError::UserNotFound)
        );
        assert_matches!(
            verify(&state, "ada@x.com", "").await,
            Err(FlowError::InvalidCode)
        );

        Ok(())
    }
}
