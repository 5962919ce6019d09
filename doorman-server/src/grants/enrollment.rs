//! Enrollment: user creation or grant-append, plus code delivery.

use crate::{
    app_state::AppState,
    crypto,
    grants::{codes::CodeGenerator, error::FlowError, resolver},
    models::user::{Grant, NewUser},
    setups::{ServerSetup, VerificationCodeSender},
    store::UserStore,
};
use chrono::Utc;
use doorman_core::{common::EnrollmentRequest, password};

/// How an enrollment request concluded. Both are success outcomes; the
/// boundary layer renders them as 201 vs 200.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EnrollmentOutcome {
    /// A new user record was created with the requested grants.
    Created,
    /// The requested grants were appended to an existing user.
    Updated,
}

/// Enroll a user into one or more (role, app) grants.
///
/// Preconditions are checked in order, short-circuiting on the first
/// failure: name, email syntax, password length, password policy, then
/// assignment resolution. Any duplicate (role, app) pair, whether against
/// the user's stored grants or within the request itself, rejects the
/// whole request; there is no partial write.
pub async fn enroll<S: ServerSetup>(
    state: &AppState<S>,
    request: EnrollmentRequest,
) -> Result<EnrollmentOutcome, FlowError> {
    if request.name.trim().chars().count() < 2 {
        return Err(FlowError::InvalidName);
    }
    if !validator::validate_email(request.email.as_str()) {
        return Err(FlowError::InvalidEmail);
    }
    if request.password.len() < 8 {
        return Err(FlowError::InvalidPassword);
    }
    if let Some(message) = password::check(&request.password) {
        return Err(FlowError::PasswordPolicy(message));
    }

    let grants = build_requested_grants(state, &request).await?;

    match state.store.find_by_email(&request.email).await? {
        Some(mut user) => {
            for grant in &grants {
                if user.has_grant_for(&grant.role, &grant.app) {
                    return Err(FlowError::AlreadyAssigned {
                        role: grant.role,
                        app: grant.app,
                    });
                }
            }

            user.apps.extend(grants.iter().cloned());
            state.store.replace_grants(&user.email, &user.apps).await?;

            tracing::info!(user = %user.id, added = grants.len(), "appended grants to existing user");
            deliver_codes(state, &user.email, &grants).await;
            Ok(EnrollmentOutcome::Updated)
        }
        None => {
            let password_hash =
                crypto::hash_password(&request.password).map_err(FlowError::Unexpected)?;
            let email = request.email.trim().to_string();
            let user = NewUser {
                name: request.name.trim().to_string(),
                email: email.clone(),
                password: password_hash,
                apps: grants.clone(),
            };

            let id = state.store.insert_user(user).await?;

            tracing::info!(user = %id, grants = grants.len(), "created user");
            deliver_codes(state, &email, &grants).await;
            Ok(EnrollmentOutcome::Created)
        }
    }
}

/// Resolve both request shapes into a list of freshly issued grants.
///
/// The single `role_name`/`app_name` pair issues a high-entropy code;
/// batch items issue six-digit codes. Resolution failure of any single
/// reference fails the whole request.
async fn build_requested_grants<S: ServerSetup>(
    state: &AppState<S>,
    request: &EnrollmentRequest,
) -> Result<Vec<Grant>, FlowError> {
    let now = Utc::now();
    let mut grants: Vec<Grant> = Vec::new();

    let role_name = request
        .role_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let app_name = request
        .app_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    match (role_name, app_name) {
        (None, None) => {}
        (Some(role_name), Some(app_name)) => {
            let role = resolver::resolve_role(&state.registry, role_name).await?;
            let app = resolver::resolve_app(&state.registry, app_name).await?;
            grants.push(Grant::issue(role, app, CodeGenerator::Secure, now));
        }
        _ => return Err(FlowError::IncompletePair),
    }

    for spec in &request.apps {
        if spec.role.trim().is_empty() || spec.app.trim().is_empty() {
            return Err(FlowError::SpecItemIncomplete);
        }
        let role = resolver::resolve_role(&state.registry, &spec.role).await?;
        let app = resolver::resolve_app(&state.registry, &spec.app).await?;
        grants.push(Grant::issue(role, app, CodeGenerator::SixDigit, now));
    }

    if grants.is_empty() {
        return Err(FlowError::MissingAssignment);
    }

    // The same pair requested twice is as much a duplicate as a stored one.
    for (index, grant) in grants.iter().enumerate() {
        if grants[..index]
            .iter()
            .any(|earlier| earlier.matches_pair(&grant.role, &grant.app))
        {
            return Err(FlowError::AlreadyAssigned {
                role: grant.role,
                app: grant.app,
            });
        }
    }

    Ok(grants)
}

/// Best-effort code delivery: failures are logged and never surface.
async fn deliver_codes<S: ServerSetup>(state: &AppState<S>, email: &str, grants: &[Grant]) {
    for grant in grants {
        if let Err(error) = state
            .verification_code_sender
            .send_code(email, &grant.code)
            .await
        {
            tracing::warn!(email, %error, "verification code delivery failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        app_state::AppStateBuilder,
        setups::test::{TestSetup, TestVerificationCodeSender},
        store::{
            memory::{InMemoryRegistry, InMemoryUserStore},
            UserStore,
        },
    };
    use assert_matches::assert_matches;
    use doorman_core::{common::GrantSpec, status::GrantStatus};
    use testresult::TestResult;

    fn state() -> AppState<TestSetup> {
        AppStateBuilder::default()
            .with_user_store(InMemoryUserStore::default())
            .with_registry(InMemoryRegistry::default())
            .with_verification_code_sender(TestVerificationCodeSender::default())
            .finalize()
            .unwrap()
    }

    fn ada_request() -> EnrollmentRequest {
        EnrollmentRequest {
            name: "Ada".to_string(),
            email: "ada@x.com".to_string(),
            password: "Str0ng!Pass".to_string(),
            role_name: Some("admin".to_string()),
            app_name: Some("billing".to_string()),
            apps: vec![],
        }
    }

    #[test_log::test(tokio::test)]
    async fn single_pair_creates_user_with_pending_grant() -> TestResult {
        let state = state();
        let admin = state.registry.add_role("admin");
        let billing = state.registry.add_app("billing");

        let outcome = enroll(&state, ada_request()).await?;
        assert_eq!(outcome, EnrollmentOutcome::Created);

        let user = state.store.find_by_email("ada@x.com").await?.unwrap();
        assert_eq!(user.apps.len(), 1);
        let grant = &user.apps[0];
        assert_eq!(grant.role, admin);
        assert_eq!(grant.app, billing);
        assert_eq!(grant.status, GrantStatus::Pending);
        assert!(!grant.code.is_empty());
        assert!(!grant.is_session_active);

        // Password is stored hashed, never verbatim.
        assert_ne!(user.password, "Str0ng!Pass");
        assert!(crypto::verify_password("Str0ng!Pass", &user.password));

        // The code went out to the enrollment email.
        let sent = state.verification_code_sender.get_emails();
        assert_eq!(sent, vec![("ada@x.com".to_string(), grant.code.clone())]);

        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn existing_user_gets_grants_appended_in_order() -> TestResult {
        let state = state();
        state.registry.add_role("admin");
        state.registry.add_app("billing");
        let payroll = state.registry.add_app("payroll");

        enroll(&state, ada_request()).await?;

        let mut second = ada_request();
        second.role_name = None;
        second.app_name = None;
        second.apps = vec![GrantSpec {
            role: "admin".to_string(),
            app: "payroll".to_string(),
        }];
        let outcome = enroll(&state, second).await?;
        assert_eq!(outcome, EnrollmentOutcome::Updated);

        let user = state.store.find_by_email("ada@x.com").await?.unwrap();
        assert_eq!(user.apps.len(), 2);
        // New grants land at the end; the batch path issues numeric codes.
        assert_eq!(user.apps[1].app, payroll);
        let numeric: u32 = user.apps[1].code.parse()?;
        assert!((100_000..=999_999).contains(&numeric));

        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn duplicate_pair_against_stored_grants_conflicts() -> TestResult {
        let state = state();
        state.registry.add_role("admin");
        state.registry.add_app("billing");

        enroll(&state, ada_request()).await?;
        let result = enroll(&state, ada_request()).await;

        assert_matches!(result, Err(FlowError::AlreadyAssigned { .. }));

        // No partial write: still exactly one grant.
        let user = state.store.find_by_email("ada@x.com").await?.unwrap();
        assert_eq!(user.apps.len(), 1);

        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn duplicate_pair_within_one_request_conflicts() -> TestResult {
        let state = state();
        state.registry.add_role("admin");
        state.registry.add_app("billing");

        let mut request = ada_request();
        request.role_name = None;
        request.app_name = None;
        request.apps = vec![
            GrantSpec {
                role: "admin".to_string(),
                app: "billing".to_string(),
            },
            GrantSpec {
                role: "admin".to_string(),
                app: "billing".to_string(),
            },
        ];

        let result = enroll(&state, request).await;
        assert_matches!(result, Err(FlowError::AlreadyAssigned { .. }));

        // Nothing was written at all.
        assert_eq!(state.store.find_by_email("ada@x.com").await?, None);

        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn preconditions_short_circuit_in_order() {
        let state = state();

        let mut request = ada_request();
        request.name = " a ".to_string();
        assert_matches!(enroll(&state, request).await, Err(FlowError::InvalidName));

        let mut request = ada_request();
        request.email = "not-an-email".to_string();
        assert_matches!(enroll(&state, request).await, Err(FlowError::InvalidEmail));

        let mut request = ada_request();
        request.password = "Sh0rt!".to_string();
        assert_matches!(enroll(&state, request).await, Err(FlowError::InvalidPassword));

        let mut request = ada_request();
        request.password = "alllowercase1!".to_string();
        assert_matches!(
            enroll(&state, request).await,
            Err(FlowError::PasswordPolicy(_))
        );
    }

    #[test_log::test(tokio::test)]
    async fn assignment_shape_errors() {
        let state = state();
        state.registry.add_role("admin");
        state.registry.add_app("billing");

        let mut request = ada_request();
        request.app_name = None;
        assert_matches!(enroll(&state, request).await, Err(FlowError::IncompletePair));

        let mut request = ada_request();
        request.role_name = None;
        request.app_name = None;
        assert_matches!(
            enroll(&state, request).await,
            Err(FlowError::MissingAssignment)
        );

        let mut request = ada_request();
        request.role_name = None;
        request.app_name = None;
        request.apps = vec![GrantSpec {
            role: "admin".to_string(),
            app: "".to_string(),
        }];
        assert_matches!(
            enroll(&state, request).await,
            Err(FlowError::SpecItemIncomplete)
        );

        let mut request = ada_request();
        request.role_name = Some("ghost".to_string());
        assert_matches!(enroll(&state, request).await, Err(FlowError::InvalidRole(_)));

        let mut request = ada_request();
        request.app_name = Some("ghost".to_string());
        assert_matches!(enroll(&state, request).await, Err(FlowError::AppNotFound(_)));
    }
}
