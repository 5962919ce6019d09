//! Helpers for running isolated webserver instances
use crate::{
    app_state::{AppState, AppStateBuilder},
    router::setup_app_router,
    setups::test::{TestSetup, TestVerificationCodeSender},
    store::memory::{InMemoryRegistry, InMemoryUserStore},
};
use axum::Router;

/// A doorman server wired against in-memory collaborators.
#[derive(Debug)]
pub struct TestContext {
    app: Router,
    app_state: AppState<TestSetup>,
}

impl TestContext {
    /// Create a new test context
    pub async fn new() -> Self {
        Self::new_with_state(|builder| builder).await
    }

    /// Create a new test context, customizing the state builder.
    pub async fn new_with_state<F>(f: F) -> Self
    where
        F: FnOnce(AppStateBuilder<TestSetup>) -> AppStateBuilder<TestSetup>,
    {
        let builder = AppStateBuilder::default()
            .with_user_store(InMemoryUserStore::default())
            .with_registry(InMemoryRegistry::default())
            .with_verification_code_sender(TestVerificationCodeSender::default());

        let app_state = f(builder).finalize().unwrap();

        let app = setup_app_router(app_state.clone());

        Self { app, app_state }
    }

    /// The router, ready for `oneshot` requests.
    pub fn app(&self) -> Router {
        self.app.clone()
    }

    /// The application state behind the router.
    pub fn app_state(&self) -> &AppState<TestSetup> {
        &self.app_state
    }

    /// The in-memory user store.
    pub fn store(&self) -> &InMemoryUserStore {
        &self.app_state.store
    }

    /// The in-memory role/app registry.
    pub fn registry(&self) -> &InMemoryRegistry {
        &self.app_state.registry
    }

    /// The recording code sender.
    pub fn verification_code_sender(&self) -> &TestVerificationCodeSender {
        &self.app_state.verification_code_sender
    }
}
