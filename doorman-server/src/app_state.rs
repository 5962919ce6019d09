//! The Axum Application State

use crate::setups::ServerSetup;
use anyhow::{anyhow, Result};

/// Global application route state.
#[derive(Clone, Debug)]
pub struct AppState<S: ServerSetup> {
    /// Gateway to the user document collection
    pub store: S::UserStore,
    /// Role & application registry lookup
    pub registry: S::Registry,
    /// The service that sends verification codes & temporary credentials
    pub verification_code_sender: S::VerificationCodeSender,
}

/// Builder for [`AppState`]
#[derive(Debug)]
pub struct AppStateBuilder<S: ServerSetup> {
    store: Option<S::UserStore>,
    registry: Option<S::Registry>,
    verification_code_sender: Option<S::VerificationCodeSender>,
}

impl<S: ServerSetup> Default for AppStateBuilder<S> {
    fn default() -> Self {
        Self {
            store: None,
            registry: None,
            verification_code_sender: None,
        }
    }
}

impl<S: ServerSetup> AppStateBuilder<S> {
    /// Set the user store.
    pub fn with_user_store(mut self, store: S::UserStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the role/app registry.
    pub fn with_registry(mut self, registry: S::Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set the verification code sender.
    pub fn with_verification_code_sender(
        mut self,
        verification_code_sender: S::VerificationCodeSender,
    ) -> Self {
        self.verification_code_sender = Some(verification_code_sender);
        self
    }

    /// Finalize the builder and return the [`AppState`]
    pub fn finalize(self) -> Result<AppState<S>> {
        let store = self.store.ok_or_else(|| anyhow!("store is required"))?;

        let registry = self
            .registry
            .ok_or_else(|| anyhow!("registry is required"))?;

        let verification_code_sender = self
            .verification_code_sender
            .ok_or_else(|| anyhow!("verification_code_sender is required"))?;

        Ok(AppState {
            store,
            registry,
            verification_code_sender,
        })
    }
}
