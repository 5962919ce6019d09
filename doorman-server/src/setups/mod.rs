//! This abstracts doorman server side-effects into "setups".
//!
//! This module defines the trait, submodules define test & production
//! collections of implementations.
use crate::store::{Registry, UserStore};
use anyhow::Result;
use async_trait::async_trait;

pub mod prod;

/// This trait groups type parameters to the server's `AppState` struct.
///
/// It captures the setup of the server, distinguishing between e.g.
/// unit testing & production setups.
pub trait ServerSetup: Clone + Send + Sync + 'static {
    /// Which implementation of the user document gateway to choose
    type UserStore: UserStore;
    /// Which implementation of the role/app registry lookup to choose
    type Registry: Registry;
    /// Which implementation to use to send verification codes
    type VerificationCodeSender: VerificationCodeSender;
}

/// The service that delivers verification codes and temporary
/// credentials to users.
///
/// Both operations are best-effort at their call sites: a delivery
/// failure is logged and never fails the state change it accompanies.
#[async_trait]
pub trait VerificationCodeSender: Clone + Send + Sync + std::fmt::Debug + 'static {
    /// Send the code associated with the email
    async fn send_code(&self, email: &str, code: &str) -> Result<()>;

    /// Send a freshly issued temporary credential
    async fn send_temporary_password(&self, email: &str, password: &str) -> Result<()>;
}
