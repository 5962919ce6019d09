//! Production server setup code

use crate::{
    settings,
    setups::{ServerSetup, VerificationCodeSender},
    store::data_api::DataApiClient,
};
use anyhow::Result;
use async_trait::async_trait;
use mailgun_rs::{EmailAddress, Mailgun, MailgunRegion, Message};
use std::collections::HashMap;

/// Production implementation of `ServerSetup`.
/// Actually calls out to other HTTP services configured in `settings.toml`.
#[derive(Clone, Debug, Default)]
pub struct ProdSetup;

impl ServerSetup for ProdSetup {
    type UserStore = DataApiClient;
    type Registry = DataApiClient;
    type VerificationCodeSender = EmailVerificationCodeSender;
}

/// Sends verification codes and temporary credentials over email.
#[derive(Debug, Clone)]
pub struct EmailVerificationCodeSender {
    settings: settings::Mailgun,
}

impl EmailVerificationCodeSender {
    /// Create a new EmailVerificationCodeSender
    pub fn new(settings: settings::Mailgun) -> Self {
        Self { settings }
    }

    fn sender(&self) -> EmailAddress {
        EmailAddress::name_address(&self.settings.from_name, &self.settings.from_address)
    }

    fn message(&self, email: &str, subject: &str, template: &str, var: (&str, &str)) -> Message {
        let delivery_address = EmailAddress::address(email);
        let template_vars = HashMap::from_iter([(var.0.to_string(), var.1.to_string())]);

        Message {
            to: vec![delivery_address],
            subject: subject.to_string(),
            template: template.to_string(),
            template_vars,
            ..Default::default()
        }
    }

    async fn send(&self, message: Message) -> Result<()> {
        let client = Mailgun {
            message,
            api_key: self.settings.api_key.clone(),
            domain: self.settings.domain.clone(),
        };

        client.async_send(MailgunRegion::US, &self.sender()).await?;

        Ok(())
    }
}

#[async_trait]
impl VerificationCodeSender for EmailVerificationCodeSender {
    async fn send_code(&self, email: &str, code: &str) -> Result<()> {
        tracing::debug!(email, "sending verification code email");
        let message = self.message(
            email,
            &self.settings.code_subject,
            &self.settings.code_template,
            ("code", code),
        );
        self.send(message).await
    }

    async fn send_temporary_password(&self, email: &str, password: &str) -> Result<()> {
        tracing::debug!(email, "sending temporary credential email");
        let message = self.message(
            email,
            &self.settings.reset_subject,
            &self.settings.reset_template,
            ("password", password),
        );
        self.send(message).await
    }
}
