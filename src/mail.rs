//! Outgoing email for the contact form.
//!
//! The site never speaks SMTP itself. With a webhook configured, each message
//! is POSTed as JSON to an HTTP mail relay; without one, delivery is disabled
//! and messages are only logged.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::config::MailConfig;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Message {
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub text: String,
}

/// What happened to a message that did not fail.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Delivery {
    Sent,
    /// Delivery is disabled; the message was only logged.
    Skipped,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail relay unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail relay rejected message with status {0}")]
    Rejected(u16),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &Message) -> Result<Delivery, MailError>;
}

/// Picks the mailer for `config`: the webhook relay if one is set.
pub fn from_config(config: &MailConfig) -> Arc<dyn Mailer> {
    match &config.webhook {
        Some(endpoint) => Arc::new(WebhookMailer::new(endpoint.clone())),
        None => Arc::new(DisabledMailer),
    }
}

pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, message: &Message) -> Result<Delivery, MailError> {
        info!(
            to = %message.to,
            reply_to = %message.reply_to,
            subject = %message.subject,
            "mail delivery disabled, message not sent",
        );
        Ok(Delivery::Skipped)
    }
}

pub struct WebhookMailer {
    client: reqwest::Client,
    endpoint: Url,
}

impl WebhookMailer {
    pub fn new(endpoint: Url) -> Self {
        Self { client: reqwest::Client::new(), endpoint }
    }
}

#[async_trait]
impl Mailer for WebhookMailer {
    async fn send(&self, message: &Message) -> Result<Delivery, MailError> {
        let response = self.client
            .post(self.endpoint.clone())
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), endpoint = %self.endpoint, "mail relay rejected message");
            return Err(MailError::Rejected(status.as_u16()));
        }

        info!(to = %message.to, "message sent");
        Ok(Delivery::Sent)
    }
}
