//! Delivery hooks for issued verification codes.

use anyhow::Context as _;
use reqwest::Client;
use tracing::{debug, info};

use crate::domain::repository::DeliveryHook;
use crate::domain::types::OtpMessage;

/// Keep the last four digits, mask the rest.
pub fn mask_phone(phone: &str) -> String {
    let len = phone.chars().count();
    phone
        .chars()
        .enumerate()
        .map(|(i, c)| if i + 4 < len { '*' } else { c })
        .collect()
}

/// Writes the message to the log instead of sending it. Used when no SMS
/// gateway is configured.
#[derive(Clone, Default)]
pub struct LogDeliveryHook;

impl DeliveryHook for LogDeliveryHook {
    async fn deliver(&self, message: &OtpMessage) -> anyhow::Result<()> {
        info!(
            parent_id = message.parent_id,
            phone = %mask_phone(&message.phone),
            "verification code ready for delivery"
        );
        debug!(parent_id = message.parent_id, code = %message.code, "verification code");
        Ok(())
    }
}

/// POSTs the message as JSON to an SMS gateway webhook. Non-2xx is a failure.
#[derive(Clone)]
pub struct WebhookDeliveryHook {
    client: Client,
    url: String,
}

impl WebhookDeliveryHook {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

impl DeliveryHook for WebhookDeliveryHook {
    async fn deliver(&self, message: &OtpMessage) -> anyhow::Result<()> {
        self.client
            .post(&self.url)
            .json(message)
            .send()
            .await
            .context("send sms webhook")?
            .error_for_status()
            .context("sms webhook status")?;
        Ok(())
    }
}

/// Hook selected from configuration.
#[derive(Clone)]
pub enum Delivery {
    Log(LogDeliveryHook),
    Webhook(WebhookDeliveryHook),
}

impl Delivery {
    pub fn from_webhook_url(url: Option<String>) -> Self {
        match url {
            Some(url) => Self::Webhook(WebhookDeliveryHook::new(url)),
            None => Self::Log(LogDeliveryHook),
        }
    }
}

impl DeliveryHook for Delivery {
    async fn deliver(&self, message: &OtpMessage) -> anyhow::Result<()> {
        match self {
            Self::Log(hook) => hook.deliver(message).await,
            Self::Webhook(hook) => hook.deliver(message).await,
        }
    }
}
