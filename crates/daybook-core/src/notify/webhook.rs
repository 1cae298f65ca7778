//! Webhook sink -- POSTs each digest as JSON to a configured endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use crate::error::NotifyError;
use crate::notify::{NotificationSink, OutboundMessage};

/// Delivers notifications by POSTing JSON to an HTTP endpoint.
pub struct WebhookSink {
    url: String,
    client: Client,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn send(&self, message: &OutboundMessage) -> Result<(), NotifyError> {
        let body = json!({
            "to": message.to,
            "subject": message.subject,
            "text": message.text,
            "html": message.html,
        });

        let resp = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(NotifyError::Http {
                status: resp.status().as_u16(),
            });
        }

        debug!(to = %message.to, "webhook accepted notification");
        Ok(())
    }
}
