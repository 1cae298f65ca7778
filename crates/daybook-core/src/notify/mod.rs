//! Notification sinks.
//!
//! The reminder engine hands finished digests to a [`NotificationSink`];
//! delivery is one logged attempt with no retry beyond what the transport
//! itself performs. Two sinks ship with the crate: SMTP mail ([`SmtpMailer`])
//! and a JSON webhook ([`WebhookSink`]).

mod smtp;
mod webhook;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::NotifyError;
use crate::storage::{MailConfig, SinkKind};

pub use smtp::SmtpMailer;
pub use webhook::WebhookSink;

/// One rendered notification ready for dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Recipient address.
    pub to: String,
    pub subject: String,
    /// Plain-text body.
    pub text: String,
    /// Rich-text body.
    pub html: String,
}

/// Delivery capability the reminder engine dispatches through.
///
/// Implementations must be safe to call concurrently for different
/// recipients.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Attempt delivery once. Failure is reported, never retried here.
    async fn send(&self, message: &OutboundMessage) -> Result<(), NotifyError>;
}

/// Build the sink selected by the `[mail]` configuration section.
pub fn sink_from_config(mail: &MailConfig) -> Result<Arc<dyn NotificationSink>, NotifyError> {
    match mail.sink {
        SinkKind::Smtp => Ok(Arc::new(SmtpMailer::new(mail)?)),
        SinkKind::Webhook => {
            let url = mail
                .webhook_url
                .clone()
                .ok_or_else(|| NotifyError::NotConfigured("webhook_url is not set".to_string()))?;
            Ok(Arc::new(WebhookSink::new(url)))
        }
    }
}
