//! SMTP mail sink backed by lettre's async transport.

use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use async_trait::async_trait;
use tracing::debug;

use crate::error::NotifyError;
use crate::notify::{NotificationSink, OutboundMessage};
use crate::storage::MailConfig;

/// Sends reminder digests as multipart (plain + HTML) mail over SMTP.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build a mailer from the `[mail]` configuration section.
    ///
    /// Uses STARTTLS against `host:port`; credentials are attached only
    /// when both username and password are configured.
    pub fn new(config: &MailConfig) -> Result<Self, NotifyError> {
        let from: Mailbox = config
            .from_address
            .parse()
            .map_err(|_| NotifyError::InvalidAddress(config.from_address.clone()))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| NotifyError::Transport(e.to_string()))?
            .port(config.port);

        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl NotificationSink for SmtpMailer {
    async fn send(&self, message: &OutboundMessage) -> Result<(), NotifyError> {
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|_| NotifyError::InvalidAddress(message.to.clone()))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&message.subject)
            .multipart(MultiPart::alternative_plain_html(
                message.text.clone(),
                message.html.clone(),
            ))
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        debug!(to = %message.to, "mail accepted by SMTP relay");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MailConfig;

    #[test]
    fn rejects_malformed_from_address() {
        let config = MailConfig {
            from_address: "not an address".to_string(),
            ..MailConfig::default()
        };
        let err = SmtpMailer::new(&config).err().expect("must fail");
        assert!(matches!(err, NotifyError::InvalidAddress(_)));
    }

    #[tokio::test]
    async fn rejects_malformed_recipient() {
        let mailer = SmtpMailer::new(&MailConfig::default()).expect("default config is valid");
        let message = OutboundMessage {
            to: "broken".to_string(),
            subject: "s".to_string(),
            text: "t".to_string(),
            html: "<p>t</p>".to_string(),
        };
        let err = mailer.send(&message).await.err().expect("must fail");
        assert!(matches!(err, NotifyError::InvalidAddress(_)));
    }
}
