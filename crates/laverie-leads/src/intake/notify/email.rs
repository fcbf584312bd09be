use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;

/// One email recipient; `name` becomes the mailbox display name when set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailRecipient {
    pub name: Option<String>,
    pub address: String,
}

impl EmailRecipient {
    pub fn bare(address: impl Into<String>) -> Self {
        Self {
            name: None,
            address: address.into(),
        }
    }

    pub fn named(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            address: address.into(),
        }
    }
}

/// Transport-agnostic outbound email, so tests can assert on rendered
/// messages without an SMTP relay.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: Vec<EmailRecipient>,
    pub reply_to: Option<EmailRecipient>,
    pub subject: String,
    pub html_body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid mailbox '{0}'")]
    Address(String),
    #[error("message assembly failed: {0}")]
    Assembly(String),
    #[error("smtp transport failure: {0}")]
    Transport(String),
}

/// Outbound email seam. The live implementation speaks SMTP; tests record.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError>;
}

/// SMTP mailer using STARTTLS submission, matching the relay configuration
/// the marketing site has always used.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn from_config(config: &SmtpConfig) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|err| MailError::Transport(err.to_string()))?
            .port(config.port)
            .credentials(Credentials::new(config.user.clone(), config.pass.clone()))
            .build();

        let from = mailbox(&EmailRecipient::named(
            config.from_name.clone(),
            config.from_email.clone(),
        ))?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(email.subject)
            .header(ContentType::TEXT_HTML);

        for recipient in &email.to {
            builder = builder.to(mailbox(recipient)?);
        }

        if let Some(reply_to) = &email.reply_to {
            builder = builder.reply_to(mailbox(reply_to)?);
        }

        let message = builder
            .body(email.html_body)
            .map_err(|err| MailError::Assembly(err.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|err| MailError::Transport(err.to_string()))?;
        Ok(())
    }
}

fn mailbox(recipient: &EmailRecipient) -> Result<Mailbox, MailError> {
    let address: Address = recipient
        .address
        .parse()
        .map_err(|_| MailError::Address(recipient.address.clone()))?;
    Ok(Mailbox::new(recipient.name.clone(), address))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mailbox_rejects_malformed_addresses() {
        let error = mailbox(&EmailRecipient::bare("not-an-address")).expect_err("must fail");
        assert!(matches!(error, MailError::Address(raw) if raw == "not-an-address"));
    }

    #[test]
    fn mailbox_carries_display_name() {
        let mb = mailbox(&EmailRecipient::named("Marie Dupont", "marie@example.fr"))
            .expect("valid mailbox");
        assert_eq!(mb.name.as_deref(), Some("Marie Dupont"));
        assert_eq!(mb.email.to_string(), "marie@example.fr");
    }
}
