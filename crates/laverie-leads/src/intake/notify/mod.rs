//! Best-effort notification fan-out for accepted leads.
//!
//! Three independent channels: the internal alert email, the confirmation
//! email to the submitter, and an operator push alert. A failure or timeout
//! on one channel never prevents the others from being attempted, and none
//! of the three escalates to an overall submission failure.

pub mod email;
pub mod push;
mod templates;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::warn;

use super::domain::{Lead, NotificationOutcome};
use email::{EmailRecipient, Mailer, OutboundEmail};
use push::{PushAlert, PushGateway};

pub use templates::{CONFIRMATION_SUBJECT, INTERNAL_SUBJECT, PUSH_TITLE};

pub struct NotificationDispatcher<M, P> {
    mailer: Arc<M>,
    push: Option<Arc<P>>,
    recipients: Vec<EmailRecipient>,
    send_timeout: Duration,
}

impl<M, P> NotificationDispatcher<M, P>
where
    M: Mailer + 'static,
    P: PushGateway + 'static,
{
    /// `push` is `None` when no credentials are configured; the channel then
    /// trivially succeeds as a no-op.
    pub fn new(
        mailer: Arc<M>,
        push: Option<Arc<P>>,
        recipients: Vec<EmailRecipient>,
        send_timeout: Duration,
    ) -> Self {
        Self {
            mailer,
            push,
            recipients,
            send_timeout,
        }
    }

    /// Attempt all three sends concurrently and report per-channel results.
    pub async fn dispatch(
        &self,
        lead: &Lead,
        client_id: &str,
        received_at: DateTime<Utc>,
    ) -> NotificationOutcome {
        let (internal_email_sent, confirmation_email_sent, push_sent) = tokio::join!(
            self.send_internal_alert(lead, client_id, received_at),
            self.send_confirmation(lead),
            self.send_push(lead),
        );

        NotificationOutcome {
            internal_email_sent,
            confirmation_email_sent,
            push_sent,
        }
    }

    async fn send_internal_alert(
        &self,
        lead: &Lead,
        client_id: &str,
        received_at: DateTime<Utc>,
    ) -> bool {
        let email = OutboundEmail {
            to: self.recipients.clone(),
            reply_to: Some(EmailRecipient::named(lead.full_name(), lead.email.clone())),
            subject: INTERNAL_SUBJECT.to_string(),
            html_body: templates::internal_alert_html(lead, client_id, received_at),
        };

        self.bounded_send("internal alert email", self.mailer.send(email))
            .await
    }

    async fn send_confirmation(&self, lead: &Lead) -> bool {
        let email = OutboundEmail {
            to: vec![EmailRecipient::named(lead.full_name(), lead.email.clone())],
            reply_to: None,
            subject: CONFIRMATION_SUBJECT.to_string(),
            html_body: templates::confirmation_html(lead),
        };

        self.bounded_send("confirmation email", self.mailer.send(email))
            .await
    }

    async fn send_push(&self, lead: &Lead) -> bool {
        let Some(gateway) = &self.push else {
            return true;
        };

        let alert = PushAlert {
            title: PUSH_TITLE.to_string(),
            message: templates::push_message(lead),
            link: format!("mailto:{}", lead.email),
            link_title: "Répondre par email".to_string(),
        };

        self.bounded_send("push alert", gateway.notify(alert)).await
    }

    /// Wrap one outbound call in the configured timeout. A slow relay costs
    /// at most `send_timeout` and only its own channel's outcome.
    async fn bounded_send<T, E>(
        &self,
        channel: &'static str,
        send: impl std::future::Future<Output = Result<T, E>>,
    ) -> bool
    where
        E: std::fmt::Display,
    {
        match tokio::time::timeout(self.send_timeout, send).await {
            Ok(Ok(_)) => true,
            Ok(Err(err)) => {
                warn!(%err, channel, "notification send failed");
                false
            }
            Err(_) => {
                warn!(channel, timeout_secs = self.send_timeout.as_secs(), "notification send timed out");
                false
            }
        }
    }
}
