use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{IntakeRejection, JournalEntry, LeadForm, SubmissionReceipt};
use super::journal::SubmissionJournal;
use super::notify::email::Mailer;
use super::notify::push::PushGateway;
use super::notify::NotificationDispatcher;
use super::throttle::SubmissionThrottle;
use super::validate::{validate_form_token, IntakeGuard};

const ACCEPTED_MESSAGE: &str = "Demande envoyée avec succès";

/// Pipeline behind the submission endpoint.
///
/// Stage order is fixed: throttle admission, token check, sanitize and
/// validate, journal append, notification dispatch. The journal append is
/// attempted strictly before any notification fires, so no side effect is
/// produced for an input that was never recorded as accepted; the append
/// itself stays best-effort.
pub struct LeadIntakeService<J, M, P> {
    guard: IntakeGuard,
    throttle: SubmissionThrottle,
    journal: Arc<J>,
    dispatcher: NotificationDispatcher<M, P>,
}

impl<J, M, P> LeadIntakeService<J, M, P>
where
    J: SubmissionJournal + 'static,
    M: Mailer + 'static,
    P: PushGateway + 'static,
{
    pub fn new(
        throttle: SubmissionThrottle,
        journal: Arc<J>,
        dispatcher: NotificationDispatcher<M, P>,
    ) -> Self {
        Self {
            guard: IntakeGuard::new(),
            throttle,
            journal,
            dispatcher,
        }
    }

    pub async fn submit(
        &self,
        form: LeadForm,
        client_id: &str,
    ) -> Result<SubmissionReceipt, IntakeRejection> {
        if !self.throttle.admit(client_id) {
            return Err(IntakeRejection::RateLimited);
        }

        validate_form_token(&form.csrf_token)?;

        let lead = self.guard.lead_from_form(form)?;

        let received_at = Utc::now();
        let entry = JournalEntry {
            received_at,
            client_id: client_id.to_string(),
            lead: lead.clone(),
        };
        if let Err(err) = self.journal.append(&entry) {
            warn!(%err, "submission journal append failed");
        }

        let outcome = self.dispatcher.dispatch(&lead, client_id, received_at).await;

        info!(
            client = client_id,
            email_sent = outcome.internal_email_sent,
            confirmation_sent = outcome.confirmation_email_sent,
            push_sent = outcome.push_sent,
            "lead submission accepted"
        );

        Ok(SubmissionReceipt {
            message: ACCEPTED_MESSAGE.to_string(),
            outcome,
        })
    }
}
