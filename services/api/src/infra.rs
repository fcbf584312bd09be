use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusHandle;

use laverie_leads::intake::{
    JournalEntry, JournalError, MailError, Mailer, OutboundEmail, PushAlert, PushError,
    PushGateway, SubmissionJournal,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// In-memory adapters backing the `demo` subcommand so the full pipeline can
/// run without an SMTP relay or push credentials.
#[derive(Default, Clone)]
pub(crate) struct InMemoryJournal {
    entries: Arc<Mutex<Vec<JournalEntry>>>,
}

impl InMemoryJournal {
    pub(crate) fn entries(&self) -> Vec<JournalEntry> {
        self.entries.lock().expect("journal mutex poisoned").clone()
    }
}

impl SubmissionJournal for InMemoryJournal {
    fn append(&self, entry: &JournalEntry) -> Result<(), JournalError> {
        self.entries
            .lock()
            .expect("journal mutex poisoned")
            .push(entry.clone());
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryMailer {
    sent: Arc<Mutex<Vec<OutboundEmail>>>,
}

impl InMemoryMailer {
    pub(crate) fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

#[async_trait]
impl Mailer for InMemoryMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        self.sent.lock().expect("mailer mutex poisoned").push(email);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPush {
    alerts: Arc<Mutex<Vec<PushAlert>>>,
}

impl InMemoryPush {
    pub(crate) fn alerts(&self) -> Vec<PushAlert> {
        self.alerts.lock().expect("push mutex poisoned").clone()
    }
}

#[async_trait]
impl PushGateway for InMemoryPush {
    async fn notify(&self, alert: PushAlert) -> Result<(), PushError> {
        self.alerts.lock().expect("push mutex poisoned").push(alert);
        Ok(())
    }
}
