use std::sync::Arc;
use std::time::Duration;

use clap::Args;

use crate::infra::{InMemoryJournal, InMemoryMailer, InMemoryPush};
use laverie_leads::config::RateLimitConfig;
use laverie_leads::error::AppError;
use laverie_leads::intake::{
    EmailRecipient, LeadForm, LeadIntakeService, NotificationDispatcher, SubmissionThrottle,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Mark the sample lead as already having a site available
    #[arg(long)]
    pub(crate) site_available: bool,
}

/// Drive one sample lead through the full pipeline against in-memory
/// adapters and print what each collaborator saw.
pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let journal = Arc::new(InMemoryJournal::default());
    let mailer = Arc::new(InMemoryMailer::default());
    let push = Arc::new(InMemoryPush::default());

    let dispatcher = NotificationDispatcher::new(
        mailer.clone(),
        Some(push.clone()),
        vec![EmailRecipient::bare("direction@mapetitelaverie.fr")],
        Duration::from_secs(5),
    );
    let service = LeadIntakeService::new(
        SubmissionThrottle::new(RateLimitConfig::default()),
        journal.clone(),
        dispatcher,
    );

    let form = sample_form(args.site_available);
    match service.submit(form, "203.0.113.7").await {
        Ok(receipt) => {
            println!("accepted: {}", receipt.message);
            println!(
                "channels: internal_email={} confirmation_email={} push={}",
                receipt.outcome.internal_email_sent,
                receipt.outcome.confirmation_email_sent,
                receipt.outcome.push_sent
            );
        }
        Err(rejection) => println!("refused: {rejection}"),
    }

    for entry in journal.entries() {
        println!(
            "journal entry: {}",
            serde_json::to_string(&entry).unwrap_or_else(|_| "<unserializable>".to_string())
        );
    }

    for email in mailer.sent() {
        let to: Vec<&str> = email
            .to
            .iter()
            .map(|recipient| recipient.address.as_str())
            .collect();
        println!("email '{}' -> {}", email.subject, to.join(", "));
    }

    for alert in push.alerts() {
        println!("push '{}':\n{}", alert.title, alert.message);
    }

    Ok(())
}

fn sample_form(site_available: bool) -> LeadForm {
    LeadForm {
        type_projet: "creation_laverie".to_string(),
        budget: "80k_120k".to_string(),
        emplacement_disponible: if site_available { "oui" } else { "non" }.to_string(),
        type_emplacement: if site_available {
            "local_commercial".to_string()
        } else {
            String::new()
        },
        ville_emplacement: if site_available {
            "Nantes".to_string()
        } else {
            String::new()
        },
        timing: "moins_3_mois".to_string(),
        surface: "40-60m2".to_string(),
        prenom: "Marie".to_string(),
        nom: "Dupont".to_string(),
        telephone: "0612345678".to_string(),
        email: "marie.dupont@example.fr".to_string(),
        newsletter_optin: Some("on".to_string()),
        rgpd_consent: Some("on".to_string()),
        csrf_token: "demo-token-0123456789abcdef".to_string(),
    }
}
