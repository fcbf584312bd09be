//! Lead intake pipeline: sanitize, validate, throttle, journal, notify.
//!
//! The marketing site's wizard talks to exactly one endpoint; everything it
//! needs lives behind [`LeadIntakeService`] and the router in this module.

pub mod domain;
pub mod journal;
pub mod notify;
pub mod router;
pub mod sanitize;
pub mod service;
pub mod throttle;
pub mod validate;

pub use domain::{
    IntakeRejection, JournalEntry, Lead, LeadForm, NotificationOutcome, SubmissionReceipt,
};
pub use journal::{FileJournal, JournalError, SubmissionJournal};
pub use notify::email::{EmailRecipient, MailError, Mailer, OutboundEmail, SmtpMailer};
pub use notify::push::{PushAlert, PushError, PushGateway, PushoverGateway};
pub use notify::NotificationDispatcher;
pub use router::intake_router;
pub use sanitize::{sanitize_text, Sanitize};
pub use service::LeadIntakeService;
pub use throttle::SubmissionThrottle;
pub use validate::{validate_form_token, IntakeGuard};
