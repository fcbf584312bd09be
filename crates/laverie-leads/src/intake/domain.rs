use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw untrusted form fields as posted by the marketing-site wizard.
///
/// Every value arrives as free-form text; absent fields deserialize to the
/// empty string so the required-field check can name them. The two checkbox
/// fields (`newsletter_optin`, `rgpd_consent`) carry browser
/// presence/absence semantics and are folded to `"yes"`/`"no"` during
/// sanitization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadForm {
    #[serde(default)]
    pub type_projet: String,
    #[serde(default)]
    pub budget: String,
    #[serde(default)]
    pub emplacement_disponible: String,
    #[serde(default)]
    pub type_emplacement: String,
    #[serde(default)]
    pub ville_emplacement: String,
    #[serde(default)]
    pub timing: String,
    #[serde(default)]
    pub surface: String,
    #[serde(default)]
    pub prenom: String,
    #[serde(default)]
    pub nom: String,
    #[serde(default)]
    pub telephone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub newsletter_optin: Option<String>,
    #[serde(default)]
    pub rgpd_consent: Option<String>,
    #[serde(default)]
    pub csrf_token: String,
}

/// Sanitized, validated lead. The only representation handed to the journal
/// and the notification dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub type_projet: String,
    pub budget: String,
    pub emplacement_disponible: String,
    pub type_emplacement: String,
    pub ville_emplacement: String,
    pub timing: String,
    pub surface: String,
    pub prenom: String,
    pub nom: String,
    pub telephone: String,
    pub email: String,
    pub newsletter_optin: String,
    pub rgpd_consent: String,
}

impl Lead {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.prenom, self.nom)
    }

    /// The wizard collects site type and city only behind this flag.
    pub fn site_declared(&self) -> bool {
        self.emplacement_disponible == "oui"
    }

    pub fn newsletter_opted_in(&self) -> bool {
        self.newsletter_optin == "yes"
    }

    /// Field lookup by wire name, used by the declared requirement table.
    pub(crate) fn field(&self, name: &str) -> &str {
        match name {
            "type_projet" => &self.type_projet,
            "budget" => &self.budget,
            "emplacement_disponible" => &self.emplacement_disponible,
            "type_emplacement" => &self.type_emplacement,
            "ville_emplacement" => &self.ville_emplacement,
            "timing" => &self.timing,
            "surface" => &self.surface,
            "prenom" => &self.prenom,
            "nom" => &self.nom,
            "telephone" => &self.telephone,
            "email" => &self.email,
            "newsletter_optin" => &self.newsletter_optin,
            "rgpd_consent" => &self.rgpd_consent,
            _ => "",
        }
    }
}

/// Append-only audit record written for every accepted submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub received_at: DateTime<Utc>,
    pub client_id: String,
    pub lead: Lead,
}

/// Per-channel result of the best-effort notification fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NotificationOutcome {
    pub internal_email_sent: bool,
    pub confirmation_email_sent: bool,
    pub push_sent: bool,
}

/// Returned to the HTTP layer once a submission has been accepted.
#[derive(Debug, Clone)]
pub struct SubmissionReceipt {
    pub message: String,
    pub outcome: NotificationOutcome,
}

/// Why a submission was refused. Messages are the user-facing French
/// strings rendered into the JSON error envelope.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeRejection {
    #[error("Trop de demandes. Veuillez réessayer plus tard.")]
    RateLimited,
    #[error("Token de sécurité invalide")]
    InvalidToken,
    #[error("Champ requis manquant: {0}")]
    MissingField(String),
    #[error("Email invalide")]
    InvalidEmail,
    #[error("Numéro de téléphone invalide")]
    InvalidPhone,
    #[error("Consentement RGPD requis")]
    ConsentRequired,
    #[error("Invalid request")]
    MalformedRequest,
    #[error("Une erreur est survenue. Veuillez réessayer.")]
    Internal,
}
