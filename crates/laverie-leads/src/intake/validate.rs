use std::sync::OnceLock;

use regex::Regex;

use super::domain::{IntakeRejection, Lead, LeadForm};
use super::sanitize::Sanitize;

/// Minimum accepted length for the wizard's anti-automation token.
///
/// The token is deliberately weak bot deterrence with no session binding;
/// strengthening it is a product decision, not a code fix.
const MIN_TOKEN_LENGTH: usize = 20;

const REQUIRED_FIELDS: [&str; 9] = [
    "type_projet",
    "budget",
    "emplacement_disponible",
    "timing",
    "surface",
    "prenom",
    "nom",
    "telephone",
    "email",
];

/// Fields the wizard requires only when a discriminant field holds a given
/// value. `enforced` mirrors the backend's behavior: the site-type and city
/// fields are checked client-side by the wizard but deliberately NOT
/// re-checked here, so a direct poster may omit them. Tightening this would
/// change observable behavior.
struct ConditionalRule {
    discriminant: &'static str,
    when_value: &'static str,
    fields: &'static [&'static str],
    enforced: bool,
}

const CONDITIONAL_RULES: [ConditionalRule; 1] = [ConditionalRule {
    discriminant: "emplacement_disponible",
    when_value: "oui",
    fields: &["type_emplacement", "ville_emplacement"],
    enforced: false,
}];

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"))
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:(?:\+|00)33|0)\s*[1-9](?:[\s.-]*\d{2}){4}$").expect("phone pattern compiles")
    })
}

/// Accept any token of sufficient length.
pub fn validate_form_token(token: &str) -> Result<(), IntakeRejection> {
    if token.len() < MIN_TOKEN_LENGTH {
        return Err(IntakeRejection::InvalidToken);
    }
    Ok(())
}

/// Turns raw wizard input into a validated [`Lead`].
///
/// Sanitization is applied to every field first, then checks run in a fixed
/// order and the first failure wins.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard;

impl IntakeGuard {
    pub fn new() -> Self {
        Self
    }

    pub fn lead_from_form(&self, form: LeadForm) -> Result<Lead, IntakeRejection> {
        let lead = sanitized_lead(form);

        for name in REQUIRED_FIELDS {
            if lead.field(name).is_empty() {
                return Err(IntakeRejection::MissingField(name.to_string()));
            }
        }

        for rule in &CONDITIONAL_RULES {
            if !rule.enforced || lead.field(rule.discriminant) != rule.when_value {
                continue;
            }
            for name in rule.fields {
                if lead.field(name).is_empty() {
                    return Err(IntakeRejection::MissingField(name.to_string()));
                }
            }
        }

        if !email_pattern().is_match(&lead.email) {
            return Err(IntakeRejection::InvalidEmail);
        }

        if !phone_pattern().is_match(&lead.telephone) {
            return Err(IntakeRejection::InvalidPhone);
        }

        if lead.rgpd_consent != "yes" {
            return Err(IntakeRejection::ConsentRequired);
        }

        Ok(lead)
    }
}

/// Sanitize every text field and fold the checkbox fields to `"yes"`/`"no"`.
fn sanitized_lead(form: LeadForm) -> Lead {
    Lead {
        type_projet: form.type_projet.sanitize(),
        budget: form.budget.sanitize(),
        emplacement_disponible: form.emplacement_disponible.sanitize(),
        type_emplacement: form.type_emplacement.sanitize(),
        ville_emplacement: form.ville_emplacement.sanitize(),
        timing: form.timing.sanitize(),
        surface: form.surface.sanitize(),
        prenom: form.prenom.sanitize(),
        nom: form.nom.sanitize(),
        telephone: form.telephone.sanitize(),
        email: form.email.sanitize(),
        newsletter_optin: checkbox_value(form.newsletter_optin.as_deref()),
        rgpd_consent: checkbox_value(form.rgpd_consent.as_deref()),
    }
}

fn checkbox_value(raw: Option<&str>) -> String {
    if raw.is_some() { "yes" } else { "no" }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> LeadForm {
        LeadForm {
            type_projet: "creation_laverie".to_string(),
            budget: "80k_120k".to_string(),
            emplacement_disponible: "non".to_string(),
            type_emplacement: String::new(),
            ville_emplacement: String::new(),
            timing: "moins_3_mois".to_string(),
            surface: "40-60m2".to_string(),
            prenom: "Marie".to_string(),
            nom: "Dupont".to_string(),
            telephone: "0612345678".to_string(),
            email: "marie.dupont@example.fr".to_string(),
            newsletter_optin: Some("on".to_string()),
            rgpd_consent: Some("on".to_string()),
            csrf_token: "0123456789abcdef0123".to_string(),
        }
    }

    #[test]
    fn accepts_a_complete_submission() {
        let lead = IntakeGuard::new()
            .lead_from_form(valid_form())
            .expect("valid form passes");
        assert_eq!(lead.newsletter_optin, "yes");
        assert_eq!(lead.rgpd_consent, "yes");
        assert!(!lead.site_declared());
    }

    #[test]
    fn missing_required_field_is_named() {
        let mut form = valid_form();
        form.budget = String::new();
        let error = IntakeGuard::new().lead_from_form(form).expect_err("budget required");
        assert_eq!(error, IntakeRejection::MissingField("budget".to_string()));
        assert_eq!(error.to_string(), "Champ requis manquant: budget");
    }

    #[test]
    fn whitespace_only_field_counts_as_missing() {
        let mut form = valid_form();
        form.prenom = "   ".to_string();
        let error = IntakeGuard::new().lead_from_form(form).expect_err("prenom required");
        assert_eq!(error, IntakeRejection::MissingField("prenom".to_string()));
    }

    #[test]
    fn site_fields_stay_optional_even_when_site_declared() {
        let mut form = valid_form();
        form.emplacement_disponible = "oui".to_string();
        let lead = IntakeGuard::new()
            .lead_from_form(form)
            .expect("site fields are not enforced server-side");
        assert!(lead.site_declared());
        assert!(lead.type_emplacement.is_empty());
    }

    #[test]
    fn email_needs_a_dotted_domain() {
        for bad in ["foo@bar", "foo bar@example.fr", "foo@", "@example.fr", "plain"] {
            let mut form = valid_form();
            form.email = bad.to_string();
            let error = IntakeGuard::new().lead_from_form(form).expect_err(bad);
            assert_eq!(error, IntakeRejection::InvalidEmail, "{bad}");
        }

        let mut form = valid_form();
        form.email = "a@b.fr".to_string();
        assert!(IntakeGuard::new().lead_from_form(form).is_ok());
    }

    #[test]
    fn phone_must_match_french_format() {
        for good in [
            "0612345678",
            "+33 6 12 34 56 78",
            "0033 6 12 34 56 78",
            "06.12.34.56.78",
            "06-12-34-56-78",
        ] {
            let mut form = valid_form();
            form.telephone = good.to_string();
            assert!(IntakeGuard::new().lead_from_form(form).is_ok(), "{good}");
        }

        for bad in ["12345", "+1 555 123 4567", "0012345678", "0012 34 56 78 90"] {
            let mut form = valid_form();
            form.telephone = bad.to_string();
            let error = IntakeGuard::new().lead_from_form(form).expect_err(bad);
            assert_eq!(error, IntakeRejection::InvalidPhone, "{bad}");
        }
    }

    #[test]
    fn consent_checkbox_is_mandatory() {
        let mut form = valid_form();
        form.rgpd_consent = None;
        let error = IntakeGuard::new().lead_from_form(form).expect_err("consent required");
        assert_eq!(error, IntakeRejection::ConsentRequired);
    }

    #[test]
    fn fields_are_sanitized_before_checks() {
        let mut form = valid_form();
        form.prenom = "<script>alert(1)</script>Marie".to_string();
        let lead = IntakeGuard::new().lead_from_form(form).expect("still valid");
        assert_eq!(lead.prenom, "alert(1)Marie");
    }

    #[test]
    fn token_length_gate() {
        assert!(validate_form_token("0123456789abcdef0123").is_ok());
        assert_eq!(
            validate_form_token("short"),
            Err(IntakeRejection::InvalidToken)
        );
        assert_eq!(validate_form_token(""), Err(IntakeRejection::InvalidToken));
    }
}
