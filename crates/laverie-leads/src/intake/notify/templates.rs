use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::intake::domain::Lead;

pub const INTERNAL_SUBJECT: &str = "Nouvelle demande de devis - Ma Petite Laverie";
pub const CONFIRMATION_SUBJECT: &str = "Demande de devis bien reçue - Ma Petite Laverie";
pub const PUSH_TITLE: &str = "Ma Petite Laverie - Lead";

const UNSPECIFIED: &str = "Non spécifié";

const INTERNAL_STYLE: &str = "\
body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; }\n\
.container { max-width: 600px; margin: 0 auto; padding: 20px; }\n\
.header { background: #0b5ed7; color: white; padding: 20px; text-align: center; }\n\
.content { background: #f9f9f9; padding: 20px; }\n\
.field { margin-bottom: 15px; padding: 10px; background: white; border-left: 4px solid #0b5ed7; }\n\
.label { font-weight: bold; color: #0b5ed7; display: block; margin-bottom: 5px; }\n\
.value { color: #333; }\n\
.footer { text-align: center; padding: 20px; color: #666; font-size: 12px; }\n\
.badge { display: inline-block; padding: 5px 10px; background: #FFD100; color: #333; border-radius: 4px; font-weight: bold; }";

const CONFIRMATION_STYLE: &str = "\
body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; }\n\
.container { max-width: 600px; margin: 0 auto; padding: 20px; }\n\
.header { background: #0b5ed7; color: white; padding: 30px; text-align: center; }\n\
.content { background: #f9f9f9; padding: 30px; }\n\
.button { display: inline-block; padding: 15px 30px; background: #FFD100; color: #333; text-decoration: none; border-radius: 5px; font-weight: bold; margin: 20px 0; }\n\
.footer { text-align: center; padding: 20px; color: #666; font-size: 12px; }";

/// Band values travel as snake_case identifiers; render them with spaces.
fn spaced(value: &str) -> String {
    value.replace('_', " ")
}

fn newsletter_indicator(lead: &Lead) -> &'static str {
    if lead.newsletter_opted_in() {
        "✅ Oui"
    } else {
        "❌ Non"
    }
}

fn field_block(out: &mut String, label: &str, value: &str) {
    let _ = write!(
        out,
        "<div class='field'><span class='label'>{label}</span><span class='value'>{value}</span></div>\n"
    );
}

fn or_unspecified(value: &str) -> &str {
    if value.is_empty() {
        UNSPECIFIED
    } else {
        value
    }
}

/// Operator-facing alert body. Fields are interpolated verbatim: the lead
/// was sanitized before validation, so no markup survives to this point.
pub(crate) fn internal_alert_html(
    lead: &Lead,
    client_id: &str,
    received_at: DateTime<Utc>,
) -> String {
    let mut fields = String::new();
    field_block(&mut fields, "Type de projet", &spaced(&lead.type_projet));
    let _ = write!(
        fields,
        "<div class='field'><span class='label'>Budget envisagé</span><span class='value'><span class='badge'>{}</span></span></div>\n",
        lead.budget.to_uppercase()
    );
    field_block(
        &mut fields,
        "Emplacement disponible",
        &lead.emplacement_disponible,
    );

    if lead.site_declared() {
        field_block(
            &mut fields,
            "Type d'emplacement",
            or_unspecified(&lead.type_emplacement),
        );
        field_block(
            &mut fields,
            "Ville / Département",
            or_unspecified(&lead.ville_emplacement),
        );
    }

    field_block(&mut fields, "Timing du projet", &spaced(&lead.timing));
    field_block(&mut fields, "Surface disponible", &lead.surface);

    let mut contact = String::new();
    field_block(&mut contact, "Nom complet", &lead.full_name());
    field_block(&mut contact, "📞 Téléphone", &lead.telephone);
    field_block(&mut contact, "📧 Email", &lead.email);
    field_block(&mut contact, "Newsletter opt-in", newsletter_indicator(lead));

    format!(
        "<html>\n<head><style>\n{INTERNAL_STYLE}\n</style></head>\n<body>\n\
<div class='container'>\n\
<div class='header'><h1>🎯 Nouvelle Demande de Devis</h1>\
<p>Une personne intéressée vient de remplir le formulaire</p></div>\n\
<div class='content'>\n<h2>📋 Détails du Projet</h2>\n{fields}\
<h2>👤 Coordonnées du Contact</h2>\n{contact}</div>\n\
<div class='footer'><p>Reçu le {received}</p><p>IP: {client_id}</p></div>\n\
</div>\n</body>\n</html>\n",
        received = received_at.format("%d/%m/%Y à %H:%M"),
    )
}

/// Fixed acknowledgment body sent to the submitter. Only the first name is
/// interpolated.
pub(crate) fn confirmation_html(lead: &Lead) -> String {
    format!(
        "<html>\n<head><style>\n{CONFIRMATION_STYLE}\n</style></head>\n<body>\n\
<div class='container'>\n\
<div class='header'><h1>✅ Demande bien reçue !</h1></div>\n\
<div class='content'>\n\
<p>Bonjour {prenom},</p>\n\
<p><strong>Merci pour votre confiance !</strong></p>\n\
<p>Nous avons bien reçu votre demande de devis pour un projet de laverie automatique.</p>\n\
<p>Un expert Ma Petite Laverie va analyser votre demande et vous contactera dans les <strong>24 heures ouvrées</strong> pour :</p>\n\
<ul>\n\
<li>Échanger sur votre projet en détail</li>\n\
<li>Vous proposer une solution personnalisée</li>\n\
<li>Répondre à toutes vos questions</li>\n\
</ul>\n\
<p style='text-align: center;'><a href='tel:0240316600' class='button'>📞 Nous joindre : 02 40 31 66 00</a></p>\n\
<p><strong>Pourquoi choisir Ma Petite Laverie ?</strong></p>\n\
<ul>\n\
<li>✓ 30 ans d'expérience dans le secteur</li>\n\
<li>✓ Fabrication 100% française</li>\n\
<li>✓ SAV d'excellence et accompagnement personnalisé</li>\n\
<li>✓ 15 laveries exploitées en propre</li>\n\
</ul>\n\
<p>À très bientôt,<br><strong>L'équipe Ma Petite Laverie</strong></p>\n\
</div>\n\
<div class='footer'><p><strong>INNOPRESS</strong><br>\
7 Rue de l'Industrie, 44310 Saint Philbert de Grand Lieu<br>\
📞 02 40 31 66 00 | ✉️ direction@mapetitelaverie.fr</p></div>\n\
</div>\n</body>\n</html>\n",
        prenom = lead.prenom,
    )
}

/// Plain-text push alert mirroring the internal email's field layout.
pub(crate) fn push_message(lead: &Lead) -> String {
    let mut message = format!(
        "🎯 Nouvelle demande de devis\n\n\
👤 {name}\n📞 {phone}\n📧 {email}\n\n\
📋 PROJET\n\
• Type: {project}\n\
• Budget: {budget}\n\
• Timing: {timing}\n\
• Surface: {surface}\n\n\
📍 EMPLACEMENT\n\
• Disponible: {site}\n",
        name = lead.full_name(),
        phone = lead.telephone,
        email = lead.email,
        project = spaced(&lead.type_projet),
        budget = lead.budget.to_uppercase(),
        timing = spaced(&lead.timing),
        surface = lead.surface,
        site = lead.emplacement_disponible,
    );

    if lead.site_declared() {
        let _ = write!(
            message,
            "• Type: {}\n• Ville: {}\n",
            or_unspecified(&lead.type_emplacement),
            or_unspecified(&lead.ville_emplacement),
        );
    }

    let _ = write!(message, "\n📰 Newsletter: {}", newsletter_indicator(lead));
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead() -> Lead {
        Lead {
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
            email: "marie@example.fr".to_string(),
            newsletter_optin: "yes".to_string(),
            rgpd_consent: "yes".to_string(),
        }
    }

    #[test]
    fn internal_alert_omits_site_block_when_undeclared() {
        let html = internal_alert_html(&lead(), "203.0.113.7", Utc::now());
        assert!(html.contains("creation laverie"));
        assert!(html.contains("80K_120K"));
        assert!(!html.contains("Type d'emplacement"));
        assert!(html.contains("IP: 203.0.113.7"));
    }

    #[test]
    fn internal_alert_renders_site_block_with_fallbacks() {
        let mut lead = lead();
        lead.emplacement_disponible = "oui".to_string();
        lead.ville_emplacement = "Nantes".to_string();
        let html = internal_alert_html(&lead, "203.0.113.7", Utc::now());
        assert!(html.contains("Type d'emplacement"));
        assert!(html.contains("Non spécifié"));
        assert!(html.contains("Nantes"));
    }

    #[test]
    fn newsletter_indicator_tracks_opt_in() {
        let mut lead = lead();
        assert!(internal_alert_html(&lead, "x", Utc::now()).contains("✅ Oui"));
        lead.newsletter_optin = "no".to_string();
        assert!(internal_alert_html(&lead, "x", Utc::now()).contains("❌ Non"));
    }

    #[test]
    fn confirmation_greets_by_first_name_without_site_fields() {
        let html = confirmation_html(&lead());
        assert!(html.contains("Bonjour Marie,"));
        assert!(html.contains("Demande bien reçue"));
        assert!(!html.contains("Type d'emplacement"));
        assert!(!html.contains("Ville / Département"));
    }

    #[test]
    fn push_message_layout() {
        let message = push_message(&lead());
        assert!(message.starts_with("🎯 Nouvelle demande de devis"));
        assert!(message.contains("👤 Marie Dupont"));
        assert!(message.contains("• Budget: 80K_120K"));
        assert!(message.contains("• Disponible: non"));
        assert!(!message.contains("• Ville:"));
        assert!(message.ends_with("📰 Newsletter: ✅ Oui"));
    }

    #[test]
    fn push_message_includes_site_lines_when_declared() {
        let mut lead = lead();
        lead.emplacement_disponible = "oui".to_string();
        lead.type_emplacement = "local_commercial".to_string();
        let message = push_message(&lead);
        assert!(message.contains("• Type: local_commercial"));
        assert!(message.contains("• Ville: Non spécifié"));
    }
}
