use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::domain::JournalEntry;

const JOURNAL_FILE: &str = "submissions.jsonl";

/// Errors from the audit-trail sink. Callers log and swallow these; a failed
/// append never changes the HTTP outcome seen by the submitter.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("journal io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("journal encoding failure: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Durable append-only sink for accepted submissions.
///
/// Append is the only operation; no read or update path exists in this
/// system. Implementations must not reorder or coalesce entries.
pub trait SubmissionJournal: Send + Sync {
    fn append(&self, entry: &JournalEntry) -> Result<(), JournalError>;
}

/// File-backed journal writing one JSON document per line.
pub struct FileJournal {
    path: PathBuf,
}

impl FileJournal {
    /// Create the journal directory if needed and bind the journal file.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self, JournalError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        Ok(Self {
            path: dir.join(JOURNAL_FILE),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SubmissionJournal for FileJournal {
    fn append(&self, entry: &JournalEntry) -> Result<(), JournalError> {
        let line = serde_json::to_string(entry)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::domain::Lead;
    use chrono::Utc;

    fn lead(prenom: &str) -> Lead {
        Lead {
            type_projet: "creation_laverie".to_string(),
            budget: "80k_120k".to_string(),
            emplacement_disponible: "non".to_string(),
            type_emplacement: String::new(),
            ville_emplacement: String::new(),
            timing: "moins_3_mois".to_string(),
            surface: "40-60m2".to_string(),
            prenom: prenom.to_string(),
            nom: "Dupont".to_string(),
            telephone: "0612345678".to_string(),
            email: "marie@example.fr".to_string(),
            newsletter_optin: "yes".to_string(),
            rgpd_consent: "yes".to_string(),
        }
    }

    #[test]
    fn appends_one_parseable_line_per_entry() {
        let dir = tempfile::tempdir().expect("temp dir");
        let journal = FileJournal::create(dir.path()).expect("journal created");

        for prenom in ["Marie", "Paul"] {
            journal
                .append(&JournalEntry {
                    received_at: Utc::now(),
                    client_id: "203.0.113.7".to_string(),
                    lead: lead(prenom),
                })
                .expect("append succeeds");
        }

        let raw = std::fs::read_to_string(journal.path()).expect("journal readable");
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: JournalEntry = serde_json::from_str(lines[0]).expect("first entry parses");
        let second: JournalEntry = serde_json::from_str(lines[1]).expect("second entry parses");
        assert_eq!(first.lead.prenom, "Marie");
        assert_eq!(second.lead.prenom, "Paul");
    }

    #[test]
    fn create_builds_missing_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let nested = dir.path().join("var").join("logs");
        let journal = FileJournal::create(&nested).expect("nested dir created");
        assert!(nested.is_dir());
        assert_eq!(journal.path(), nested.join(JOURNAL_FILE));
    }
}
