use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Outcome the backend assigned to a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParagraphStatus {
    Changed,
    Unchanged,
    Rejected,
    Skipped,
    Errored,
}

impl ParagraphStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ParagraphStatus::Changed => "CHANGED",
            ParagraphStatus::Unchanged => "UNCHANGED",
            ParagraphStatus::Rejected => "REJECTED",
            ParagraphStatus::Skipped => "SKIPPED",
            ParagraphStatus::Errored => "ERRORED",
        }
    }
}

impl fmt::Display for ParagraphStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParagraphStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CHANGED" => Ok(ParagraphStatus::Changed),
            "UNCHANGED" => Ok(ParagraphStatus::Unchanged),
            "REJECTED" => Ok(ParagraphStatus::Rejected),
            "SKIPPED" => Ok(ParagraphStatus::Skipped),
            "ERRORED" => Ok(ParagraphStatus::Errored),
            other => Err(format!("unknown paragraph status '{other}'")),
        }
    }
}

/// One unit of text with its original and edited form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub before: String,
    pub after: String,
    pub status: ParagraphStatus,
    #[serde(default)]
    pub status_details: String,
}

impl Paragraph {
    pub fn new(
        before: impl Into<String>,
        after: impl Into<String>,
        status: ParagraphStatus,
    ) -> Self {
        Self {
            before: before.into(),
            after: after.into(),
            status,
            status_details: String::new(),
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.status_details = details.into();
        self
    }

    pub fn is_changed(&self) -> bool {
        self.status == ParagraphStatus::Changed
    }
}

/// Number of paragraphs the reviewer has to decide on.
pub fn changes_count(paragraphs: &[Paragraph]) -> usize {
    paragraphs.iter().filter(|p| p.is_changed()).count()
}

/// Successful result of an edit task: the ordered paragraphs plus provenance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EditOutcome {
    pub paragraphs: Vec<Paragraph>,
    #[serde(default)]
    pub article_title: Option<String>,
    #[serde(default)]
    pub section_title: Option<String>,
    #[serde(default)]
    pub article_url: Option<String>,
}

impl EditOutcome {
    pub fn from_paragraphs(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            paragraphs,
            ..Self::default()
        }
    }
}
