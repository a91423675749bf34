use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::ParagraphStatus;

/// Processing stage of a single paragraph, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Pending,
    PreProcessing,
    LlmProcessing,
    PostProcessing,
    Complete,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Pending,
        Phase::PreProcessing,
        Phase::LlmProcessing,
        Phase::PostProcessing,
        Phase::Complete,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Phase::Pending => "Waiting",
            Phase::PreProcessing => "Preparing",
            Phase::LlmProcessing => "Editing",
            Phase::PostProcessing => "Validating",
            Phase::Complete => "Done",
        }
    }
}

/// Progress of one paragraph as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphProgress {
    pub index: usize,
    pub phase: Phase,
    #[serde(default)]
    pub content_preview: String,
    #[serde(default)]
    pub status: Option<ParagraphStatus>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Transient progress snapshot. Each poll response supersedes the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Progress {
    #[serde(default)]
    pub total_paragraphs: u32,
    #[serde(default)]
    pub progress_percentage: u32,
    #[serde(default)]
    pub phase_counts: BTreeMap<Phase, u32>,
    #[serde(default)]
    pub paragraphs: Vec<ParagraphProgress>,
}

/// Condensed view of a [`Progress`] snapshot for status lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSummary {
    pub completed: u32,
    pub total: u32,
    pub percentage: u8,
    /// Most advanced phase that still has paragraphs in it, or `Complete`
    /// once everything is done.
    pub active_phase: Phase,
}

impl Progress {
    pub fn count(&self, phase: Phase) -> u32 {
        self.phase_counts.get(&phase).copied().unwrap_or(0)
    }

    pub fn summary(&self) -> ProgressSummary {
        let completed = self.count(Phase::Complete);
        let active_phase = Phase::ALL[..Phase::ALL.len() - 1]
            .iter()
            .rev()
            .copied()
            .find(|phase| self.count(*phase) > 0)
            .unwrap_or(if self.total_paragraphs > 0 && completed >= self.total_paragraphs {
                Phase::Complete
            } else {
                Phase::Pending
            });
        ProgressSummary {
            completed,
            total: self.total_paragraphs,
            percentage: self.progress_percentage.min(100) as u8,
            active_phase,
        }
    }
}

impl ProgressSummary {
    pub fn label(&self) -> String {
        format!(
            "{}: {} of {} paragraphs complete ({}%)",
            self.active_phase.label(),
            self.completed,
            self.total,
            self.percentage
        )
    }
}

// Timestamps arrive as naive ISO strings with a `Z` suffix; anything that does
// not parse is treated as absent rather than failing the whole snapshot.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| {
        DateTime::parse_from_rfc3339(value.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }))
}
