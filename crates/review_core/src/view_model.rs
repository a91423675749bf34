use crate::{EditMode, ErrorKind, ProgressSummary};

/// Coarse phase for rendering; the failure message lives in `error_banner`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PhaseView {
    #[default]
    Idle,
    Submitting,
    Polling {
        task_id: String,
    },
    Ready,
    Failed {
        kind: ErrorKind,
    },
}

impl PhaseView {
    pub fn is_busy(&self) -> bool {
        matches!(self, PhaseView::Submitting | PhaseView::Polling { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReviewViewModel {
    pub mode: EditMode,
    pub phase: PhaseView,
    pub progress: Option<ProgressSummary>,
    /// Input validation message shown next to the form.
    pub inline_error: Option<String>,
    pub error_banner: Option<String>,
    pub changed_count: usize,
    pub accepted_count: usize,
    pub all_selections_made: bool,
    pub can_export: bool,
    pub copied: bool,
    pub list_len: usize,
    pub dirty: bool,
}
