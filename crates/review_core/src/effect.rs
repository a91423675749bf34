use crate::{EditMode, EditTarget, SubmissionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Create a task on the backend and start polling it.
    SubmitTask {
        submission: SubmissionId,
        mode: EditMode,
        target: EditTarget,
    },
    /// Stop polling `task_id`; no further events for it are wanted.
    CancelPolling { task_id: String },
    CopyToClipboard { text: String },
    ExportText {
        text: String,
        suggested_name: String,
    },
}
