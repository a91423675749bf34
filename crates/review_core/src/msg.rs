use crate::{Choice, EditMode, EditOutcome, ErrorKind, Progress, SubmissionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User switched between brevity and copyedit.
    ModeChanged(EditMode),
    ArticleTitleChanged(String),
    SectionTitleChanged(String),
    ContentChanged(String),
    /// User asked to submit the current input.
    SubmitClicked,
    /// Backend accepted a submission and polling has started.
    TaskAccepted {
        submission: SubmissionId,
        task_id: String,
    },
    /// Submission never reached a task (bad credentials, transport, ...).
    SubmissionFailed {
        submission: SubmissionId,
        kind: ErrorKind,
        message: String,
    },
    /// Latest progress snapshot for a polled task.
    TaskProgress { task_id: String, progress: Progress },
    TaskSucceeded { task_id: String, outcome: EditOutcome },
    /// Polling ended without a result.
    TaskFailed {
        task_id: String,
        kind: ErrorKind,
        message: String,
    },
    /// Reviewer picked original or edited text for a paragraph.
    SelectionChanged { index: usize, choice: Choice },
    /// Bulk accept or reject of every edit.
    SelectAll(Choice),
    /// Host scrolled or resized the review list.
    ViewportChanged { top: u32, height: u32 },
    CopyClicked,
    /// Clipboard write finished; failures only leave `copied` unset.
    CopyFinished { ok: bool },
    ExportClicked,
    /// The review view is going away.
    ViewClosed,
    /// Fallback for placeholder wiring.
    NoOp,
}
