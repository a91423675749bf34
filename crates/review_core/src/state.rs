use crate::target::export_name_for;
use crate::view_model::{PhaseView, ReviewViewModel};
use crate::{
    assemble, changes_count, reconcile, Choice, EditMode, EditOutcome, EditTarget, Effect,
    ErrorKind, ExportFooter, Progress, SelectionStore, SummaryHeader, Viewport, VirtualList,
};

/// Monotonic counter distinguishing submissions made from one view.
pub type SubmissionId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReviewPhase {
    #[default]
    Idle,
    /// Waiting for the backend to accept the task.
    Submitting,
    Polling {
        task_id: String,
    },
    /// A result is loaded and open for review.
    Ready,
    Failed {
        kind: ErrorKind,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReviewState {
    mode: EditMode,
    article_title: String,
    section_title: String,
    content: String,
    phase: ReviewPhase,
    last_submission: SubmissionId,
    pending_submission: Option<SubmissionId>,
    submitted_target: Option<EditTarget>,
    progress: Option<Progress>,
    result: Option<EditOutcome>,
    selections: SelectionStore,
    list: VirtualList,
    viewport: Viewport,
    inline_error: Option<String>,
    copied: bool,
    dirty: bool,
}

impl ReviewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> ReviewViewModel {
        let phase = match &self.phase {
            ReviewPhase::Idle => PhaseView::Idle,
            ReviewPhase::Submitting => PhaseView::Submitting,
            ReviewPhase::Polling { task_id } => PhaseView::Polling {
                task_id: task_id.clone(),
            },
            ReviewPhase::Ready => PhaseView::Ready,
            ReviewPhase::Failed { kind, .. } => PhaseView::Failed { kind: *kind },
        };
        let error_banner = match &self.phase {
            ReviewPhase::Failed { message, .. } => Some(message.clone()),
            _ => None,
        };
        ReviewViewModel {
            mode: self.mode,
            phase,
            progress: self.progress.as_ref().map(Progress::summary),
            inline_error: self.inline_error.clone(),
            error_banner,
            changed_count: self.selections.changed_count(),
            accepted_count: self.selections.accepted_count(),
            all_selections_made: self.result.is_some() && self.selections.all_selections_made(),
            can_export: self.can_export(),
            copied: self.copied,
            list_len: self.list.len(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn article_title(&self) -> &str {
        &self.article_title
    }

    pub fn section_title(&self) -> &str {
        &self.section_title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn phase(&self) -> &ReviewPhase {
        &self.phase
    }

    pub fn progress(&self) -> Option<&Progress> {
        self.progress.as_ref()
    }

    pub fn result(&self) -> Option<&EditOutcome> {
        self.result.as_ref()
    }

    pub fn selections(&self) -> &SelectionStore {
        &self.selections
    }

    pub fn list(&self) -> &VirtualList {
        &self.list
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn copied(&self) -> bool {
        self.copied
    }

    /// Task currently being polled, if any.
    pub fn active_task(&self) -> Option<&str> {
        match &self.phase {
            ReviewPhase::Polling { task_id } => Some(task_id),
            _ => None,
        }
    }

    /// Final text for the current selections, once a result is loaded.
    pub fn assembled_text(&self) -> Option<String> {
        self.result
            .as_ref()
            .map(|outcome| assemble(&outcome.paragraphs, &self.selections))
    }

    pub fn can_export(&self) -> bool {
        self.phase == ReviewPhase::Ready
            && self.result.is_some()
            && self.selections.all_selections_made()
    }

    /// File name offered for export, preferring the result's provenance.
    pub fn suggested_export_name(&self) -> String {
        if let Some(outcome) = &self.result {
            if outcome.article_title.is_some() {
                return export_name_for(
                    outcome.article_title.as_deref(),
                    outcome.section_title.as_deref(),
                );
            }
        }
        match &self.submitted_target {
            Some(target) => target.suggested_export_name(),
            None => export_name_for(None, None),
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_mode(&mut self, mode: EditMode) {
        self.mode = mode;
        self.mark_dirty();
    }

    pub(crate) fn set_article_title(&mut self, value: String) {
        self.article_title = value;
        self.inline_error = None;
        self.mark_dirty();
    }

    pub(crate) fn set_section_title(&mut self, value: String) {
        self.section_title = value;
        self.inline_error = None;
        self.mark_dirty();
    }

    pub(crate) fn set_content(&mut self, value: String) {
        self.content = value;
        self.inline_error = None;
        self.mark_dirty();
    }

    pub(crate) fn set_inline_error(&mut self, message: String) {
        self.inline_error = Some(message);
        self.mark_dirty();
    }

    /// Stops tracking any in-flight work. A pending submission is forgotten so
    /// its late acceptance is treated as stale.
    pub(crate) fn cancel_active_poll(&mut self) -> Vec<Effect> {
        let effects = match std::mem::take(&mut self.phase) {
            ReviewPhase::Polling { task_id } => vec![Effect::CancelPolling { task_id }],
            ReviewPhase::Submitting => Vec::new(),
            other => {
                self.phase = other;
                return Vec::new();
            }
        };
        self.pending_submission = None;
        self.mark_dirty();
        effects
    }

    pub(crate) fn reset_results(&mut self) {
        self.progress = None;
        self.result = None;
        self.selections.clear();
        self.list.clear();
        self.viewport.top = 0;
        self.copied = false;
        if matches!(self.phase, ReviewPhase::Ready | ReviewPhase::Failed { .. }) {
            self.phase = ReviewPhase::Idle;
        }
        self.mark_dirty();
    }

    pub(crate) fn begin_submission(&mut self, target: EditTarget) -> Effect {
        self.last_submission += 1;
        let submission = self.last_submission;
        self.pending_submission = Some(submission);
        self.submitted_target = Some(target.clone());
        self.inline_error = None;
        self.phase = ReviewPhase::Submitting;
        self.mark_dirty();
        Effect::SubmitTask {
            submission,
            mode: self.mode,
            target,
        }
    }

    /// Moves to polling when `submission` is the one being waited on.
    pub(crate) fn accept_task(&mut self, submission: SubmissionId, task_id: String) -> bool {
        if self.pending_submission != Some(submission) || self.phase != ReviewPhase::Submitting {
            return false;
        }
        self.pending_submission = None;
        self.phase = ReviewPhase::Polling { task_id };
        self.mark_dirty();
        true
    }

    pub(crate) fn is_pending_submission(&self, submission: SubmissionId) -> bool {
        self.pending_submission == Some(submission)
    }

    pub(crate) fn is_polling(&self, task_id: &str) -> bool {
        self.active_task() == Some(task_id)
    }

    pub(crate) fn apply_progress(&mut self, progress: Progress) {
        if self.progress.as_ref() != Some(&progress) {
            self.progress = Some(progress);
            self.mark_dirty();
        }
    }

    pub(crate) fn fail(&mut self, kind: ErrorKind, detail: &str) {
        self.pending_submission = None;
        self.progress = None;
        self.phase = ReviewPhase::Failed {
            kind,
            message: kind.user_message(detail),
        };
        self.mark_dirty();
    }

    pub(crate) fn load_result(&mut self, outcome: EditOutcome) {
        let header = SummaryHeader {
            mode: self.mode,
            article_title: outcome.article_title.clone(),
            section_title: outcome.section_title.clone(),
            article_url: outcome.article_url.clone(),
            total_paragraphs: outcome.paragraphs.len(),
            changed_count: changes_count(&outcome.paragraphs),
        };
        self.selections = SelectionStore::seeded(&outcome.paragraphs);
        self.list
            .set_content(Some(header), reconcile(&outcome.paragraphs));
        self.result = Some(outcome);
        self.progress = None;
        self.copied = false;
        self.viewport.top = 0;
        self.phase = ReviewPhase::Ready;
        self.refresh_footer();
        self.mark_dirty();
    }

    pub(crate) fn select(&mut self, index: usize, choice: Choice) -> bool {
        if self.result.is_none() || !self.selections.is_changed_index(index) {
            return false;
        }
        if self.selections.get(index) != Some(choice) {
            self.selections.set(index, choice);
            self.copied = false;
            self.refresh_footer();
            self.mark_dirty();
        }
        true
    }

    pub(crate) fn select_all(&mut self, choice: Choice) {
        if self.result.is_none() {
            return;
        }
        self.selections.set_all(choice);
        self.copied = false;
        self.refresh_footer();
        self.mark_dirty();
    }

    pub(crate) fn set_viewport(&mut self, top: u32, height: u32) {
        if self.viewport.top != top || self.viewport.height != height {
            self.viewport.top = top;
            self.viewport.height = height;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_copied(&mut self, copied: bool) {
        if self.copied != copied {
            self.copied = copied;
            self.mark_dirty();
        }
    }

    fn refresh_footer(&mut self) {
        let footer = (self.result.is_some() && self.selections.all_selections_made()).then(|| {
            ExportFooter {
                changed_count: self.selections.changed_count(),
                accepted_count: self.selections.accepted_count(),
            }
        });
        self.list.set_footer(footer);
    }
}
