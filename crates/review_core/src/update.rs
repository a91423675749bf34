use crate::{EditTarget, Effect, Msg, ReviewPhase, ReviewState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: ReviewState, msg: Msg) -> (ReviewState, Vec<Effect>) {
    let effects = match msg {
        Msg::ModeChanged(mode) => {
            if mode == state.mode() {
                return (state, Vec::new());
            }
            let effects = state.cancel_active_poll();
            state.reset_results();
            state.set_mode(mode);
            effects
        }
        Msg::ArticleTitleChanged(value) => {
            state.set_article_title(value);
            Vec::new()
        }
        Msg::SectionTitleChanged(value) => {
            state.set_section_title(value);
            Vec::new()
        }
        Msg::ContentChanged(value) => {
            state.set_content(value);
            Vec::new()
        }
        Msg::SubmitClicked => {
            let target = match EditTarget::from_inputs(
                state.article_title(),
                state.section_title(),
                state.content(),
            ) {
                Ok(target) => target,
                Err(err) => {
                    state.set_inline_error(err.to_string());
                    return (state, Vec::new());
                }
            };
            let mut effects = state.cancel_active_poll();
            state.reset_results();
            effects.push(state.begin_submission(target));
            effects
        }
        Msg::TaskAccepted {
            submission,
            task_id,
        } => {
            if state.accept_task(submission, task_id.clone()) {
                Vec::new()
            } else {
                // Nobody is waiting for this task any more.
                vec![Effect::CancelPolling { task_id }]
            }
        }
        Msg::SubmissionFailed {
            submission,
            kind,
            message,
        } => {
            if state.is_pending_submission(submission) {
                state.fail(kind, &message);
            }
            Vec::new()
        }
        Msg::TaskProgress { task_id, progress } => {
            if state.is_polling(&task_id) {
                state.apply_progress(progress);
            }
            Vec::new()
        }
        Msg::TaskSucceeded { task_id, outcome } => {
            if state.is_polling(&task_id) {
                state.load_result(outcome);
            }
            Vec::new()
        }
        Msg::TaskFailed {
            task_id,
            kind,
            message,
        } => {
            if state.is_polling(&task_id) {
                state.fail(kind, &message);
            }
            Vec::new()
        }
        Msg::SelectionChanged { index, choice } => {
            state.select(index, choice);
            Vec::new()
        }
        Msg::SelectAll(choice) => {
            state.select_all(choice);
            Vec::new()
        }
        Msg::ViewportChanged { top, height } => {
            state.set_viewport(top, height);
            Vec::new()
        }
        Msg::CopyClicked => match state.assembled_text() {
            Some(text) if state.can_export() => vec![Effect::CopyToClipboard { text }],
            _ => Vec::new(),
        },
        Msg::CopyFinished { ok } => {
            if state.phase() == &ReviewPhase::Ready {
                state.set_copied(ok);
            }
            Vec::new()
        }
        Msg::ExportClicked => match state.assembled_text() {
            Some(text) if state.can_export() => vec![Effect::ExportText {
                text,
                suggested_name: state.suggested_export_name(),
            }],
            _ => Vec::new(),
        },
        Msg::ViewClosed => state.cancel_active_poll(),
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
