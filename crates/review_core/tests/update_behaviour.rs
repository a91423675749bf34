use std::collections::BTreeMap;
use std::sync::Once;

use pretty_assertions::assert_eq;
use review_core::{
    update, Choice, EditMode, EditOutcome, EditTarget, Effect, ErrorKind, ItemKey, Msg,
    Paragraph, ParagraphStatus, Phase, PhaseView, Progress, ReviewPhase, ReviewState,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(review_logging::initialize_for_tests);
}

fn apply(state: ReviewState, msgs: Vec<Msg>) -> (ReviewState, Vec<Effect>) {
    msgs.into_iter()
        .fold((state, Vec::new()), |(state, mut all), msg| {
            let (state, effects) = update(state, msg);
            all.extend(effects);
            (state, all)
        })
}

fn outcome() -> EditOutcome {
    EditOutcome {
        paragraphs: vec![
            Paragraph::new("Intro.", "Intro.", ParagraphStatus::Unchanged),
            Paragraph::new("Teh cat sat.", "The cat sat.", ParagraphStatus::Changed),
            Paragraph::new("Table row", "Table row", ParagraphStatus::Skipped),
            Paragraph::new("Its done.", "It's done.", ParagraphStatus::Changed),
        ],
        article_title: Some("Cats".to_string()),
        section_title: Some("History".to_string()),
        article_url: Some("https://en.wikipedia.org/wiki/Cats".to_string()),
    }
}

/// Submits a section target and has the backend accept it as `task_id`.
fn polling(task_id: &str) -> ReviewState {
    let (state, effects) = apply(
        ReviewState::new(),
        vec![
            Msg::ArticleTitleChanged("Cats".to_string()),
            Msg::SectionTitleChanged("History".to_string()),
            Msg::SubmitClicked,
        ],
    );
    let submission = match effects.as_slice() {
        [Effect::SubmitTask { submission, .. }] => *submission,
        other => panic!("unexpected effects: {other:?}"),
    };
    let (state, effects) = update(
        state,
        Msg::TaskAccepted {
            submission,
            task_id: task_id.to_string(),
        },
    );
    assert!(effects.is_empty());
    state
}

fn ready() -> ReviewState {
    let (state, _) = update(
        polling("t1"),
        Msg::TaskSucceeded {
            task_id: "t1".to_string(),
            outcome: outcome(),
        },
    );
    state
}

fn progress(completed: u32, total: u32) -> Progress {
    let mut phase_counts = BTreeMap::new();
    phase_counts.insert(Phase::Complete, completed);
    phase_counts.insert(Phase::LlmProcessing, total - completed);
    Progress {
        total_paragraphs: total,
        progress_percentage: completed * 100 / total,
        phase_counts,
        paragraphs: Vec::new(),
    }
}

#[test]
fn invalid_submit_sets_inline_error_without_effects() {
    init_logging();
    let (state, effects) = update(ReviewState::new(), Msg::SubmitClicked);

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(
        view.inline_error.as_deref(),
        Some("Enter an article title or paste content to edit.")
    );
    assert_eq!(view.phase, PhaseView::Idle);

    let (state, effects) = apply(
        state,
        vec![
            Msg::ArticleTitleChanged("Cats".to_string()),
            Msg::SubmitClicked,
        ],
    );
    assert!(effects.is_empty());
    assert_eq!(
        state.view().inline_error.as_deref(),
        Some("Section title is required.")
    );
}

#[test]
fn valid_submit_emits_submit_task() {
    init_logging();
    let (state, effects) = apply(
        ReviewState::new(),
        vec![
            Msg::ModeChanged(EditMode::Brevity),
            Msg::ContentChanged("Some long text.".to_string()),
            Msg::SubmitClicked,
        ],
    );

    assert_eq!(
        effects,
        vec![Effect::SubmitTask {
            submission: 1,
            mode: EditMode::Brevity,
            target: EditTarget::content("Some long text."),
        }]
    );
    assert_eq!(state.phase(), &ReviewPhase::Submitting);
    assert!(state.view().phase.is_busy());
}

#[test]
fn progress_for_active_task_is_recorded() {
    init_logging();
    let (state, effects) = update(
        polling("t1"),
        Msg::TaskProgress {
            task_id: "t1".to_string(),
            progress: progress(5, 10),
        },
    );

    assert!(effects.is_empty());
    let summary = state.view().progress.expect("progress summary");
    assert_eq!(
        summary.label(),
        "Editing: 5 of 10 paragraphs complete (50%)"
    );
}

#[test]
fn messages_for_other_tasks_are_ignored() {
    init_logging();
    let state = polling("t1");
    let (state, effects) = apply(
        state,
        vec![
            Msg::TaskProgress {
                task_id: "old".to_string(),
                progress: progress(1, 2),
            },
            Msg::TaskSucceeded {
                task_id: "old".to_string(),
                outcome: outcome(),
            },
            Msg::TaskFailed {
                task_id: "old".to_string(),
                kind: ErrorKind::TaskFailed,
                message: "boom".to_string(),
            },
        ],
    );

    assert!(effects.is_empty());
    assert_eq!(
        state.phase(),
        &ReviewPhase::Polling {
            task_id: "t1".to_string()
        }
    );
    assert!(state.progress().is_none());
    assert!(state.result().is_none());
}

#[test]
fn resubmitting_cancels_the_active_poll_and_clears_results() {
    init_logging();
    let (state, effects) = update(ready(), Msg::SubmitClicked);
    assert!(matches!(
        effects.as_slice(),
        [Effect::SubmitTask { submission: 2, .. }]
    ));
    assert!(state.result().is_none());
    assert!(state.selections().is_empty());
    assert!(state.list().is_empty());

    let (_, effects) = update(polling("t1"), Msg::SubmitClicked);
    assert_eq!(effects.len(), 2);
    assert_eq!(
        effects[0],
        Effect::CancelPolling {
            task_id: "t1".to_string()
        }
    );
    assert!(matches!(effects[1], Effect::SubmitTask { submission: 2, .. }));
}

#[test]
fn stale_acceptance_cancels_the_orphaned_task() {
    init_logging();
    let (state, effects) = apply(
        ReviewState::new(),
        vec![
            Msg::ContentChanged("text".to_string()),
            Msg::SubmitClicked,
            Msg::SubmitClicked,
        ],
    );
    assert_eq!(effects.len(), 2);

    let (state, effects) = update(
        state,
        Msg::TaskAccepted {
            submission: 1,
            task_id: "stale".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::CancelPolling {
            task_id: "stale".to_string()
        }]
    );
    assert_eq!(state.phase(), &ReviewPhase::Submitting);

    let (state, effects) = update(
        state,
        Msg::TaskAccepted {
            submission: 2,
            task_id: "fresh".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.active_task(), Some("fresh"));
}

#[test]
fn mode_change_cancels_poll_and_resets() {
    init_logging();
    let (state, effects) = update(polling("t9"), Msg::ModeChanged(EditMode::Brevity));
    assert_eq!(
        effects,
        vec![Effect::CancelPolling {
            task_id: "t9".to_string()
        }]
    );
    assert_eq!(state.phase(), &ReviewPhase::Idle);
    assert_eq!(state.mode(), EditMode::Brevity);

    let (state, effects) = update(ready(), Msg::ModeChanged(EditMode::Brevity));
    assert!(effects.is_empty());
    assert!(state.result().is_none());

    let mut state = state;
    state.consume_dirty();
    let (mut state, effects) = update(state, Msg::ModeChanged(EditMode::Brevity));
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
}

#[test]
fn success_seeds_selections_and_builds_list() {
    init_logging();
    let mut state = ready();

    assert_eq!(state.phase(), &ReviewPhase::Ready);
    let view = state.view();
    assert_eq!(view.changed_count, 2);
    assert_eq!(view.accepted_count, 0);
    assert!(view.all_selections_made);
    assert!(view.can_export);
    assert_eq!(state.selections().get(1), Some(Choice::Before));
    assert_eq!(state.selections().get(3), Some(Choice::Before));

    let keys: Vec<_> = (0..state.list().len())
        .filter_map(|i| state.list().key(i))
        .collect();
    assert_eq!(
        keys,
        vec![
            ItemKey::Header,
            ItemKey::Paragraph(0),
            ItemKey::Paragraph(1),
            ItemKey::Paragraph(2),
            ItemKey::Paragraph(3),
            ItemKey::Footer,
        ]
    );
    assert!(state.consume_dirty());
    assert!(!state.consume_dirty());
}

#[test]
fn selection_only_applies_to_changed_paragraphs() {
    init_logging();
    let (state, _) = apply(
        ready(),
        vec![
            Msg::SelectionChanged {
                index: 1,
                choice: Choice::After,
            },
            Msg::SelectionChanged {
                index: 2,
                choice: Choice::After,
            },
        ],
    );

    assert_eq!(state.selections().get(1), Some(Choice::After));
    assert_eq!(state.selections().get(2), None);
    assert_eq!(
        state.assembled_text().as_deref(),
        Some("Intro.\n\nThe cat sat.\n\nTable row\n\nIts done.")
    );
    assert_eq!(state.view().accepted_count, 1);
}

#[test]
fn select_all_accepts_every_edit() {
    init_logging();
    let (state, _) = update(ready(), Msg::SelectAll(Choice::After));
    assert_eq!(
        state.assembled_text().as_deref(),
        Some("Intro.\n\nThe cat sat.\n\nTable row\n\nIt's done.")
    );

    let (state, _) = update(state, Msg::SelectAll(Choice::Before));
    assert_eq!(state.view().accepted_count, 0);
}

#[test]
fn copy_flow_sets_and_resets_copied() {
    init_logging();
    let (state, effects) = update(ready(), Msg::CopyClicked);
    assert_eq!(
        effects,
        vec![Effect::CopyToClipboard {
            text: "Intro.\n\nTeh cat sat.\n\nTable row\n\nIts done.".to_string()
        }]
    );

    let (state, _) = update(state, Msg::CopyFinished { ok: false });
    assert!(!state.view().copied);
    assert!(state.view().error_banner.is_none());

    let (state, _) = update(state, Msg::CopyFinished { ok: true });
    assert!(state.view().copied);

    let (state, _) = update(
        state,
        Msg::SelectionChanged {
            index: 3,
            choice: Choice::After,
        },
    );
    assert!(!state.view().copied);
}

#[test]
fn export_uses_provenance_for_the_file_name() {
    init_logging();
    let (_, effects) = update(ready(), Msg::ExportClicked);
    assert_eq!(
        effects,
        vec![Effect::ExportText {
            text: "Intro.\n\nTeh cat sat.\n\nTable row\n\nIts done.".to_string(),
            suggested_name: "Cats--History.txt".to_string(),
        }]
    );
}

#[test]
fn copy_and_export_need_a_result() {
    init_logging();
    let (_, effects) = apply(
        polling("t1"),
        vec![Msg::CopyClicked, Msg::ExportClicked],
    );
    assert!(effects.is_empty());
}

#[test]
fn task_failure_shows_backend_message() {
    init_logging();
    let (state, _) = update(
        polling("t1"),
        Msg::TaskFailed {
            task_id: "t1".to_string(),
            kind: ErrorKind::TaskFailed,
            message: "Section 'Foo' not found".to_string(),
        },
    );

    let view = state.view();
    assert_eq!(
        view.phase,
        PhaseView::Failed {
            kind: ErrorKind::TaskFailed
        }
    );
    assert_eq!(view.error_banner.as_deref(), Some("Section 'Foo' not found"));
}

#[test]
fn timeout_message_is_distinct_from_task_failure() {
    init_logging();
    let (state, _) = update(
        polling("t1"),
        Msg::TaskFailed {
            task_id: "t1".to_string(),
            kind: ErrorKind::TimedOut,
            message: "gave up after 200 attempts".to_string(),
        },
    );
    assert_eq!(
        state.view().error_banner,
        Some(ErrorKind::TimedOut.user_message(""))
    );
}

#[test]
fn view_closed_cancels_polling() {
    init_logging();
    let (state, effects) = update(polling("t5"), Msg::ViewClosed);
    assert_eq!(
        effects,
        vec![Effect::CancelPolling {
            task_id: "t5".to_string()
        }]
    );
    assert_eq!(state.active_task(), None);

    let (_, effects) = update(ready(), Msg::ViewClosed);
    assert!(effects.is_empty());
}

#[test]
fn viewport_changes_are_tracked() {
    init_logging();
    let (mut state, _) = update(ready(), Msg::ViewportChanged { top: 3, height: 12 });
    assert_eq!(state.viewport().top, 3);
    assert_eq!(state.viewport().height, 12);
    assert!(state.consume_dirty());

    let (mut state, _) = update(state, Msg::ViewportChanged { top: 3, height: 12 });
    assert!(!state.consume_dirty());
    let (mut state, _) = update(state, Msg::NoOp);
    assert!(!state.consume_dirty());
}
