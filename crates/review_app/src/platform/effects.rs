use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use review_core::{Effect, Msg};
use review_engine::{export_text, EngineEvent, EngineHandle, ExportSummary};
use review_logging::{review_info, review_warn};

/// Executes effects produced by `update`. Effects that complete synchronously
/// report back through the returned messages.
pub struct EffectRunner {
    engine: EngineHandle,
    output_dir: Option<PathBuf>,
    exported: Vec<ExportSummary>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, output_dir: Option<PathBuf>) -> Self {
        Self {
            engine,
            output_dir,
            exported: Vec::new(),
        }
    }

    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    pub fn exported(&self) -> &[ExportSummary] {
        &self.exported
    }

    pub fn run(&mut self, effects: Vec<Effect>) -> anyhow::Result<Vec<Msg>> {
        let mut follow_ups = Vec::new();
        for effect in effects {
            match effect {
                Effect::SubmitTask {
                    submission,
                    mode,
                    target,
                } => {
                    review_info!(
                        "SubmitTask submission={} mode={} target={}",
                        submission,
                        mode,
                        target.kind_label()
                    );
                    self.engine.submit(submission, mode, target);
                }
                Effect::CancelPolling { task_id } => {
                    review_info!("CancelPolling task_id={}", task_id);
                    self.engine.cancel_polling(task_id);
                }
                Effect::CopyToClipboard { text } => {
                    let ok = copy_to_clipboard(&text);
                    if !ok {
                        review_warn!("clipboard copy unavailable");
                    }
                    follow_ups.push(Msg::CopyFinished { ok });
                }
                Effect::ExportText {
                    text,
                    suggested_name,
                } => match &self.output_dir {
                    Some(dir) => {
                        let summary = export_text(dir, &suggested_name, &text)?;
                        self.exported.push(summary);
                    }
                    None => {
                        let mut stdout = io::stdout().lock();
                        writeln!(stdout, "{text}")?;
                    }
                },
            }
        }
        Ok(follow_ups)
    }
}

/// Maps an engine event onto the review message it stands for.
pub fn msg_from_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::TaskAccepted {
            submission,
            task_id,
        } => Msg::TaskAccepted {
            submission,
            task_id,
        },
        EngineEvent::SubmissionFailed { submission, error } => Msg::SubmissionFailed {
            submission,
            kind: error.kind(),
            message: error.detail(),
        },
        EngineEvent::Progress { task_id, progress } => Msg::TaskProgress { task_id, progress },
        EngineEvent::Completed {
            task_id,
            result: Ok(outcome),
        } => Msg::TaskSucceeded { task_id, outcome },
        EngineEvent::Completed {
            task_id,
            result: Err(error),
        } => {
            review_warn!("task {} ended: {}", task_id, error);
            Msg::TaskFailed {
                task_id,
                kind: error.kind(),
                message: error.detail(),
            }
        }
    }
}

/// OSC 52 escape sequence asking the terminal to set the clipboard.
fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x1b\\", STANDARD.encode(text.as_bytes()))
}

fn copy_to_clipboard(text: &str) -> bool {
    let stdout = io::stdout();
    if !stdout.is_terminal() {
        return false;
    }
    let mut handle = stdout.lock();
    handle
        .write_all(osc52_sequence(text).as_bytes())
        .and_then(|_| handle.flush())
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use review_core::{EditOutcome, ErrorKind};
    use review_engine::TaskError;

    #[test]
    fn osc52_wraps_base64_payload() {
        assert_eq!(osc52_sequence("hi"), "\x1b]52;c;aGk=\x1b\\");
    }

    #[test]
    fn failed_completion_keeps_backend_message() {
        let msg = msg_from_event(EngineEvent::Completed {
            task_id: "t-1".to_string(),
            result: Err(TaskError::TaskFailed("Section 'Foo' not found".to_string())),
        });
        assert_eq!(
            msg,
            Msg::TaskFailed {
                task_id: "t-1".to_string(),
                kind: ErrorKind::TaskFailed,
                message: "Section 'Foo' not found".to_string(),
            }
        );
    }

    #[test]
    fn successful_completion_becomes_task_succeeded() {
        let msg = msg_from_event(EngineEvent::Completed {
            task_id: "t-1".to_string(),
            result: Ok(EditOutcome::default()),
        });
        assert!(matches!(msg, Msg::TaskSucceeded { .. }));
    }
}
