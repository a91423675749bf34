#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use review_core::{
    EditMode, EditOutcome, EditTarget, Paragraph, ParagraphStatus, Phase, Progress,
};
use review_engine::{CredentialConfig, SubmittedTask, TaskApi, TaskError, TaskSnapshot, TaskStatus};

/// In-memory backend that answers status requests from a script, then
/// reports PENDING forever.
#[derive(Default)]
pub struct ScriptedApi {
    submit_result: Mutex<Option<Result<SubmittedTask, TaskError>>>,
    responses: Mutex<VecDeque<Result<TaskSnapshot, TaskError>>>,
    status_calls: AtomicU32,
}

impl ScriptedApi {
    pub fn new(responses: Vec<Result<TaskSnapshot, TaskError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            ..Self::default()
        }
    }

    pub fn with_submit_result(self, result: Result<SubmittedTask, TaskError>) -> Self {
        *self.submit_result.lock().unwrap() = Some(result);
        self
    }

    pub fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl TaskApi for ScriptedApi {
    async fn submit_edit_task(
        &self,
        _mode: EditMode,
        target: &EditTarget,
        credentials: &CredentialConfig,
    ) -> Result<SubmittedTask, TaskError> {
        target.validate()?;
        credentials.active_credential()?;
        self.submit_result
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| {
                Ok(SubmittedTask {
                    task_id: "t-1".to_string(),
                    status_url: "/api/results/t-1".to_string(),
                })
            })
    }

    async fn get_task_status(&self, task_id: &str) -> Result<TaskSnapshot, TaskError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(snapshot(task_id, TaskStatus::Pending)))
    }
}

pub fn snapshot(task_id: &str, status: TaskStatus) -> TaskSnapshot {
    TaskSnapshot {
        task_id: task_id.to_string(),
        status,
        result: None,
        error: None,
        progress: None,
    }
}

pub fn with_progress(mut snapshot: TaskSnapshot, completed: u32, total: u32) -> TaskSnapshot {
    let mut phase_counts = BTreeMap::new();
    phase_counts.insert(Phase::Complete, completed);
    phase_counts.insert(Phase::LlmProcessing, total - completed);
    snapshot.progress = Some(Progress {
        total_paragraphs: total,
        progress_percentage: completed * 100 / total,
        phase_counts,
        paragraphs: Vec::new(),
    });
    snapshot
}

pub fn success(task_id: &str) -> TaskSnapshot {
    TaskSnapshot {
        result: Some(outcome()),
        ..snapshot(task_id, TaskStatus::Success)
    }
}

pub fn outcome() -> EditOutcome {
    EditOutcome::from_paragraphs(vec![
        Paragraph::new("Intro.", "Intro.", ParagraphStatus::Unchanged),
        Paragraph::new("Teh cat.", "The cat.", ParagraphStatus::Changed),
    ])
}
