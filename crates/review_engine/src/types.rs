//! Wire types exchanged with the editing backend.
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use review_core::{EditMode, EditOutcome, Progress, SubmissionId};
use serde::{Deserialize, Serialize};

use crate::TaskError;

/// Reply to a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedTask {
    pub task_id: String,
    pub status_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    Pending,
    Started,
    Success,
    Failure,
    Retry,
    Revoked,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Started => "STARTED",
            TaskStatus::Success => "SUCCESS",
            TaskStatus::Failure => "FAILURE",
            TaskStatus::Retry => "RETRY",
            TaskStatus::Revoked => "REVOKED",
        }
    }

    /// SUCCESS and FAILURE never change again; everything else keeps polling.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Success | TaskStatus::Failure)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(TaskStatus::Pending),
            "STARTED" => Ok(TaskStatus::Started),
            "SUCCESS" => Ok(TaskStatus::Success),
            "FAILURE" => Ok(TaskStatus::Failure),
            "RETRY" => Ok(TaskStatus::Retry),
            "REVOKED" => Ok(TaskStatus::Revoked),
            other => Err(format!("unknown task status '{other}'")),
        }
    }
}

/// One answer from the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskSnapshot {
    pub task_id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub result: Option<EditOutcome>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub progress: Option<Progress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionHeading {
    pub text: String,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SectionHeadings {
    pub headings: Vec<SectionHeading>,
    pub article_title: String,
    pub article_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskSummary {
    pub id: String,
    pub editing_mode: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub article_title: Option<String>,
    #[serde(default)]
    pub section_title: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub llm_provider: Option<String>,
    #[serde(default)]
    pub llm_model: Option<String>,
    #[serde(default)]
    pub changes_count: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskPage {
    pub results: Vec<TaskSummary>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaskDetail {
    pub id: String,
    pub editing_mode: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub article_title: Option<String>,
    #[serde(default)]
    pub section_title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub llm_provider: Option<String>,
    #[serde(default)]
    pub llm_model: Option<String>,
    /// Stored verbatim; older tasks may hold an error object here.
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl TaskDetail {
    /// The stored result as paragraphs, when it has that shape.
    pub fn outcome(&self) -> Option<EditOutcome> {
        let value = self.result.as_ref()?;
        if value.get("error").is_some() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}

/// Error body shared by every endpoint: `{error, error_code, details?}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Filters for the task history listing. Unset filters are not sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    pub page: u32,
    pub page_size: u32,
    pub status: Option<TaskStatus>,
    pub editing_mode: Option<EditMode>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            status: None,
            editing_mode: None,
            date_from: None,
            date_to: None,
        }
    }
}

impl TaskQuery {
    /// Query-string pairs in a stable order, with the page size clamped.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.max(1).to_string()),
            ("page_size", self.page_size.clamp(1, MAX_PAGE_SIZE).to_string()),
        ];
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(mode) = self.editing_mode {
            pairs.push(("editing_mode", mode.as_str().to_string()));
        }
        if let Some(date) = self.date_from {
            pairs.push(("date_from", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(date) = self.date_to {
            pairs.push(("date_to", date.format("%Y-%m-%d").to_string()));
        }
        pairs
    }
}

/// Events reported by [`crate::EngineHandle`].
#[derive(Debug)]
pub enum EngineEvent {
    TaskAccepted {
        submission: SubmissionId,
        task_id: String,
    },
    SubmissionFailed {
        submission: SubmissionId,
        error: TaskError,
    },
    Progress {
        task_id: String,
        progress: Progress,
    },
    /// Polling ended. Cancelled polls report nothing.
    Completed {
        task_id: String,
        result: Result<EditOutcome, TaskError>,
    },
}
