use review_core::{ErrorKind, ValidationError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("credentials rejected: {0}")]
    Auth(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// Backend reported FAILURE; the message is shown as is.
    #[error("{0}")]
    TaskFailed(String),
    #[error("no terminal status after {attempts} polls")]
    TimedOut { attempts: u32 },
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("backend returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
    #[error("cancelled")]
    Cancelled,
}

impl TaskError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TaskError::Validation(_) => ErrorKind::Validation,
            TaskError::Auth(_) => ErrorKind::Auth,
            TaskError::Network(_) => ErrorKind::Network,
            TaskError::NotFound(_) => ErrorKind::NotFound,
            TaskError::TaskFailed(_) => ErrorKind::TaskFailed,
            TaskError::TimedOut { .. } => ErrorKind::TimedOut,
            TaskError::RateLimited(_) => ErrorKind::RateLimited,
            TaskError::Api { .. } | TaskError::InvalidResponse(_) => ErrorKind::Server,
            TaskError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// The message without the category prefix; backend text is kept as is.
    pub fn detail(&self) -> String {
        match self {
            TaskError::Validation(message)
            | TaskError::Auth(message)
            | TaskError::Network(message)
            | TaskError::NotFound(message)
            | TaskError::TaskFailed(message)
            | TaskError::RateLimited(message)
            | TaskError::InvalidResponse(message)
            | TaskError::Api { message, .. } => message.clone(),
            TaskError::TimedOut { .. } | TaskError::Cancelled => self.to_string(),
        }
    }

    /// Message suitable for the review view.
    pub fn user_message(&self) -> String {
        self.kind().user_message(&self.detail())
    }
}

impl From<ValidationError> for TaskError {
    fn from(err: ValidationError) -> Self {
        TaskError::Validation(err.to_string())
    }
}
