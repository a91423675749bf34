use std::fmt;

/// Failure categories the review view distinguishes when messaging the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or invalid input; never sent to the backend.
    Validation,
    /// No usable provider credential.
    Auth,
    /// Transport failure on any request.
    Network,
    /// The backend does not know the task.
    NotFound,
    /// The backend reported FAILURE for the task.
    TaskFailed,
    /// Polling ran out of attempts without a terminal status.
    TimedOut,
    RateLimited,
    /// Unexpected non-success response from the backend.
    Server,
    Cancelled,
}

impl ErrorKind {
    /// Text shown to the user. Backend-reported failures and input errors
    /// carry their own message; other kinds use a fixed description.
    pub fn user_message(self, detail: &str) -> String {
        let detail = detail.trim();
        match self {
            ErrorKind::Validation | ErrorKind::TaskFailed if !detail.is_empty() => {
                detail.to_string()
            }
            ErrorKind::Validation => "The request is missing required input.".to_string(),
            ErrorKind::TaskFailed => "An error occurred during processing.".to_string(),
            ErrorKind::Auth => {
                "No API key is configured for the selected provider. Add a key and try again."
                    .to_string()
            }
            ErrorKind::Network => {
                "Could not reach the editing service. Check your connection and retry.".to_string()
            }
            ErrorKind::NotFound => "The requested task could not be found.".to_string(),
            ErrorKind::TimedOut => {
                "The edit is taking longer than expected. Please try again later.".to_string()
            }
            ErrorKind::RateLimited => {
                "Request rate limit exceeded. Please wait before trying again.".to_string()
            }
            ErrorKind::Server if !detail.is_empty() => detail.to_string(),
            ErrorKind::Server => "The editing service returned an unexpected error.".to_string(),
            ErrorKind::Cancelled => "The request was cancelled.".to_string(),
        }
    }

    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::Network | ErrorKind::TimedOut | ErrorKind::RateLimited | ErrorKind::Server
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Validation => "validation error",
            ErrorKind::Auth => "missing credentials",
            ErrorKind::Network => "network error",
            ErrorKind::NotFound => "not found",
            ErrorKind::TaskFailed => "task failed",
            ErrorKind::TimedOut => "timed out",
            ErrorKind::RateLimited => "rate limited",
            ErrorKind::Server => "server error",
            ErrorKind::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}
