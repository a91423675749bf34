use std::sync::Arc;
use std::time::Duration;

use review_core::{EditOutcome, Progress};
use review_logging::{review_debug, review_info, review_trace, review_warn, scoped_task_context};
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::{TaskApi, TaskError, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            max_attempts: 200,
        }
    }
}

/// Receives progress snapshots in the order their responses arrived.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, task_id: &str, progress: &Progress);
}

/// Polls one task at a time until it reaches a terminal status.
pub struct TaskPoller<A: TaskApi + ?Sized> {
    api: Arc<A>,
    settings: PollSettings,
}

impl<A: TaskApi + ?Sized> Clone for TaskPoller<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            settings: self.settings,
        }
    }
}

impl<A: TaskApi + ?Sized + 'static> TaskPoller<A> {
    pub fn new(api: Arc<A>, settings: PollSettings) -> Self {
        Self { api, settings }
    }

    pub fn settings(&self) -> PollSettings {
        self.settings
    }

    /// Fetches status until SUCCESS with a result, FAILURE, the attempt
    /// budget runs out, or `cancel` fires. Exactly one request is in flight
    /// at a time and no request starts after cancellation.
    pub async fn poll_until_complete(
        &self,
        task_id: &str,
        sink: Option<&dyn ProgressSink>,
        cancel: &CancellationToken,
    ) -> Result<EditOutcome, TaskError> {
        let max_attempts = self.settings.max_attempts.max(1);
        let mut attempts = 0u32;

        loop {
            let snapshot = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TaskError::Cancelled),
                fetched = self.api.get_task_status(task_id) => fetched?,
            };
            attempts += 1;
            {
                let _ctx = scoped_task_context(task_id);
                review_debug!("poll {}/{}: {}", attempts, max_attempts, snapshot.status);
            }

            if let (Some(progress), Some(sink)) = (snapshot.progress.as_ref(), sink) {
                {
                    let _ctx = scoped_task_context(task_id);
                    review_trace!("{}", progress.summary().label());
                }
                sink.on_progress(task_id, progress);
            }

            match (snapshot.status, snapshot.result) {
                (TaskStatus::Success, Some(outcome)) => {
                    let _ctx = scoped_task_context(task_id);
                    review_info!(
                        "completed with {} paragraphs after {} polls",
                        outcome.paragraphs.len(),
                        attempts
                    );
                    return Ok(outcome);
                }
                (TaskStatus::Failure, _) => {
                    let message = snapshot
                        .error
                        .filter(|message| !message.trim().is_empty())
                        .unwrap_or_else(|| "An error occurred during processing.".to_string());
                    let _ctx = scoped_task_context(task_id);
                    review_warn!("failed: {}", message);
                    return Err(TaskError::TaskFailed(message));
                }
                _ => {}
            }

            if attempts >= max_attempts {
                let _ctx = scoped_task_context(task_id);
                review_warn!("no terminal status after {} polls", attempts);
                return Err(TaskError::TimedOut { attempts });
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TaskError::Cancelled),
                _ = tokio::time::sleep(self.settings.interval) => {}
            }
        }
    }

    /// Runs [`Self::poll_until_complete`] on the current runtime.
    pub fn spawn(&self, task_id: String, sink: Option<Arc<dyn ProgressSink>>) -> PollHandle {
        let cancel = CancellationToken::new();
        let poller = self.clone();
        let token = cancel.clone();
        let join = tokio::spawn(async move {
            poller
                .poll_until_complete(&task_id, sink.as_deref(), &token)
                .await
        });
        PollHandle {
            cancel: cancel.clone(),
            _guard: cancel.drop_guard(),
            join,
        }
    }
}

/// Cancellation handle for a spawned poll. Dropping it cancels the poll.
pub struct PollHandle {
    cancel: CancellationToken,
    _guard: DropGuard,
    join: JoinHandle<Result<EditOutcome, TaskError>>,
}

impl PollHandle {
    /// Stops the poll; no status request starts after this returns.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Waits for the poll to end.
    pub async fn join(mut self) -> Result<EditOutcome, TaskError> {
        let join = &mut self.join;
        match join.await {
            Ok(result) => result,
            Err(err) if err.is_cancelled() => Err(TaskError::Cancelled),
            Err(err) => Err(TaskError::Network(format!("poll task aborted: {err}"))),
        }
    }
}
