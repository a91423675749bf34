use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use review_core::{EditMode, EditTarget, Progress, SubmissionId};
use review_logging::{review_debug, review_warn};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;

use crate::poller::{PollSettings, ProgressSink, TaskPoller};
use crate::{
    ClientSettings, CredentialConfig, EngineEvent, ReqwestTaskClient, TaskApi, TaskError,
};

enum EngineCommand {
    Submit {
        submission: SubmissionId,
        mode: EditMode,
        target: EditTarget,
    },
    SetCredentials(CredentialConfig),
    CancelPolling {
        task_id: String,
    },
    Accepted {
        submission: SubmissionId,
        task_id: String,
    },
    Finished {
        task_id: String,
    },
    Shutdown,
}

/// Runs task requests on a background tokio runtime and reports back through
/// a channel the caller drains at its own pace.
pub struct EngineHandle {
    cmd_tx: UnboundedSender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    thread: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(
        settings: ClientSettings,
        credentials: CredentialConfig,
        poll: PollSettings,
    ) -> Result<Self, TaskError> {
        let api = Arc::new(ReqwestTaskClient::new(settings)?);
        Ok(Self::with_api(api, credentials, poll))
    }

    pub fn with_api(
        api: Arc<dyn TaskApi>,
        credentials: CredentialConfig,
        poll: PollSettings,
    ) -> Self {
        let (cmd_tx, cmd_rx) = unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();
        let loop_tx = cmd_tx.clone();

        let thread = thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("tokio runtime");
            let worker = Worker {
                poller: TaskPoller::new(Arc::clone(&api), poll),
                api,
                credentials,
                cmd_tx: loop_tx,
                event_tx,
                active: HashMap::new(),
            };
            runtime.block_on(worker.run(cmd_rx));
        });

        Self {
            cmd_tx,
            event_rx,
            thread: Some(thread),
        }
    }

    pub fn submit(&self, submission: SubmissionId, mode: EditMode, target: EditTarget) {
        let _ = self.cmd_tx.send(EngineCommand::Submit {
            submission,
            mode,
            target,
        });
    }

    /// Replaces the credentials used for later submissions.
    pub fn set_credentials(&self, credentials: CredentialConfig) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::SetCredentials(credentials));
    }

    pub fn cancel_polling(&self, task_id: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::CancelPolling {
            task_id: task_id.into(),
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

struct ChannelProgressSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ProgressSink for ChannelProgressSink {
    fn on_progress(&self, task_id: &str, progress: &Progress) {
        let _ = self.tx.send(EngineEvent::Progress {
            task_id: task_id.to_string(),
            progress: progress.clone(),
        });
    }
}

struct Worker {
    api: Arc<dyn TaskApi>,
    poller: TaskPoller<dyn TaskApi>,
    credentials: CredentialConfig,
    cmd_tx: UnboundedSender<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
    active: HashMap<String, CancellationToken>,
}

impl Worker {
    async fn run(mut self, mut cmd_rx: UnboundedReceiver<EngineCommand>) {
        while let Some(command) = cmd_rx.recv().await {
            match command {
                EngineCommand::Submit {
                    submission,
                    mode,
                    target,
                } => self.spawn_submit(submission, mode, target),
                EngineCommand::SetCredentials(credentials) => self.credentials = credentials,
                EngineCommand::Accepted {
                    submission,
                    task_id,
                } => self.start_polling(submission, task_id),
                EngineCommand::CancelPolling { task_id } => {
                    if let Some(token) = self.active.remove(&task_id) {
                        review_debug!("cancelling poll for {}", task_id);
                        token.cancel();
                    }
                }
                EngineCommand::Finished { task_id } => {
                    self.active.remove(&task_id);
                }
                EngineCommand::Shutdown => break,
            }
        }
        for (_, token) in self.active.drain() {
            token.cancel();
        }
    }

    fn spawn_submit(&self, submission: SubmissionId, mode: EditMode, target: EditTarget) {
        let api = Arc::clone(&self.api);
        let credentials = self.credentials.clone();
        let cmd_tx = self.cmd_tx.clone();
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            match api.submit_edit_task(mode, &target, &credentials).await {
                Ok(submitted) => {
                    let _ = cmd_tx.send(EngineCommand::Accepted {
                        submission,
                        task_id: submitted.task_id,
                    });
                }
                Err(error) => {
                    review_warn!("submission {} failed: {}", submission, error);
                    let _ = event_tx.send(EngineEvent::SubmissionFailed { submission, error });
                }
            }
        });
    }

    fn start_polling(&mut self, submission: SubmissionId, task_id: String) {
        let sink: Arc<dyn ProgressSink> = Arc::new(ChannelProgressSink {
            tx: self.event_tx.clone(),
        });
        let handle = self.poller.spawn(task_id.clone(), Some(sink));
        self.active.insert(task_id.clone(), handle.token());
        // The token must be registered before the caller learns the task id.
        let _ = self.event_tx.send(EngineEvent::TaskAccepted {
            submission,
            task_id: task_id.clone(),
        });

        let cmd_tx = self.cmd_tx.clone();
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = handle.join().await;
            if result != Err(TaskError::Cancelled) {
                let _ = event_tx.send(EngineEvent::Completed {
                    task_id: task_id.clone(),
                    result,
                });
            }
            let _ = cmd_tx.send(EngineCommand::Finished { task_id });
        });
    }
}
