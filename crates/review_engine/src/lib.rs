//! Review engine: HTTP client, task polling, credentials and export IO.
mod client;
mod credentials;
mod engine;
mod error;
mod persist;
mod poller;
mod types;

pub use client::{ClientSettings, ReqwestTaskClient, TaskApi, DEFAULT_BASE_URL};
pub use credentials::{
    mask_key, Credential, CredentialConfig, CredentialStore, KeyValueStore, MemoryStore, Provider,
    StoreError,
};
pub use engine::EngineHandle;
pub use error::TaskError;
pub use persist::{ensure_output_dir, export_text, AtomicFileWriter, ExportSummary, PersistError};
pub use poller::{PollHandle, PollSettings, ProgressSink, TaskPoller};
pub use types::{
    ApiErrorBody, EngineEvent, Pagination, SectionHeading, SectionHeadings, SubmittedTask,
    TaskDetail, TaskPage, TaskQuery, TaskSnapshot, TaskStatus, TaskSummary, DEFAULT_PAGE_SIZE,
    MAX_PAGE_SIZE,
};
