use std::time::Duration;

use reqwest::StatusCode;
use review_core::{EditMode, EditTarget};
use review_logging::{review_debug, review_info, review_warn};
use serde::de::DeserializeOwned;
use serde_json::json;
use url::Url;

use crate::{
    ApiErrorBody, CredentialConfig, SectionHeadings, SubmittedTask, TaskDetail, TaskError,
    TaskPage, TaskQuery, TaskSnapshot,
};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// API root, e.g. `http://127.0.0.1:8000/api`.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ClientSettings {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// The two calls the poller and the engine depend on.
#[async_trait::async_trait]
pub trait TaskApi: Send + Sync {
    async fn submit_edit_task(
        &self,
        mode: EditMode,
        target: &EditTarget,
        credentials: &CredentialConfig,
    ) -> Result<SubmittedTask, TaskError>;

    async fn get_task_status(&self, task_id: &str) -> Result<TaskSnapshot, TaskError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTaskClient {
    settings: ClientSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestTaskClient {
    pub fn new(settings: ClientSettings) -> Result<Self, TaskError> {
        let base = parse_base_url(&settings.base_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| TaskError::Network(err.to_string()))?;
        Ok(Self {
            settings,
            base,
            client,
        })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    fn endpoint(&self, path: &str) -> Result<Url, TaskError> {
        self.base
            .join(path)
            .map_err(|err| TaskError::Validation(format!("bad endpoint {path}: {err}")))
    }

    /// Level-2 headings of an article.
    pub async fn section_headings(&self, article_title: &str) -> Result<SectionHeadings, TaskError> {
        let article_title = article_title.trim();
        if article_title.is_empty() {
            return Err(TaskError::Validation("Article title is required.".to_string()));
        }
        let url = self.endpoint("section-headings")?;
        review_debug!("fetching section headings for '{}'", article_title);
        let response = self
            .client
            .post(url)
            .json(&json!({ "article_title": article_title }))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }

    /// One page of the task history.
    pub async fn list_tasks(&self, query: &TaskQuery) -> Result<TaskPage, TaskError> {
        let mut url = self.endpoint("tasks/")?;
        url.query_pairs_mut()
            .extend_pairs(query.to_pairs().iter().map(|(k, v)| (*k, v.as_str())));
        review_debug!("listing tasks: {}", url);
        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;
        read_json(response).await
    }

    pub async fn task_detail(&self, task_id: &str) -> Result<TaskDetail, TaskError> {
        let url = self.endpoint(&format!("tasks/{}/", encode_segment(task_id)))?;
        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;
        read_json(response).await
    }
}

#[async_trait::async_trait]
impl TaskApi for ReqwestTaskClient {
    async fn submit_edit_task(
        &self,
        mode: EditMode,
        target: &EditTarget,
        credentials: &CredentialConfig,
    ) -> Result<SubmittedTask, TaskError> {
        target.validate()?;
        let credential = credentials.active_credential()?;
        let body = match target {
            EditTarget::Section {
                article_title,
                section_title,
            } => json!({
                "article_title": article_title.trim(),
                "section_title": section_title.trim(),
            }),
            EditTarget::Content(content) => json!({ "content": content }),
        };
        let url = self.endpoint(&format!("edit/{}", mode.as_str()))?;
        review_info!(
            "submitting {} edit for {} using {}",
            mode,
            target.kind_label(),
            credential.provider
        );

        let response = self
            .client
            .post(url)
            .header(credential.provider.header_name(), credential.api_key.as_str())
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let submitted: SubmittedTask = read_json(response).await?;
        review_info!("task {} accepted", submitted.task_id);
        Ok(submitted)
    }

    async fn get_task_status(&self, task_id: &str) -> Result<TaskSnapshot, TaskError> {
        let url = self.endpoint(&format!("results/{}", encode_segment(task_id)))?;
        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.text().await.map_err(map_reqwest_error)?;

        // FAILURE arrives as a 500 and pending states as 202, all with a task body.
        match serde_json::from_str::<TaskSnapshot>(&body) {
            Ok(snapshot) => Ok(snapshot),
            Err(err) if status.is_success() => {
                review_warn!("undecodable status body for {}: {}", task_id, err);
                Err(TaskError::InvalidResponse(err.to_string()))
            }
            Err(_) => Err(error_from_status(status, &body)),
        }
    }
}

fn parse_base_url(raw: &str) -> Result<Url, TaskError> {
    // `Url::join` replaces the last segment unless the base ends with '/'.
    let normalized = format!("{}/", raw.trim().trim_end_matches('/'));
    Url::parse(&normalized)
        .map_err(|err| TaskError::Validation(format!("invalid server url '{raw}': {err}")))
}

fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes()).collect()
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, TaskError> {
    let status = response.status();
    let body = response.text().await.map_err(map_reqwest_error)?;
    if !status.is_success() {
        return Err(error_from_status(status, &body));
    }
    serde_json::from_str(&body).map_err(|err| TaskError::InvalidResponse(err.to_string()))
}

/// Maps a non-success response onto the error taxonomy.
pub(crate) fn error_from_status(status: StatusCode, body: &str) -> TaskError {
    let message = match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) if body.trim().is_empty() => status.to_string(),
        Err(_) => body.trim().to_string(),
    };
    match status {
        StatusCode::BAD_REQUEST => TaskError::Validation(message),
        StatusCode::UNAUTHORIZED => TaskError::Auth(message),
        StatusCode::NOT_FOUND => TaskError::NotFound(message),
        StatusCode::TOO_MANY_REQUESTS => TaskError::RateLimited(message),
        other => TaskError::Api {
            status: other.as_u16(),
            message,
        },
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TaskError {
    if err.is_decode() {
        return TaskError::InvalidResponse(err.to_string());
    }
    TaskError::Network(err.to_string())
}
