use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, anyhow};
use futures_util::TryStreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::io::ReaderStream;

use crate::tui::AppEvent;

/// Hard client-side ceiling: 3 GiB, checked before any bytes leave the
/// machine.
pub const MAX_UPLOAD_BYTES: u64 = 3 * 1024 * 1024 * 1024;

/// Delay between status polls. The next request is only scheduled after the
/// previous one resolves, so ticks never overlap.
const POLL_DELAY: Duration = Duration::from_secs(2);

/// Extensions the backend accepts, with the MIME type sent in the upload.
const ALLOWED_TYPES: &[(&str, &str)] = &[
    ("mp4", "video/mp4"),
    ("mkv", "video/mkv"),
    ("webm", "video/webm"),
];

/// Session record returned by the upload endpoint. Parsed for completeness;
/// nothing downstream consumes it yet because the status endpoints key on
/// filename, not session id.
#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
pub struct SessionInfo {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    filename: Option<String>,
    status: Option<String>,
    #[serde(default)]
    session: Option<SessionInfo>,
}

/// What the user is told about an upload attempt. `status` and `session`
/// are carried as the backend reports them; nothing reads them yet.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub success: bool,
    pub message: String,
    pub filename: Option<String>,
    #[allow(dead_code)]
    pub status: Option<String>,
    #[allow(dead_code)]
    pub session: Option<SessionInfo>,
}

impl UploadOutcome {
    fn succeeded(response: Option<UploadResponse>) -> Self {
        let response = response.unwrap_or(UploadResponse {
            filename: None,
            status: None,
            session: None,
        });
        Self {
            success: true,
            message: "Upload successful!".to_string(),
            filename: response.filename,
            status: response.status,
            session: response.session,
        }
    }

    fn failed() -> Self {
        Self {
            success: false,
            message: "Upload failed.".to_string(),
            filename: None,
            status: None,
            session: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Done,
    Error,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error)
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Done => "done",
            JobStatus::Error => "error",
        }
    }
}

/// Latest state of one backend processing job. The client never accumulates
/// these; each poll replaces the previous snapshot wholesale.
#[derive(Debug, Clone, Deserialize)]
pub struct JobSnapshot {
    pub status: JobStatus,
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub error: Option<String>,
}

impl JobSnapshot {
    pub fn queued() -> Self {
        Self {
            status: JobStatus::Queued,
            progress: None,
            error: None,
        }
    }

    fn failed_fetch() -> Self {
        Self {
            status: JobStatus::Error,
            progress: None,
            error: Some("Failed to fetch processing status.".to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Lecture {
    pub filename: String,
}

#[derive(Deserialize)]
struct JobsResponse {
    #[serde(default)]
    jobs: Vec<JobSnapshot>,
}

#[derive(Deserialize)]
struct LecturesResponse {
    #[serde(default)]
    lectures: Vec<Lecture>,
}

#[derive(Serialize)]
struct RagQueryRequest {
    video_id: String,
    query: String,
}

#[derive(Deserialize)]
struct RagQueryResponse {
    answer: String,
}

/// The MIME type the backend expects for `path`, or None when the extension
/// is not an accepted video container.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    ALLOWED_TYPES
        .iter()
        .find(|(allowed, _)| *allowed == ext)
        .map(|(_, mime)| *mime)
}

/// Client-side gate applied before an upload is attempted. Returns the MIME
/// type to send, or the message naming the violated rule.
pub fn validate_file(path: &Path, size: u64) -> std::result::Result<&'static str, String> {
    let Some(mime) = mime_for_path(path) else {
        return Err("Only MP4, MKV, WEBM files are allowed.".to_string());
    };
    if size > MAX_UPLOAD_BYTES {
        return Err("File size exceeds 3GB limit.".to_string());
    }
    Ok(mime)
}

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Monitored multipart upload. Progress percentages are emitted through
    /// `events` as the body streams; the returned outcome is what the UI
    /// shows verbatim. A body that is 2xx but not the expected JSON still
    /// counts as success with the structured fields dropped.
    pub async fn upload(
        &self,
        path: PathBuf,
        mime: &'static str,
        events: UnboundedSender<AppEvent>,
    ) -> UploadOutcome {
        match self.try_upload(path, mime, events).await {
            Ok(outcome) => outcome,
            Err(_) => UploadOutcome::failed(),
        }
    }

    async fn try_upload(
        &self,
        path: PathBuf,
        mime: &'static str,
        events: UnboundedSender<AppEvent>,
    ) -> Result<UploadOutcome> {
        let file = tokio::fs::File::open(&path).await?;
        let total = file.metadata().await?.len();

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("lecture")
            .to_string();

        let mut sent: u64 = 0;
        let mut last_percent: u8 = 0;
        let progress = events.clone();
        let stream = ReaderStream::new(file).inspect_ok(move |chunk| {
            sent += chunk.len() as u64;
            let percent = if total > 0 {
                ((sent as f64 / total as f64) * 100.0).round() as u8
            } else {
                100
            };
            if percent != last_percent {
                last_percent = percent;
                let _ = progress.send(AppEvent::UploadProgress(percent));
            }
        });

        let part = Part::stream_with_length(Body::wrap_stream(stream), total)
            .file_name(file_name)
            .mime_str(mime)?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/upload", self.base_url))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Ok(UploadOutcome::failed());
        }

        // A 2xx with an unreadable body still reports success; only the
        // structured fields are lost.
        let body = response.json::<UploadResponse>().await.ok();
        Ok(UploadOutcome::succeeded(body))
    }

    pub async fn processing_status(&self) -> Result<Vec<JobSnapshot>> {
        let response = self
            .client
            .get(format!("{}/processing-status", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("status request failed: {}", response.status()));
        }

        let body: JobsResponse = response.json().await?;
        Ok(body.jobs)
    }

    pub async fn lectures(&self) -> Result<Vec<Lecture>> {
        let response = self
            .client
            .get(format!("{}/lectures", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("lecture listing failed: {}", response.status()));
        }

        let body: LecturesResponse = response.json().await?;
        Ok(body.lectures)
    }

    pub async fn rag_query(&self, video_id: &str, query: &str) -> Result<String> {
        let request = RagQueryRequest {
            video_id: video_id.to_string(),
            query: query.to_string(),
        };

        let response = self
            .client
            .post(format!("{}/rag-query", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("RAG query failed with status: {}", response.status()));
        }

        let body: RagQueryResponse = response.json().await?;
        Ok(body.answer)
    }
}

/// Poll the processing-status list until the newest job reaches a terminal
/// state, forwarding each snapshot through `events`. The list carries no job
/// id to correlate with the upload, so the last entry is taken as "the" job.
/// A failed fetch is terminal and reported as an error snapshot.
pub async fn poll_processing(client: BackendClient, events: UnboundedSender<AppEvent>) {
    loop {
        let snapshot = match client.processing_status().await {
            Ok(mut jobs) => match jobs.pop() {
                Some(job) => job,
                None => {
                    // Nothing registered yet; keep waiting.
                    tokio::time::sleep(POLL_DELAY).await;
                    continue;
                }
            },
            Err(_) => JobSnapshot::failed_fetch(),
        };

        let terminal = snapshot.status.is_terminal();
        if events.send(AppEvent::JobUpdate(snapshot)).is_err() {
            break;
        }
        if terminal {
            break;
        }
        tokio::time::sleep(POLL_DELAY).await;
    }
}
