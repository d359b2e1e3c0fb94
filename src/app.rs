use std::path::{Path, PathBuf};

use anyhow::Result;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::backend::{self, BackendClient, JobSnapshot, JobStatus, Lecture, UploadOutcome};
use crate::config::Config;
use crate::timestamp;
use crate::tui::AppEvent;

pub const NO_LECTURE_REPLY: &str =
    "No lecture is currently loaded. Please upload a lecture first.";
pub const QUERY_FAILED_REPLY: &str =
    "Sorry, I encountered an error while processing your question. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Upload,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Where the upload screen is in the upload → poll pipeline. `Failed` covers
/// both a failed transfer and a job that ended in error; the user recovers
/// by submitting again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    Uploading,
    Processing,
    Failed,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    /// First timestamp found in the answer, normalized to mm:ss.
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,

    // Upload pipeline state
    pub phase: UploadPhase,
    pub path_input: String,
    pub path_cursor: usize,
    pub validation_error: Option<String>,
    pub upload_progress: u8,
    pub upload_outcome: Option<UploadOutcome>,
    pub job: Option<JobSnapshot>,
    /// Local copy of the uploaded video, kept for timestamp jumps.
    pub source_path: Option<PathBuf>,

    // Chat state
    pub current_lecture: Option<String>,
    pub lecture_error: Option<String>,
    pub chat_messages: Vec<ChatMessage>,
    pub query_input: String,
    pub query_cursor: usize,
    pub query_loading: bool,
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Async plumbing. Tasks hold no reference to App; they report back
    // through `events` or their join handle and are aborted on teardown.
    pub backend: BackendClient,
    pub events: UnboundedSender<AppEvent>,
    pub upload_task: Option<JoinHandle<()>>,
    pub poll_task: Option<JoinHandle<()>>,
    pub lectures_task: Option<JoinHandle<()>>,
    pub query_task: Option<JoinHandle<Result<String>>>,

    pub player_command: String,
}

impl App {
    pub fn new(events: UnboundedSender<AppEvent>) -> Self {
        let config = Config::load().unwrap_or_else(|_| Config::new());
        let backend = BackendClient::new(&config.resolved_backend_url());
        let player_command = config.resolved_player_command();

        Self {
            should_quit: false,
            screen: Screen::Upload,
            input_mode: InputMode::Editing,

            phase: UploadPhase::Idle,
            path_input: String::new(),
            path_cursor: 0,
            validation_error: None,
            upload_progress: 0,
            upload_outcome: None,
            job: None,
            source_path: None,

            current_lecture: None,
            lecture_error: None,
            chat_messages: Vec::new(),
            query_input: String::new(),
            query_cursor: 0,
            query_loading: false,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            animation_frame: 0,

            backend,
            events,
            upload_task: None,
            poll_task: None,
            lectures_task: None,
            query_task: None,

            player_command,
        }
    }

    // Upload pipeline

    /// Validate the entered path and, if it passes, hand the file to a
    /// background upload task. Validation failures never reach the network.
    pub fn submit_upload(&mut self) {
        if matches!(self.phase, UploadPhase::Uploading | UploadPhase::Processing) {
            return;
        }

        let trimmed = self.path_input.trim();
        if trimmed.is_empty() {
            return;
        }
        let path = PathBuf::from(trimmed);

        let size = match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => meta.len(),
            _ => {
                self.validation_error = Some("File not found.".to_string());
                return;
            }
        };

        let mime = match backend::validate_file(&path, size) {
            Ok(mime) => mime,
            Err(message) => {
                self.validation_error = Some(message);
                return;
            }
        };

        self.validation_error = None;
        self.upload_outcome = None;
        self.job = None;
        self.upload_progress = 0;
        self.phase = UploadPhase::Uploading;
        self.source_path = Some(path.clone());
        self.abort_transfer_tasks();

        let client = self.backend.clone();
        let events = self.events.clone();
        self.upload_task = Some(tokio::spawn(async move {
            let outcome = client.upload(path, mime, events.clone()).await;
            let _ = events.send(AppEvent::UploadFinished(outcome));
        }));
    }

    pub fn handle_upload_progress(&mut self, percent: u8) {
        if self.phase == UploadPhase::Uploading {
            self.upload_progress = percent.min(100);
        }
    }

    pub fn handle_upload_finished(&mut self, outcome: UploadOutcome) {
        if self.phase != UploadPhase::Uploading {
            return;
        }
        self.upload_task = None;

        let success = outcome.success;
        self.upload_outcome = Some(outcome);

        if success {
            // The job exists backend-side before the first poll answers.
            self.phase = UploadPhase::Processing;
            self.job = Some(JobSnapshot::queued());
            self.start_polling();
        } else {
            self.phase = UploadPhase::Failed;
        }
    }

    /// Started exactly once per successful upload.
    fn start_polling(&mut self) {
        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
        let client = self.backend.clone();
        let events = self.events.clone();
        self.poll_task = Some(tokio::spawn(backend::poll_processing(client, events)));
    }

    pub fn handle_job_update(&mut self, job: JobSnapshot) {
        if self.phase != UploadPhase::Processing {
            return;
        }

        let status = job.status;
        self.job = Some(job);

        match status {
            JobStatus::Done => {
                self.poll_task = None;
                self.phase = UploadPhase::Idle;
                self.open_chat();
            }
            JobStatus::Error => {
                self.poll_task = None;
                self.phase = UploadPhase::Failed;
            }
            JobStatus::Queued | JobStatus::Processing => {}
        }
    }

    // Chat session

    /// Reveal the chat screen and discover which lecture to talk to.
    fn open_chat(&mut self) {
        self.screen = Screen::Chat;
        self.input_mode = InputMode::Editing;
        self.chat_messages.clear();
        self.chat_scroll = 0;
        self.current_lecture = None;
        self.lecture_error = None;

        if let Some(task) = self.lectures_task.take() {
            task.abort();
        }
        let client = self.backend.clone();
        let events = self.events.clone();
        self.lectures_task = Some(tokio::spawn(async move {
            let result = client
                .lectures()
                .await
                .map_err(|_| "Failed to load lecture data".to_string());
            let _ = events.send(AppEvent::LecturesLoaded(result));
        }));
    }

    pub fn handle_lectures_loaded(&mut self, result: std::result::Result<Vec<Lecture>, String>) {
        self.lectures_task = None;
        if self.screen != Screen::Chat {
            return;
        }

        match result {
            Ok(lectures) => {
                // The list is append-ordered; the newest lecture is last.
                if let Some(latest) = lectures.last() {
                    self.current_lecture = Some(latest.filename.clone());
                    self.chat_messages.push(ChatMessage {
                        role: ChatRole::Assistant,
                        content: format!(
                            "Welcome! I'm ready to answer questions about your lecture: \"{}\". \
                             You can ask me anything about the content, key concepts, or specific \
                             topics covered in the lecture.",
                            latest.filename
                        ),
                        timestamp: None,
                    });
                }
            }
            Err(message) => {
                self.lecture_error = Some(message);
            }
        }
    }

    /// Send the typed question. The user message is appended optimistically
    /// and never rolled back; without a current lecture the exchange stays
    /// local.
    pub fn send_query(&mut self) {
        if self.query_loading {
            return;
        }
        let message = self.query_input.trim().to_string();
        if message.is_empty() {
            return;
        }
        self.query_input.clear();
        self.query_cursor = 0;

        self.chat_messages.push(ChatMessage {
            role: ChatRole::User,
            content: message.clone(),
            timestamp: None,
        });

        let Some(video_id) = self.current_lecture.clone() else {
            self.chat_messages.push(ChatMessage {
                role: ChatRole::Assistant,
                content: NO_LECTURE_REPLY.to_string(),
                timestamp: None,
            });
            self.scroll_chat_to_bottom();
            return;
        };

        self.query_loading = true;
        self.scroll_chat_to_bottom();

        let client = self.backend.clone();
        self.query_task = Some(tokio::spawn(async move {
            client.rag_query(&video_id, &message).await
        }));
    }

    /// Consume the settled query task result.
    pub fn finish_query(&mut self, result: Result<String>) {
        self.query_task = None;
        self.query_loading = false;

        match result {
            Ok(answer) => {
                let timestamp = timestamp::first_timestamp(&answer);
                self.chat_messages.push(ChatMessage {
                    role: ChatRole::Assistant,
                    content: answer,
                    timestamp,
                });
            }
            Err(_) => {
                self.chat_messages.push(ChatMessage {
                    role: ChatRole::Assistant,
                    content: QUERY_FAILED_REPLY.to_string(),
                    timestamp: None,
                });
            }
        }
        self.scroll_chat_to_bottom();
    }

    /// The newest timestamp in the conversation, if any answer carried one.
    pub fn latest_timestamp(&self) -> Option<&str> {
        self.chat_messages
            .iter()
            .rev()
            .find_map(|msg| msg.timestamp.as_deref())
    }

    /// Seek the external player to the newest answered timestamp. Only
    /// possible while the local copy uploaded this run is known.
    pub fn jump_to_latest_timestamp(&self) {
        let Some(ts) = self.latest_timestamp() else {
            return;
        };
        let Some(path) = &self.source_path else {
            return;
        };
        let seconds = timestamp::parse_timestamp(ts);
        open_in_player(&self.player_command, path, seconds);
    }

    // Session lifecycle

    /// "Upload new": drop the whole session and return to the upload form.
    pub fn reset_session(&mut self) {
        self.abort_tasks();

        self.screen = Screen::Upload;
        self.input_mode = InputMode::Editing;
        self.phase = UploadPhase::Idle;
        self.path_input.clear();
        self.path_cursor = 0;
        self.validation_error = None;
        self.upload_progress = 0;
        self.upload_outcome = None;
        self.job = None;
        self.source_path = None;

        self.current_lecture = None;
        self.lecture_error = None;
        self.chat_messages.clear();
        self.query_input.clear();
        self.query_cursor = 0;
        self.query_loading = false;
        self.chat_scroll = 0;
    }

    pub fn quit(&mut self) {
        self.abort_tasks();
        self.should_quit = true;
    }

    fn abort_transfer_tasks(&mut self) {
        if let Some(task) = self.upload_task.take() {
            task.abort();
        }
        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
    }

    fn abort_tasks(&mut self) {
        self.abort_transfer_tasks();
        if let Some(task) = self.lectures_task.take() {
            task.abort();
        }
        if let Some(task) = self.query_task.take() {
            task.abort();
        }
    }

    // Presentation helpers

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        let busy = self.query_loading
            || matches!(self.phase, UploadPhase::Uploading | UploadPhase::Processing);
        if busy {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_chat_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_chat_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    /// Scroll the conversation so the newest message (or the "Thinking..."
    /// indicator) is visible.
    pub fn scroll_chat_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in &self.chat_messages {
            total_lines += 1; // Role line ("You:" or "Assistant:")
            for line in msg.content.lines() {
                // Character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1;
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            if msg.timestamp.is_some() {
                total_lines += 1; // Jump hint line below the answer
            }
            total_lines += 1; // Blank line after message
        }

        if self.query_loading {
            total_lines += 2; // "Assistant:" + "Thinking..."
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        }
    }
}

/// Fire-and-forget seek into the local video copy. A missing player binary
/// is not an error; there is simply nothing to seek.
fn open_in_player(command: &str, path: &Path, seconds: u64) {
    use std::process::{Command, Stdio};

    let _ = Command::new(command)
        .arg(format!("--start={}", seconds))
        .arg(path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::JobStatus;
    use std::io::Write;
    use tokio::sync::mpsc;

    fn test_app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut app = App::new(tx);
        // Port 1 refuses connections, so spawned tasks fail fast instead of
        // reaching a live backend.
        app.backend = BackendClient::new("http://127.0.0.1:1");
        (app, rx)
    }

    fn success_outcome() -> UploadOutcome {
        UploadOutcome {
            success: true,
            message: "Upload successful!".to_string(),
            filename: Some("lecture.mp4".to_string()),
            status: Some("uploaded".to_string()),
            session: None,
        }
    }

    fn failure_outcome() -> UploadOutcome {
        UploadOutcome {
            success: false,
            message: "Upload failed.".to_string(),
            filename: None,
            status: None,
            session: None,
        }
    }

    #[tokio::test]
    async fn test_invalid_extension_blocks_upload() {
        let (mut app, _rx) = test_app();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        std::fs::File::create(&path).unwrap();

        app.path_input = path.to_string_lossy().into_owned();
        app.submit_upload();

        assert_eq!(
            app.validation_error.as_deref(),
            Some("Only MP4, MKV, WEBM files are allowed.")
        );
        assert!(app.upload_task.is_none());
        assert_eq!(app.phase, UploadPhase::Idle);
    }

    #[tokio::test]
    async fn test_missing_file_blocks_upload() {
        let (mut app, _rx) = test_app();
        app.path_input = "/definitely/not/here/lecture.mp4".to_string();
        app.submit_upload();

        assert_eq!(app.validation_error.as_deref(), Some("File not found."));
        assert!(app.upload_task.is_none());
    }

    #[tokio::test]
    async fn test_failed_transfer_lands_in_failed_phase() {
        let (mut app, mut rx) = test_app();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lecture.mp4");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"not really video data")
            .unwrap();

        app.path_input = path.to_string_lossy().into_owned();
        app.submit_upload();
        assert_eq!(app.phase, UploadPhase::Uploading);
        assert!(app.upload_task.is_some());
        assert!(app.validation_error.is_none());

        // The unreachable backend resolves the transfer as a failure.
        let outcome = loop {
            match rx.recv().await.expect("upload task reports back") {
                AppEvent::UploadFinished(outcome) => break outcome,
                _ => continue,
            }
        };
        app.handle_upload_finished(outcome);

        assert_eq!(app.phase, UploadPhase::Failed);
        assert_eq!(
            app.upload_outcome.as_ref().map(|o| o.message.as_str()),
            Some("Upload failed.")
        );
        assert!(app.poll_task.is_none());
        assert_eq!(app.screen, Screen::Upload);
    }

    #[tokio::test]
    async fn test_successful_upload_starts_polling() {
        let (mut app, _rx) = test_app();
        app.phase = UploadPhase::Uploading;

        app.handle_upload_finished(success_outcome());

        assert_eq!(app.phase, UploadPhase::Processing);
        assert_eq!(app.job.as_ref().map(|j| j.status), Some(JobStatus::Queued));
        assert!(app.poll_task.is_some());
        assert_eq!(app.screen, Screen::Upload);

        app.quit();
    }

    #[tokio::test]
    async fn test_failed_upload_never_polls() {
        let (mut app, _rx) = test_app();
        app.phase = UploadPhase::Uploading;

        app.handle_upload_finished(failure_outcome());

        assert_eq!(app.phase, UploadPhase::Failed);
        assert!(app.poll_task.is_none());
    }

    #[tokio::test]
    async fn test_done_job_opens_chat_exactly_once() {
        let (mut app, _rx) = test_app();
        app.phase = UploadPhase::Processing;

        app.handle_job_update(JobSnapshot {
            status: JobStatus::Done,
            progress: Some(100),
            error: None,
        });

        assert_eq!(app.screen, Screen::Chat);
        assert_eq!(app.phase, UploadPhase::Idle);
        assert!(app.poll_task.is_none());

        // A stale duplicate terminal snapshot must not restart discovery.
        app.current_lecture = Some("lecture.mp4".to_string());
        app.handle_job_update(JobSnapshot {
            status: JobStatus::Done,
            progress: Some(100),
            error: None,
        });
        assert_eq!(app.current_lecture.as_deref(), Some("lecture.mp4"));

        app.quit();
    }

    #[tokio::test]
    async fn test_error_job_stays_out_of_chat() {
        let (mut app, _rx) = test_app();
        app.phase = UploadPhase::Processing;

        app.handle_job_update(JobSnapshot {
            status: JobStatus::Error,
            progress: None,
            error: Some("Audio extraction failed".to_string()),
        });

        assert_eq!(app.screen, Screen::Upload);
        assert_eq!(app.phase, UploadPhase::Failed);
        assert!(app.poll_task.is_none());
        assert_eq!(
            app.job.as_ref().and_then(|j| j.error.as_deref()),
            Some("Audio extraction failed")
        );
    }

    #[tokio::test]
    async fn test_nonterminal_job_keeps_processing() {
        let (mut app, _rx) = test_app();
        app.phase = UploadPhase::Processing;

        app.handle_job_update(JobSnapshot {
            status: JobStatus::Processing,
            progress: Some(40),
            error: None,
        });

        assert_eq!(app.phase, UploadPhase::Processing);
        assert_eq!(app.screen, Screen::Upload);
        assert_eq!(app.job.as_ref().and_then(|j| j.progress), Some(40));
    }

    #[tokio::test]
    async fn test_send_query_without_lecture_stays_local() {
        let (mut app, _rx) = test_app();
        app.screen = Screen::Chat;
        app.query_input = "What is covered?".to_string();

        app.send_query();

        assert_eq!(app.chat_messages.len(), 2);
        assert_eq!(app.chat_messages[0].role, ChatRole::User);
        assert_eq!(app.chat_messages[0].content, "What is covered?");
        assert_eq!(app.chat_messages[1].role, ChatRole::Assistant);
        assert_eq!(app.chat_messages[1].content, NO_LECTURE_REPLY);
        assert!(app.query_task.is_none());
        assert!(!app.query_loading);
    }

    #[tokio::test]
    async fn test_send_query_is_optimistic_and_single_flight() {
        let (mut app, _rx) = test_app();
        app.screen = Screen::Chat;
        app.current_lecture = Some("lecture.mp4".to_string());
        app.query_input = "What topic is covered at 00:05:30?".to_string();

        app.send_query();

        assert_eq!(app.chat_messages.len(), 1);
        assert_eq!(app.chat_messages[0].role, ChatRole::User);
        assert!(app.query_loading);
        assert!(app.query_task.is_some());
        assert!(app.query_input.is_empty());

        // A second send while loading is ignored.
        app.query_input = "again?".to_string();
        app.send_query();
        assert_eq!(app.chat_messages.len(), 1);

        app.quit();
    }

    #[tokio::test]
    async fn test_finish_query_extracts_first_timestamp() {
        let (mut app, _rx) = test_app();
        app.screen = Screen::Chat;
        app.query_loading = true;

        app.finish_query(Ok("The topic at 00:05:30 is linear algebra.".to_string()));

        let answer = app.chat_messages.last().unwrap();
        assert_eq!(answer.role, ChatRole::Assistant);
        assert_eq!(answer.timestamp.as_deref(), Some("05:30"));
        assert!(!app.query_loading);
    }

    #[tokio::test]
    async fn test_finish_query_failure_keeps_history() {
        let (mut app, _rx) = test_app();
        app.screen = Screen::Chat;
        app.chat_messages.push(ChatMessage {
            role: ChatRole::User,
            content: "What is covered?".to_string(),
            timestamp: None,
        });
        app.query_loading = true;

        app.finish_query(Err(anyhow::anyhow!("connection refused")));

        assert_eq!(app.chat_messages.len(), 2);
        assert_eq!(app.chat_messages[0].content, "What is covered?");
        assert_eq!(app.chat_messages[1].content, QUERY_FAILED_REPLY);
        assert!(!app.query_loading);
    }

    #[tokio::test]
    async fn test_lecture_discovery_picks_last_and_welcomes() {
        let (mut app, _rx) = test_app();
        app.screen = Screen::Chat;

        app.handle_lectures_loaded(Ok(vec![
            Lecture {
                filename: "old.mp4".to_string(),
            },
            Lecture {
                filename: "new.mp4".to_string(),
            },
        ]));

        assert_eq!(app.current_lecture.as_deref(), Some("new.mp4"));
        assert_eq!(app.chat_messages.len(), 1);
        assert!(app.chat_messages[0].content.contains("new.mp4"));
    }

    #[tokio::test]
    async fn test_lecture_discovery_empty_list() {
        let (mut app, _rx) = test_app();
        app.screen = Screen::Chat;

        app.handle_lectures_loaded(Ok(Vec::new()));

        assert!(app.current_lecture.is_none());
        assert!(app.chat_messages.is_empty());
    }

    #[tokio::test]
    async fn test_lecture_discovery_failure_sets_error() {
        let (mut app, _rx) = test_app();
        app.screen = Screen::Chat;

        app.handle_lectures_loaded(Err("Failed to load lecture data".to_string()));

        assert!(app.current_lecture.is_none());
        assert_eq!(
            app.lecture_error.as_deref(),
            Some("Failed to load lecture data")
        );
    }

    #[tokio::test]
    async fn test_reset_session_returns_to_upload() {
        let (mut app, _rx) = test_app();
        app.screen = Screen::Chat;
        app.current_lecture = Some("lecture.mp4".to_string());
        app.chat_messages.push(ChatMessage {
            role: ChatRole::Assistant,
            content: "Welcome!".to_string(),
            timestamp: None,
        });
        app.job = Some(JobSnapshot::queued());
        app.upload_progress = 80;
        app.query_loading = true;
        app.source_path = Some(PathBuf::from("/tmp/lecture.mp4"));

        app.reset_session();

        assert_eq!(app.screen, Screen::Upload);
        assert_eq!(app.phase, UploadPhase::Idle);
        assert!(app.chat_messages.is_empty());
        assert!(app.current_lecture.is_none());
        assert!(app.job.is_none());
        assert_eq!(app.upload_progress, 0);
        assert!(!app.query_loading);
        assert!(app.source_path.is_none());
    }

    #[tokio::test]
    async fn test_stale_events_are_no_ops() {
        let (mut app, _rx) = test_app();

        // Job updates outside of Processing are ignored.
        app.handle_job_update(JobSnapshot {
            status: JobStatus::Done,
            progress: None,
            error: None,
        });
        assert_eq!(app.screen, Screen::Upload);
        assert!(app.job.is_none());

        // Progress outside of Uploading is ignored.
        app.handle_upload_progress(55);
        assert_eq!(app.upload_progress, 0);

        // A lecture listing that lands after leaving chat is ignored.
        app.handle_lectures_loaded(Ok(vec![Lecture {
            filename: "late.mp4".to_string(),
        }]));
        assert!(app.current_lecture.is_none());
        assert!(app.chat_messages.is_empty());
    }

    #[tokio::test]
    async fn test_latest_timestamp_prefers_newest_answer() {
        let (mut app, _rx) = test_app();
        app.chat_messages.push(ChatMessage {
            role: ChatRole::Assistant,
            content: "See 01:00.".to_string(),
            timestamp: Some("01:00".to_string()),
        });
        app.chat_messages.push(ChatMessage {
            role: ChatRole::Assistant,
            content: "No times here.".to_string(),
            timestamp: None,
        });
        app.chat_messages.push(ChatMessage {
            role: ChatRole::Assistant,
            content: "Also 02:30.".to_string(),
            timestamp: Some("02:30".to_string()),
        });

        assert_eq!(app.latest_timestamp(), Some("02:30"));
    }
}
