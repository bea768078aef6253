//! Uploader controller.
//!
//! Owns the view state and wires the four user-facing handlers (file intake,
//! processing request, progress subscription, download) to the API client and
//! the announcer. State lives in a `watch` channel so the status view can
//! redraw on every change; each handler mutates it with one `send_modify`,
//! which also makes the in-flight check for processing requests atomic.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use vidpress_api_client::{ApiClient, RealtimeConnection, RealtimeEvent};
use vidpress_core::{
    Action, Announcer, AppError, ErrorMetadata, LogLevel, SelectedVideo, Template, TextSize,
    UploaderState,
};

use crate::intake;

#[derive(Clone)]
pub struct Uploader {
    api: ApiClient,
    state: Arc<watch::Sender<UploaderState>>,
    announcer: Arc<dyn Announcer>,
    max_file_size_bytes: u64,
}

impl Uploader {
    pub fn new(
        api: ApiClient,
        announcer: Arc<dyn Announcer>,
        max_file_size_bytes: u64,
        template: Template,
        text_size: TextSize,
    ) -> Self {
        let (state, _) = watch::channel(UploaderState::new(template, text_size));
        Self {
            api,
            state: Arc::new(state),
            announcer,
            max_file_size_bytes,
        }
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<UploaderState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> UploaderState {
        self.state.borrow().clone()
    }

    #[cfg(test)]
    pub(crate) fn drag_enter(&self) {
        self.state.send_modify(|s| s.drag_enter());
    }

    pub fn drag_leave(&self) {
        self.state.send_modify(|s| s.drag_leave());
    }

    /// Handle a drop: take the first dropped path and run intake on it.
    pub async fn drop_paths(&self, raw: &str) -> Result<SelectedVideo, AppError> {
        self.drag_leave();
        match intake::first_dropped_path(raw) {
            Some(path) => self.select_path(&path).await,
            None => {
                let err = AppError::InvalidInput("Nothing was dropped".to_string());
                self.report(&err);
                self.state.send_modify(|s| s.set_error(&err));
                Err(err)
            }
        }
    }

    /// Handle a picked file: validate it and store it on success.
    pub async fn select_path(&self, path: &Path) -> Result<SelectedVideo, AppError> {
        let candidate = match intake::inspect(path).await {
            Ok(candidate) => candidate,
            Err(err) => {
                self.report(&err);
                self.state.send_modify(|s| s.set_error(&err));
                return Err(err);
            }
        };

        let max = self.max_file_size_bytes;
        let mut outcome = Ok(());
        self.state
            .send_modify(|s| outcome = s.select_file(candidate.clone(), max));

        match outcome {
            Ok(()) => {
                info!(
                    file = %candidate.name,
                    size_bytes = candidate.size,
                    content_type = %candidate.content_type,
                    "Video file selected"
                );
                self.announcer
                    .announce(&format!("Video file {} selected", candidate.name));
                Ok(candidate)
            }
            Err(err) => {
                self.report(&err);
                Err(err)
            }
        }
    }

    /// Submit the stored file for processing and return the processed-video URL.
    ///
    /// Refused with [`AppError::Busy`] while another request is in flight.
    pub async fn process(&self, action: Action) -> Result<String, AppError> {
        let mut begun = Err(AppError::NoFileSelected);
        self.state
            .send_modify(|s| begun = s.begin_processing(action));
        let file = match begun {
            Ok(file) => file,
            Err(err) => {
                self.report(&err);
                return Err(err);
            }
        };

        self.announcer.announce(&format!(
            "{} your video. Please wait.",
            action.progressive()
        ));

        match self.api.upload_video(&file, action).await {
            Ok(url) => {
                info!(action = %action, url = %url, "Video processed");
                self.state.send_modify(|s| s.complete(url.clone()));
                self.announcer
                    .announce("Your video is ready. You can download it now.");
                Ok(url)
            }
            Err(err) => {
                self.state.send_modify(|s| s.fail(&err));
                self.report(&err);
                Err(err)
            }
        }
    }

    /// Play/stream link for the processed video, if there is one.
    pub fn play_link(&self) -> Option<String> {
        self.state
            .borrow()
            .download_url
            .as_deref()
            .map(|url| self.api.download_proxy_url(url))
    }

    /// Download the processed video of the last successful request.
    pub async fn download(&self, dest_dir: &Path) -> Result<PathBuf, AppError> {
        let url = self.state.borrow().download_url.clone();
        match url {
            Some(url) => self.download_from(&url, dest_dir).await,
            None => {
                let err = AppError::InvalidInput("There is no processed video to download".to_string());
                self.report(&err);
                Err(err)
            }
        }
    }

    /// Download a processed video by URL through the backend proxy.
    pub async fn download_from(&self, url: &str, dest_dir: &Path) -> Result<PathBuf, AppError> {
        self.announcer.announce("Downloading your video");
        match self.api.download_video(url, dest_dir).await {
            Ok(path) => {
                self.state.send_modify(|s| s.clear_error());
                self.announcer.announce("Download complete");
                Ok(path)
            }
            Err(err) => {
                self.state.send_modify(|s| s.set_error(&err));
                self.report(&err);
                Err(err)
            }
        }
    }

    /// Mirror `progress` events from `connection` into the view state until
    /// the returned subscription is dropped or the channel ends.
    pub fn attach_progress(&self, mut connection: RealtimeConnection) -> ProgressSubscription {
        let state = Arc::clone(&self.state);
        let task = tokio::spawn(async move {
            while let Some(event) = connection.next_event().await {
                match event {
                    RealtimeEvent::Connected => {
                        info!(sid = %connection.sid(), "Connected to progress channel")
                    }
                    RealtimeEvent::Progress(progress) => {
                        debug!(progress = progress.value(), "Progress update");
                        state.send_modify(|s| s.apply_progress(progress));
                    }
                    RealtimeEvent::Disconnected { reason } => {
                        info!(reason = %reason, "Disconnected from progress channel")
                    }
                }
            }
        });
        ProgressSubscription { task }
    }

    /// Log an error at its level and speak its user-facing message.
    fn report(&self, err: &AppError) {
        let code = err.error_code();
        match err.log_level() {
            LogLevel::Debug => debug!(code, error = %err, "Uploader error"),
            LogLevel::Warn => warn!(code, error = %err, "Uploader error"),
            LogLevel::Error => error!(code, error = %err.detailed_message(), "Uploader error"),
        }
        self.announcer.announce(&err.client_message());
    }
}

/// Handle on a progress subscription. Dropping it unsubscribes from every
/// event and closes the underlying connection.
pub struct ProgressSubscription {
    task: JoinHandle<()>,
}

impl ProgressSubscription {
    pub fn unsubscribe(self) {
        drop(self);
    }

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for ProgressSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
