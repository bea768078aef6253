//! UI state for a single uploader view.
//!
//! Transitions are flat: idle -> file-selected -> processing -> complete or
//! failed. Each transition method applies one event and keeps the invariants:
//! progress within 0..=100, and a processing outcome sets either `error` or
//! `download_url`. A failed download keeps the URL next to its error so the
//! download can be retried.

use serde::Serialize;

use crate::error::{AppError, ErrorMetadata};
use crate::models::{Action, Percentage, SelectedVideo, Template, TextSize};
use crate::validation::validate_video;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    FileSelected,
    Processing,
    Complete,
    Failed,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UploaderState {
    pub file: Option<SelectedVideo>,
    pub dragging: bool,
    pub progress: Percentage,
    pub template: Template,
    pub text_size: TextSize,
    pub error: Option<String>,
    pub download_url: Option<String>,
    pub phase: Phase,
    /// Action of the request currently in flight or last completed
    pub action: Option<Action>,
}

impl UploaderState {
    pub fn new(template: Template, text_size: TextSize) -> Self {
        Self {
            template,
            text_size,
            ..Self::default()
        }
    }

    pub fn drag_enter(&mut self) {
        self.dragging = true;
    }

    pub fn drag_leave(&mut self) {
        self.dragging = false;
    }

    /// Accept or reject a newly picked file.
    ///
    /// A rejected file sets `error` and leaves any previously stored file
    /// untouched. An accepted file replaces the stored one and resets
    /// progress, error and download URL.
    pub fn select_file(&mut self, candidate: SelectedVideo, max_size_bytes: u64) -> Result<(), AppError> {
        self.dragging = false;
        if self.phase == Phase::Processing {
            return Err(AppError::Busy);
        }

        if let Err(err) = validate_video(&candidate, max_size_bytes) {
            self.error = Some(err.client_message());
            return Err(err);
        }

        self.file = Some(candidate);
        self.progress = Percentage::ZERO;
        self.error = None;
        self.download_url = None;
        self.action = None;
        self.phase = Phase::FileSelected;
        Ok(())
    }

    /// Start a processing request.
    ///
    /// Refused when no file is stored or when a request is already in flight;
    /// the busy case leaves state untouched so the running request keeps its
    /// progress bar.
    pub fn begin_processing(&mut self, action: Action) -> Result<SelectedVideo, AppError> {
        if self.phase == Phase::Processing {
            return Err(AppError::Busy);
        }

        let file = match &self.file {
            Some(file) => file.clone(),
            None => {
                let err = AppError::NoFileSelected;
                self.error = Some(err.client_message());
                return Err(err);
            }
        };

        self.progress = Percentage::ZERO;
        self.error = None;
        self.download_url = None;
        self.action = Some(action);
        self.phase = Phase::Processing;
        Ok(file)
    }

    /// Mirror a progress value pushed by the backend. Last writer wins.
    pub fn apply_progress(&mut self, progress: Percentage) {
        self.progress = progress;
    }

    pub fn complete(&mut self, url: String) {
        self.progress = Percentage::COMPLETE;
        self.error = None;
        self.download_url = Some(url);
        self.phase = Phase::Complete;
    }

    pub fn fail(&mut self, err: &AppError) {
        self.progress = Percentage::ZERO;
        self.error = Some(err.client_message());
        self.download_url = None;
        self.phase = Phase::Failed;
    }

    /// Record an error that does not end the current phase (download
    /// failures, rejected actions). `download_url` is kept.
    pub fn set_error(&mut self, err: &AppError) {
        self.error = Some(err.client_message());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Drop the stored file and everything derived from it.
    pub fn reset(&mut self) {
        self.file = None;
        self.dragging = false;
        self.progress = Percentage::ZERO;
        self.error = None;
        self.download_url = None;
        self.action = None;
        self.phase = Phase::Idle;
    }

    pub fn toggle_text_size(&mut self) {
        self.text_size = self.text_size.toggled();
    }

    pub fn is_processing(&self) -> bool {
        self.phase == Phase::Processing
    }
}
