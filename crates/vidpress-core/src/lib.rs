//! vidpress Core Library
//!
//! This crate provides the domain models, error types, configuration, validation
//! and UI state shared by the API client and the command-line front end.

pub mod config;
pub mod error;
pub mod hooks;
pub mod models;
pub mod state;
pub mod validation;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use hooks::{Announcer, NoOpAnnouncer};
pub use models::{
    Action, Percentage, ProcessingResponse, ProgressPayload, SelectedVideo, Template, TextSize,
};
pub use state::{Phase, UploaderState};
pub use validation::{validate_video, DEFAULT_MAX_VIDEO_SIZE_BYTES};
