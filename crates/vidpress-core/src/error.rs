//! Error types module
//!
//! All failures a user can run into are unified under [`AppError`]. Validation
//! errors are raised synchronously before any network call; request errors are
//! raised after an upload or download settles. Both kinds carry a user-facing
//! message (see [`ErrorMetadata::client_message`]) which is rendered in the
//! status view and spoken by the announcer.

use std::io;

/// Fallback shown when the backend gives no usable error message.
pub const GENERIC_PROCESSING_ERROR: &str = "Error processing video. Please try again.";

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like a refused upload
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error is presented to the user.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "FILE_TOO_LARGE")
    fn error_code(&self) -> &'static str;

    /// Whether retrying the same action may succeed
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// User-facing message, rendered in the status view and spoken aloud
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    #[error("File too large: {size} bytes exceeds limit of {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("No file selected")]
    NoFileSelected,

    #[error("A processing request is already in flight")]
    Busy,

    #[error("Processing failed: {0}")]
    ProcessingFailed(String),

    #[error("Request error: {0}")]
    Request(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Realtime channel error: {0}")]
    Realtime(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (error_code, recoverable, suggested_action, log_level).
fn app_error_static_metadata(err: &AppError) -> (&'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        AppError::InvalidFileType(_) => (
            "INVALID_FILE_TYPE",
            false,
            Some("Choose an MP4, AVI or MOV file"),
            LogLevel::Debug,
        ),
        AppError::FileTooLarge { .. } => (
            "FILE_TOO_LARGE",
            false,
            Some("Choose a smaller file"),
            LogLevel::Debug,
        ),
        AppError::NoFileSelected => (
            "NO_FILE_SELECTED",
            false,
            Some("Select a video file first"),
            LogLevel::Debug,
        ),
        AppError::Busy => (
            "BUSY",
            true,
            Some("Wait for the current request to finish"),
            LogLevel::Debug,
        ),
        AppError::ProcessingFailed(_) => (
            "PROCESSING_FAILED",
            true,
            Some("Try again or choose another action"),
            LogLevel::Warn,
        ),
        AppError::Request(_) => (
            "REQUEST_ERROR",
            true,
            Some("Check the backend is reachable and try again"),
            LogLevel::Error,
        ),
        AppError::DownloadFailed(_) => (
            "DOWNLOAD_FAILED",
            true,
            Some("Retry the download"),
            LogLevel::Warn,
        ),
        AppError::Realtime(_) => (
            "REALTIME_ERROR",
            true,
            Some("Progress updates are unavailable; the request itself may still succeed"),
            LogLevel::Warn,
        ),
        AppError::Config(_) => (
            "CONFIG_ERROR",
            false,
            Some("Check VIDPRESS_* environment variables"),
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            "INVALID_INPUT",
            false,
            Some("Check the arguments and try again"),
            LogLevel::Debug,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidFileType(_) => {
                "Please upload a valid video file (MP4, AVI, MOV)".to_string()
            }
            AppError::FileTooLarge { limit, .. } => {
                format!("File size exceeds {}MB limit", limit / (1024 * 1024))
            }
            AppError::NoFileSelected => "Please select a video file first".to_string(),
            AppError::Busy => "A video is already being processed. Please wait.".to_string(),
            AppError::ProcessingFailed(ref msg) if !msg.trim().is_empty() => msg.clone(),
            AppError::ProcessingFailed(_) | AppError::Request(_) => {
                GENERIC_PROCESSING_ERROR.to_string()
            }
            AppError::DownloadFailed(_) => "Failed to download video".to_string(),
            AppError::Realtime(_) => "Lost connection to progress updates".to_string(),
            AppError::Config(ref msg) => msg.clone(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_invalid_file_type() {
        let err = AppError::InvalidFileType("image/png".to_string());
        assert_eq!(err.error_code(), "INVALID_FILE_TYPE");
        assert!(!err.is_recoverable());
        assert_eq!(
            err.client_message(),
            "Please upload a valid video file (MP4, AVI, MOV)"
        );
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_file_too_large() {
        let err = AppError::FileTooLarge {
            size: 600 * 1024 * 1024,
            limit: 500 * 1024 * 1024,
        };
        assert_eq!(err.error_code(), "FILE_TOO_LARGE");
        assert_eq!(err.client_message(), "File size exceeds 500MB limit");
    }

    #[test]
    fn test_processing_failed_uses_server_message() {
        let err = AppError::ProcessingFailed("Unsupported codec".to_string());
        assert_eq!(err.client_message(), "Unsupported codec");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_processing_failed_without_message_falls_back() {
        let err = AppError::ProcessingFailed("   ".to_string());
        assert_eq!(err.client_message(), GENERIC_PROCESSING_ERROR);

        let err = AppError::Request("connection refused".to_string());
        assert_eq!(err.client_message(), GENERIC_PROCESSING_ERROR);
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_every_client_message_is_non_empty() {
        let errors = vec![
            AppError::InvalidFileType(String::new()),
            AppError::FileTooLarge { size: 2, limit: 1 },
            AppError::NoFileSelected,
            AppError::Busy,
            AppError::ProcessingFailed(String::new()),
            AppError::Request(String::new()),
            AppError::DownloadFailed(String::new()),
            AppError::Realtime(String::new()),
            AppError::Internal(String::new()),
        ];
        for err in errors {
            assert!(!err.client_message().is_empty(), "{:?}", err);
        }
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let source = anyhow::anyhow!("socket closed").context("Failed to send request");
        let err = AppError::from(source);
        let details = err.detailed_message();
        assert!(details.starts_with("Internal error with source"));
        assert!(details.contains("Caused by"));
    }
}
