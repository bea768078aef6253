use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Body returned by `POST /api/upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessingResponse {
    /// Resolve the response into the processed-video URL.
    ///
    /// `success: true` without a non-empty `url` is treated as a failure.
    pub fn into_result(self) -> Result<String, AppError> {
        match (self.success, self.url) {
            (true, Some(url)) if !url.trim().is_empty() => Ok(url),
            (true, _) => Err(AppError::ProcessingFailed(
                "Server reported success without a download URL".to_string(),
            )),
            (false, _) => Err(AppError::ProcessingFailed(
                self.error.unwrap_or_default(),
            )),
        }
    }
}
