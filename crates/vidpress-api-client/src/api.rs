//! Domain methods for the processing backend.
//!
//! - `POST /api/upload?action=<action>` with the file in multipart field `video`
//! - `GET /api/download?url=<urlencoded>` proxying the processed result

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};
use vidpress_core::{Action, AppError, ProcessingResponse, SelectedVideo};

use crate::ApiClient;

pub const UPLOAD_PATH: &str = "/api/upload";
pub const DOWNLOAD_PATH: &str = "/api/download";

const DEFAULT_EXTENSION: &str = "mp4";

impl ApiClient {
    /// Upload a validated video for processing and return the processed-video URL.
    ///
    /// The body is streamed from disk. The JSON envelope is honored even on
    /// non-2xx statuses so a server-provided `error` reaches the user.
    pub async fn upload_video(
        &self,
        video: &SelectedVideo,
        action: Action,
    ) -> Result<String, AppError> {
        let file = tokio::fs::File::open(&video.path).await.map_err(|e| {
            AppError::InvalidInput(format!("Failed to open {}: {}", video.path.display(), e))
        })?;

        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let part = reqwest::multipart::Part::stream_with_length(body, video.size)
            .file_name(video.name.clone())
            .mime_str(&video.content_type)
            .map_err(|e| AppError::InvalidInput(format!("Invalid content type: {}", e)))?;
        let form = reqwest::multipart::Form::new().part("video", part);

        let url = self.build_url(UPLOAD_PATH);
        info!(
            action = %action,
            file = %video.name,
            size_bytes = video.size,
            "Uploading video for processing"
        );

        let response = self
            .client()
            .post(&url)
            .query(&[("action", action.as_str())])
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Request(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::Request(format!("Failed to read response: {}", e)))?;

        match serde_json::from_str::<ProcessingResponse>(&text) {
            Ok(envelope) => {
                debug!(status = %status, success = envelope.success, "Upload response received");
                envelope.into_result()
            }
            Err(e) if status.is_success() => Err(AppError::Request(format!(
                "Failed to parse response as JSON: {}",
                e
            ))),
            Err(_) => Err(AppError::Request(format!(
                "API request failed with status {}: {}",
                status, text
            ))),
        }
    }

    /// Proxy URL through which the processed video can be fetched or played.
    pub fn download_proxy_url(&self, url: &str) -> String {
        self.build_url(&format!(
            "{}?url={}",
            DOWNLOAD_PATH,
            urlencoding::encode(url)
        ))
    }

    /// Download a processed video through the backend proxy into `dest_dir`.
    ///
    /// Returns the path of the written file, named
    /// `processed-video-<unix millis>.<ext>`. A partially written file is
    /// removed on failure.
    pub async fn download_video(&self, url: &str, dest_dir: &Path) -> Result<PathBuf, AppError> {
        let proxy_url = self.download_proxy_url(url);
        let mut response = self
            .client()
            .get(&proxy_url)
            .send()
            .await
            .map_err(|e| AppError::DownloadFailed(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::DownloadFailed(format!(
                "Download proxy responded with status {}",
                status
            )));
        }

        tokio::fs::create_dir_all(dest_dir).await.map_err(|e| {
            AppError::DownloadFailed(format!("Failed to create {}: {}", dest_dir.display(), e))
        })?;
        let dest = dest_dir.join(processed_file_name(
            url,
            chrono::Utc::now().timestamp_millis(),
        ));

        let mut file = tokio::fs::File::create(&dest).await.map_err(|e| {
            AppError::DownloadFailed(format!("Failed to create {}: {}", dest.display(), e))
        })?;

        let mut written: u64 = 0;
        let result: Result<(), AppError> = async {
            while let Some(chunk) = response
                .chunk()
                .await
                .map_err(|e| AppError::DownloadFailed(format!("Failed to read body: {}", e)))?
            {
                file.write_all(&chunk)
                    .await
                    .map_err(|e| AppError::DownloadFailed(format!("Failed to write: {}", e)))?;
                written += chunk.len() as u64;
            }
            file.flush()
                .await
                .map_err(|e| AppError::DownloadFailed(format!("Failed to write: {}", e)))
        }
        .await;

        if let Err(err) = result {
            warn!(path = %dest.display(), error = %err, "Removing partial download");
            drop(file);
            let _ = tokio::fs::remove_file(&dest).await;
            return Err(err);
        }

        info!(path = %dest.display(), bytes = written, "Processed video downloaded");
        Ok(dest)
    }
}

/// `processed-video-<timestamp>.<ext>`, with the extension taken from the
/// URL path when it looks like one.
pub fn processed_file_name(url: &str, timestamp_millis: i64) -> String {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let last_segment = path.rsplit('/').next().unwrap_or_default();
    let extension = last_segment
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_lowercase())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());

    format!("processed-video-{}.{}", timestamp_millis, extension)
}
