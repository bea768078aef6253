//! Client-side checks run before a file is accepted for processing.

use tracing::debug;

use crate::error::AppError;
use crate::models::SelectedVideo;

/// 500 MiB
pub const DEFAULT_MAX_VIDEO_SIZE_BYTES: u64 = 500 * 1024 * 1024;

/// Validate a candidate file: content type must start with `video/` and the
/// size must not exceed `max_size_bytes`. The type check runs first.
pub fn validate_video(video: &SelectedVideo, max_size_bytes: u64) -> Result<(), AppError> {
    if !video.is_video() {
        debug!(file = %video.name, content_type = %video.content_type, "Rejected non-video file");
        return Err(AppError::InvalidFileType(video.content_type.clone()));
    }

    if video.size > max_size_bytes {
        debug!(file = %video.name, size_bytes = video.size, limit_bytes = max_size_bytes, "Rejected oversized file");
        return Err(AppError::FileTooLarge {
            size: video.size,
            limit: max_size_bytes,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorMetadata;

    fn candidate(content_type: &str, size: u64) -> SelectedVideo {
        SelectedVideo {
            path: "clip".into(),
            name: "clip".to_string(),
            size,
            content_type: content_type.to_string(),
        }
    }

    #[test]
    fn accepts_video_at_exact_limit() {
        let video = candidate("video/mp4", DEFAULT_MAX_VIDEO_SIZE_BYTES);
        assert!(validate_video(&video, DEFAULT_MAX_VIDEO_SIZE_BYTES).is_ok());
    }

    #[test]
    fn rejects_one_byte_over_limit() {
        let video = candidate("video/mp4", DEFAULT_MAX_VIDEO_SIZE_BYTES + 1);
        let err = validate_video(&video, DEFAULT_MAX_VIDEO_SIZE_BYTES).unwrap_err();
        assert!(matches!(err, AppError::FileTooLarge { .. }));
    }

    #[test]
    fn rejects_600mb_with_limit_message() {
        let video = candidate("video/mp4", 600 * 1024 * 1024);
        let err = validate_video(&video, DEFAULT_MAX_VIDEO_SIZE_BYTES).unwrap_err();
        assert_eq!(err.client_message(), "File size exceeds 500MB limit");
    }

    #[test]
    fn rejects_non_video_types_regardless_of_size() {
        for content_type in ["image/png", "audio/mpeg", "application/octet-stream", ""] {
            let err = validate_video(&candidate(content_type, 10), DEFAULT_MAX_VIDEO_SIZE_BYTES)
                .unwrap_err();
            assert_eq!(
                err.client_message(),
                "Please upload a valid video file (MP4, AVI, MOV)"
            );
        }
    }

    #[test]
    fn type_check_wins_over_size_check() {
        let err = validate_video(&candidate("image/png", u64::MAX), DEFAULT_MAX_VIDEO_SIZE_BYTES)
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidFileType(_)));
    }

    #[test]
    fn accepts_empty_video_file() {
        assert!(validate_video(&candidate("video/webm", 0), DEFAULT_MAX_VIDEO_SIZE_BYTES).is_ok());
    }
}
