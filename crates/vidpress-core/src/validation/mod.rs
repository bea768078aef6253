//! Validation modules

pub mod video;

pub use video::{validate_video, DEFAULT_MAX_VIDEO_SIZE_BYTES};
