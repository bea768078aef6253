//! Hooks for user feedback
//!
//! The uploader reports every outcome (accepted file, rejected file, request
//! started, finished or failed) through an [`Announcer`]. The command-line
//! front end implements it with a delayed text-to-speech utterance; tests and
//! quiet runs use [`NoOpAnnouncer`].

/// Receiver of spoken status announcements.
///
/// Implementations must return promptly; any delay or I/O happens in the
/// background.
pub trait Announcer: Send + Sync {
    fn announce(&self, message: &str);
}

/// No-op implementation for when speech feedback is disabled
pub struct NoOpAnnouncer;

impl Announcer for NoOpAnnouncer {
    fn announce(&self, _message: &str) {}
}
