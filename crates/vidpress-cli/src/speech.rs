//! Spoken status announcements.
//!
//! Each announcement is delayed (500 ms by default) so a screen reader can
//! finish with the preceding output, then logged and, when a text-to-speech
//! command is configured, passed to it as a single argument.

use std::time::Duration;

use tokio_util::task::TaskTracker;
use tracing::{info, warn};
use vidpress_core::{Announcer, ClientConfig};

pub struct SpeechAnnouncer {
    command: Option<String>,
    delay: Duration,
    tracker: TaskTracker,
}

impl SpeechAnnouncer {
    pub fn new(command: Option<String>, delay: Duration) -> Self {
        Self {
            command,
            delay,
            tracker: TaskTracker::new(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.speech_command.clone(), config.speech_delay())
    }

    /// Wait for every pending announcement to be spoken.
    pub async fn flush(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}

impl Announcer for SpeechAnnouncer {
    fn announce(&self, message: &str) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                info!(announcement = %message, "Announcement");
                return;
            }
        };

        let message = message.to_string();
        let command = self.command.clone();
        let delay = self.delay;
        self.tracker.spawn_on(
            async move {
                tokio::time::sleep(delay).await;
                info!(announcement = %message, "Announcement");
                if let Some(command) = command {
                    speak(&command, &message).await;
                }
            },
            &handle,
        );
    }
}

async fn speak(command: &str, message: &str) {
    match tokio::process::Command::new(command)
        .arg(message)
        .status()
        .await
    {
        Ok(status) if status.success() => {}
        Ok(status) => warn!(command = %command, status = %status, "Speech command failed"),
        Err(e) => warn!(command = %command, error = %e, "Failed to run speech command"),
    }
}

/// Announcer that records messages, for tests.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingAnnouncer {
    messages: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingAnnouncer {
    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
impl Announcer for RecordingAnnouncer {
    fn announce(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn announcement_waits_for_delay() {
        let announcer = SpeechAnnouncer::new(None, Duration::from_millis(500));
        announcer.announce("Video file selected");

        let started = tokio::time::Instant::now();
        announcer.flush().await;
        assert!(started.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test]
    async fn missing_speech_command_is_not_fatal() {
        let announcer = SpeechAnnouncer::new(
            Some("vidpress-no-such-tts-binary".to_string()),
            Duration::ZERO,
        );
        announcer.announce("hello");
        announcer.flush().await;
    }

    #[test]
    fn announce_outside_runtime_only_logs() {
        let announcer = SpeechAnnouncer::new(None, Duration::from_millis(500));
        announcer.announce("no runtime here");
        assert!(announcer.tracker.is_empty());
    }
}
