//! Terminal status view.
//!
//! A pure function of [`UploaderState`]; the binary redraws it whenever the
//! state channel changes. Template and text size only affect presentation.

use std::fmt::Write as _;

use vidpress_core::{Percentage, Phase, Template, TextSize, UploaderState};

use crate::{format_bytes, truncate_string};

const NAME_WIDTH: usize = 40;

fn title(template: Template) -> &'static str {
    match template {
        Template::Default => "Video Processing Studio",
        Template::School => "School Project Video Studio",
        Template::Birthday => "Birthday Video Studio",
    }
}

fn border_char(template: Template) -> char {
    match template {
        Template::Default => '=',
        Template::School => '-',
        Template::Birthday => '*',
    }
}

fn bar_width(text_size: TextSize) -> usize {
    if text_size.is_large() {
        40
    } else {
        20
    }
}

fn label(text: &str, text_size: TextSize) -> String {
    if text_size.is_large() {
        text.to_uppercase()
    } else {
        text.to_string()
    }
}

/// `[#####---------------]  25%`
pub fn progress_bar(progress: Percentage, width: usize) -> String {
    let filled = (progress.value() as usize * width) / 100;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(width - filled),
        progress.value()
    )
}

/// Single-line progress display used for in-place redraws.
pub fn progress_line(state: &UploaderState) -> String {
    let action = if state.progress.is_complete() {
        "Complete"
    } else {
        state
            .action
            .map(|a| a.progressive())
            .unwrap_or("Processing")
    };
    format!(
        "{} {}",
        label(action, state.text_size),
        progress_bar(state.progress, bar_width(state.text_size))
    )
}

/// Full status view.
pub fn render(state: &UploaderState) -> String {
    let size = state.text_size;
    let title = label(title(state.template), size);
    let rule: String = std::iter::repeat(border_char(state.template))
        .take(title.chars().count() + 4)
        .collect();

    let mut out = String::new();
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "  {}", title);
    let _ = writeln!(out, "{}", rule);

    if state.dragging {
        let _ = writeln!(out, "{}", label("Drop your video here", size));
    }

    match &state.file {
        Some(file) => {
            let _ = writeln!(
                out,
                "{}: {} ({}, {})",
                label("File", size),
                truncate_string(&file.name, NAME_WIDTH),
                format_bytes(file.size),
                file.content_type
            );
        }
        None => {
            let _ = writeln!(
                out,
                "{}",
                label("Drag and drop a video file, or choose one to upload", size)
            );
        }
    }

    if state.phase == Phase::Processing || state.progress.value() > 0 {
        let _ = writeln!(out, "{}", progress_line(state));
    }

    if let Some(error) = &state.error {
        let _ = writeln!(out, "{}: {}", label("Error", size), error);
    }

    if let Some(url) = &state.download_url {
        let _ = writeln!(out, "{}: {}", label("Ready", size), url);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidpress_core::{Action, SelectedVideo};

    fn state_with_file() -> UploaderState {
        let mut state = UploaderState::default();
        state
            .select_file(
                SelectedVideo::from_path("/videos/clip.mp4", 10 * 1024 * 1024),
                500 * 1024 * 1024,
            )
            .unwrap();
        state
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(Percentage::ZERO, 10), "[----------]   0%");
        assert_eq!(progress_bar(Percentage::from(50), 10), "[#####-----]  50%");
        assert_eq!(progress_bar(Percentage::COMPLETE, 10), "[##########] 100%");
    }

    #[test]
    fn idle_view_prompts_for_a_file() {
        let view = render(&UploaderState::default());
        assert!(view.contains("Video Processing Studio"));
        assert!(view.contains("Drag and drop a video file"));
        assert!(!view.contains('#'));
    }

    #[test]
    fn templates_change_title_and_border() {
        let school = render(&UploaderState::new(Template::School, TextSize::Normal));
        assert!(school.starts_with("---"));
        assert!(school.contains("School Project Video Studio"));

        let birthday = render(&UploaderState::new(Template::Birthday, TextSize::Normal));
        assert!(birthday.starts_with("***"));
    }

    #[test]
    fn large_text_widens_bar_and_uppercases_labels() {
        let mut state = state_with_file();
        state.toggle_text_size();
        state.begin_processing(Action::Trim).unwrap();
        state.apply_progress(Percentage::from(25));

        let line = progress_line(&state);
        assert!(line.starts_with("TRIMMING ["));
        assert_eq!(line.matches('#').count(), 10);
        assert!(render(&state).contains("FILE: clip.mp4"));
    }

    #[test]
    fn shows_file_details_progress_and_result() {
        let mut state = state_with_file();
        state.begin_processing(Action::Compress).unwrap();
        state.apply_progress(Percentage::from(40));
        let view = render(&state);
        assert!(view.contains("File: clip.mp4 (10.0 MB, video/mp4)"));
        assert!(view.contains("Compressing [########------------]  40%"));

        state.complete("https://x/y.mp4".to_string());
        let view = render(&state);
        assert!(view.contains("Complete [####################] 100%"));
        assert!(view.contains("Ready: https://x/y.mp4"));
    }

    #[test]
    fn shows_error_and_drag_hint() {
        let mut state = UploaderState::default();
        state.drag_enter();
        let _ = state.select_file(SelectedVideo::from_path("/tmp/cat.png", 10), 100);
        state.drag_enter();
        let view = render(&state);
        assert!(view.contains("Drop your video here"));
        assert!(view.contains("Error: Please upload a valid video file (MP4, AVI, MOV)"));
    }
}
