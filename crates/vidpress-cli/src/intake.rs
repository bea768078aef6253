//! File intake.
//!
//! Dragging files onto a terminal pastes their paths as text: quoted
//! (`'/home/me/My Video.mp4'`), backslash-escaped (`/Users/me/My\ Video.mp4`)
//! or as `file://` URIs. [`split_dropped_paths`] turns such text back into
//! paths; only the first one is used, matching a single-file drop target.

use std::path::{Path, PathBuf};

use vidpress_core::{AppError, SelectedVideo};

/// Split pasted/dropped text into individual paths.
///
/// A backslash escapes only whitespace and quote characters, so Windows
/// separators (`C:\Users\me\clip.mp4`) are kept as typed.
pub fn split_dropped_paths(raw: &str) -> Vec<PathBuf> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('"'), '\\') => match chars.next_if_eq(&'"') {
                Some(escaped) => current.push(escaped),
                None => current.push('\\'),
            },
            (Some(_), c) => current.push(c),
            (None, '\'') | (None, '"') => {
                quote = Some(c);
                in_token = true;
            }
            (None, '\\') => {
                match chars.next_if(|next| is_escapable(*next)) {
                    Some(escaped) => current.push(escaped),
                    None => current.push('\\'),
                }
                in_token = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }

    tokens
        .into_iter()
        .filter(|t| !t.is_empty())
        .map(|t| decode_file_uri(&t))
        .collect()
}

fn is_escapable(c: char) -> bool {
    c.is_whitespace() || c == '\'' || c == '"'
}

fn decode_file_uri(token: &str) -> PathBuf {
    match token.strip_prefix("file://") {
        Some(rest) => {
            // file://localhost/path and file:///path both name /path
            let rest = rest.strip_prefix("localhost").unwrap_or(rest);
            let decoded = urlencoding::decode(rest)
                .map(|d| d.into_owned())
                .unwrap_or_else(|_| rest.to_string());
            PathBuf::from(decoded)
        }
        None => PathBuf::from(token),
    }
}

/// First path of a drop, if any.
pub fn first_dropped_path(raw: &str) -> Option<PathBuf> {
    split_dropped_paths(raw).into_iter().next()
}

/// Describe the file at `path` (name, size, guessed content type).
pub async fn inspect(path: &Path) -> Result<SelectedVideo, AppError> {
    let metadata = tokio::fs::metadata(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::InvalidInput(format!("File not found: {}", path.display()))
        } else {
            AppError::InvalidInput(format!("Cannot read {}: {}", path.display(), e))
        }
    })?;

    if !metadata.is_file() {
        return Err(AppError::InvalidInput(format!(
            "{} is not a file",
            path.display()
        )));
    }

    Ok(SelectedVideo::from_path(path, metadata.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_escaped_spaces() {
        assert_eq!(
            split_dropped_paths(r"/Users/me/My\ Video.mp4 "),
            vec![PathBuf::from("/Users/me/My Video.mp4")]
        );
    }

    #[test]
    fn keeps_windows_separators() {
        assert_eq!(
            first_dropped_path(r"C:\Users\me\clip.mp4"),
            Some(PathBuf::from(r"C:\Users\me\clip.mp4"))
        );
        assert_eq!(
            first_dropped_path(r#""C:\My Videos\clip.mp4""#),
            Some(PathBuf::from(r"C:\My Videos\clip.mp4"))
        );
        assert_eq!(
            first_dropped_path(r"\\server\share\clip.mp4"),
            Some(PathBuf::from(r"\\server\share\clip.mp4"))
        );
    }

    #[test]
    fn splits_quoted_paths() {
        assert_eq!(
            split_dropped_paths("'/home/me/My Video.mp4' \"/tmp/b c.mov\""),
            vec![
                PathBuf::from("/home/me/My Video.mp4"),
                PathBuf::from("/tmp/b c.mov")
            ]
        );
    }

    #[test]
    fn decodes_file_uris() {
        assert_eq!(
            split_dropped_paths("file:///home/me/My%20Video.mp4"),
            vec![PathBuf::from("/home/me/My Video.mp4")]
        );
        assert_eq!(
            split_dropped_paths("file://localhost/tmp/a.mp4"),
            vec![PathBuf::from("/tmp/a.mp4")]
        );
    }

    #[test]
    fn first_path_wins() {
        assert_eq!(
            first_dropped_path("/tmp/a.mp4 /tmp/b.mp4"),
            Some(PathBuf::from("/tmp/a.mp4"))
        );
        assert_eq!(first_dropped_path("   "), None);
    }

    #[tokio::test]
    async fn inspect_reads_size_and_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, vec![0u8; 2048]).unwrap();

        let video = inspect(&path).await.unwrap();
        assert_eq!(video.size, 2048);
        assert_eq!(video.content_type, "video/mp4");
        assert_eq!(video.name, "clip.mp4");
    }

    #[tokio::test]
    async fn inspect_rejects_missing_file_and_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            inspect(&dir.path().join("missing.mp4")).await,
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            inspect(dir.path()).await,
            Err(AppError::InvalidInput(_))
        ));
    }
}
