//! Configuration module
//!
//! Client configuration is read from `VIDPRESS_*` environment variables. Every
//! setting has a default so the client runs against a local backend with no
//! environment at all.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::models::{Template, TextSize};

const DEFAULT_API_URL: &str = "http://localhost:5000";
const MAX_FILE_SIZE_MB: u64 = 500;
const REQUEST_TIMEOUT_SECS: u64 = 0;
const CONNECT_TIMEOUT_SECS: u64 = 30;
const SPEECH_DELAY_MS: u64 = 500;

/// Client configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Origin of the processing backend (`/api/upload`, `/api/download`)
    pub api_url: String,
    /// Origin of the real-time progress channel
    pub realtime_url: String,
    pub max_file_size_bytes: u64,
    /// 0 disables the request timeout
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub download_dir: PathBuf,
    pub speech_enabled: bool,
    /// External text-to-speech command (e.g. `espeak`, `say`). None = log only.
    pub speech_command: Option<String>,
    pub speech_delay_ms: u64,
    pub template: Template,
    pub text_size: TextSize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            realtime_url: DEFAULT_API_URL.to_string(),
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            download_dir: PathBuf::from("."),
            speech_enabled: true,
            speech_command: None,
            speech_delay_ms: SPEECH_DELAY_MS,
            template: Template::Default,
            text_size: TextSize::Normal,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("VIDPRESS_API_URL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let realtime_url = lookup("VIDPRESS_REALTIME_URL")
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| api_url.clone());

        let template = match lookup("VIDPRESS_TEMPLATE") {
            Some(raw) => raw
                .parse()
                .map_err(|e| anyhow::anyhow!("VIDPRESS_TEMPLATE: {}", e))?,
            None => Template::Default,
        };

        let large_text = parse_bool(lookup("VIDPRESS_LARGE_TEXT"), false);

        let max_file_size_mb = lookup("VIDPRESS_MAX_FILE_SIZE_MB")
            .unwrap_or_else(|| MAX_FILE_SIZE_MB.to_string())
            .parse::<u64>()
            .unwrap_or(MAX_FILE_SIZE_MB);
        let max_file_size_bytes = max_file_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "VIDPRESS_MAX_FILE_SIZE_MB is too large: {}",
                    max_file_size_mb
                )
            })?;

        let config = ClientConfig {
            api_url,
            realtime_url,
            max_file_size_bytes,
            request_timeout_secs: lookup("VIDPRESS_REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|| REQUEST_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(REQUEST_TIMEOUT_SECS),
            connect_timeout_secs: lookup("VIDPRESS_CONNECT_TIMEOUT_SECS")
                .unwrap_or_else(|| CONNECT_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECT_TIMEOUT_SECS),
            download_dir: lookup("VIDPRESS_DOWNLOAD_DIR")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            speech_enabled: parse_bool(lookup("VIDPRESS_SPEECH_ENABLED"), true),
            speech_command: lookup("VIDPRESS_SPEECH_COMMAND").filter(|s| !s.trim().is_empty()),
            speech_delay_ms: lookup("VIDPRESS_SPEECH_DELAY_MS")
                .unwrap_or_else(|| SPEECH_DELAY_MS.to_string())
                .parse()
                .unwrap_or(SPEECH_DELAY_MS),
            template,
            text_size: if large_text {
                TextSize::Large
            } else {
                TextSize::Normal
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !is_http_origin(&self.api_url) {
            return Err(anyhow::anyhow!(
                "VIDPRESS_API_URL must start with http:// or https://"
            ));
        }

        if !is_http_origin(&self.realtime_url)
            && !self.realtime_url.starts_with("ws://")
            && !self.realtime_url.starts_with("wss://")
        {
            return Err(anyhow::anyhow!(
                "VIDPRESS_REALTIME_URL must start with http(s):// or ws(s)://"
            ));
        }

        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "VIDPRESS_MAX_FILE_SIZE_MB must be greater than zero"
            ));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn speech_delay(&self) -> Duration {
        Duration::from_millis(self.speech_delay_ms)
    }
}

fn parse_bool(raw: Option<String>, default: bool) -> bool {
    raw.map(|s| s.trim().to_lowercase())
        .and_then(|s| match s.as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn is_http_origin(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
