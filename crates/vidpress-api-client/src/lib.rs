//! Client for the video processing backend.
//!
//! Provides the HTTP client used for uploads and proxied downloads (`api`)
//! and the real-time channel that pushes processing progress (`realtime`).
//! The CLI crate builds both from a [`ClientConfig`] and hands them to the
//! uploader explicitly.

pub mod api;
pub mod realtime;

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use vidpress_core::ClientConfig;

pub use realtime::{RealtimeClient, RealtimeConnection, RealtimeEvent};

/// HTTP client for the processing backend.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// `request_timeout: None` leaves requests unbounded; uploads of large
    /// files may legitimately take minutes.
    pub fn new(
        base_url: String,
        request_timeout: Option<Duration>,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let mut builder = Client::builder().connect_timeout(connect_timeout);
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(
            config.api_url.clone(),
            config.request_timeout(),
            config.connect_timeout(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Raw client for custom requests.
    pub fn client(&self) -> &Client {
        &self.client
    }
}
