//! Stream session client
//!
//! Asks the backend to start transcoding an RTSP source and turns the
//! returned manifest path into an absolute HLS URL for the player.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{normalize_base, ApiError, DEFAULT_API_BASE};

#[derive(Debug, Serialize)]
struct StartStreamRequest<'a> {
    rtsp_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct StartStreamResponse {
    hls_url: String,
    #[serde(default)]
    message: Option<String>,
}

/// Client for `POST /start_stream`
#[derive(Debug, Clone)]
pub struct StreamClient {
    base_url: String,
    client: reqwest::Client,
}

impl StreamClient {
    /// Create a client against the default local backend
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_API_BASE)
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub(crate) fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: normalize_base(&base_url.into()),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start transcoding `rtsp_url`, returning the playable HLS endpoint.
    ///
    /// An empty URL is rejected before any request is made.
    pub async fn start_stream(&self, rtsp_url: &str) -> Result<String, ApiError> {
        let rtsp_url = rtsp_url.trim();
        if rtsp_url.is_empty() {
            return Err(ApiError::EmptyUrl);
        }

        let url = format!("{}/start_stream", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&StartStreamRequest { rtsp_url })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, rtsp_url, "start_stream rejected");
            return Err(ApiError::Status(status));
        }

        let text = response.text().await?;
        let data: StartStreamResponse = serde_json::from_str(&text)?;
        let endpoint = resolve_endpoint(&self.base_url, &data.hls_url);

        info!(
            rtsp_url,
            endpoint = %endpoint,
            message = data.message.as_deref().unwrap_or(""),
            "stream started"
        );
        Ok(endpoint)
    }
}

impl Default for StreamClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Join the backend base with the manifest path it returned.
///
/// Absolute URLs pass through untouched.
pub fn resolve_endpoint(base_url: &str, hls_url: &str) -> String {
    if hls_url.starts_with("http://") || hls_url.starts_with("https://") {
        return hls_url.to_string();
    }
    let base = base_url.trim_end_matches('/');
    if hls_url.starts_with('/') {
        format!("{}{}", base, hls_url)
    } else {
        format!("{}/{}", base, hls_url)
    }
}
