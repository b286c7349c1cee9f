//! Clients for the streaming backend
//!
//! - stream: starts RTSP→HLS transcoding and resolves the playable endpoint
//! - overlay: stores and restores overlay records keyed by user

pub mod overlay;
pub mod stream;

pub use overlay::OverlayClient;
pub use stream::StreamClient;

use reqwest::StatusCode;
use thiserror::Error;

use crate::models::MalformedRecord;

/// Backend location used when nothing else is configured
pub const DEFAULT_API_BASE: &str = "http://localhost:5001";

/// Errors from backend calls
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("RTSP URL is empty")]
    EmptyUrl,
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("backend returned HTTP {0}")]
    Status(StatusCode),
    #[error("could not parse backend response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("stored overlay is malformed: {0}")]
    Malformed(#[from] MalformedRecord),
}

impl ApiError {
    /// True for an HTTP 404 from the backend
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status(StatusCode::NOT_FOUND))
    }
}

/// Both backend clients, sharing one base URL and connection pool
#[derive(Debug, Clone)]
pub struct Backend {
    pub streams: StreamClient,
    pub overlays: OverlayClient,
}

impl Backend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = normalize_base(&base_url.into());
        let client = reqwest::Client::new();
        Self {
            streams: StreamClient::with_client(base_url.clone(), client.clone()),
            overlays: OverlayClient::with_client(base_url, client),
        }
    }
}

/// Strip trailing slashes so paths can be appended with `/`
pub(crate) fn normalize_base(base: &str) -> String {
    base.trim().trim_end_matches('/').to_string()
}
