//! Overlay persistence client
//!
//! CRUD calls against `/overlay/{user}`. Users are free-form strings and are
//! percent-encoded into the path; there is no authentication.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{normalize_base, ApiError, DEFAULT_API_BASE};
use crate::models::{MalformedRecord, OverlayElement, OverlayRecord, OverlaySet};

#[derive(Debug, Serialize)]
struct CreateBody<'a> {
    rtsp_url: &'a str,
    hls_url: &'a str,
    element: [OverlayElement; 2],
}

#[derive(Debug, Serialize)]
struct UpdateBody {
    element: [OverlayElement; 2],
}

/// Stored document; everything except `element` is ignored.
///
/// Elements stay untyped here so a wrong shape is reported as a malformed
/// record rather than an unparsable response.
#[derive(Debug, Deserialize)]
struct StoredOverlay {
    #[serde(default)]
    element: Value,
}

impl StoredOverlay {
    fn into_overlays(self) -> Result<OverlaySet, MalformedRecord> {
        let items = match self.element {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            _ => return Err(MalformedRecord { found: 0 }),
        };
        let found = items.len();
        let elements = items
            .into_iter()
            .map(serde_json::from_value::<OverlayElement>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| MalformedRecord { found })?;
        OverlaySet::from_elements(elements)
    }
}

/// Client for the overlay endpoints
#[derive(Debug, Clone)]
pub struct OverlayClient {
    base_url: String,
    client: reqwest::Client,
}

impl OverlayClient {
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

    fn url_for(&self, user: &str) -> String {
        format!("{}/overlay/{}", self.base_url, urlencoding::encode(user))
    }

    /// Store a new record for `user` (POST)
    pub async fn create(&self, user: &str, record: &OverlayRecord) -> Result<(), ApiError> {
        let body = CreateBody {
            rtsp_url: &record.rtsp_url,
            hls_url: &record.hls_url,
            element: record.overlays.to_elements(),
        };
        let response = self.client.post(self.url_for(user)).json(&body).send().await?;
        check_status(response.status(), "create", user)?;
        info!(user, "overlay created");
        Ok(())
    }

    /// Replace the elements stored for `user` (PUT)
    pub async fn update(&self, user: &str, overlays: &OverlaySet) -> Result<(), ApiError> {
        let body = UpdateBody {
            element: overlays.to_elements(),
        };
        let response = self.client.put(self.url_for(user)).json(&body).send().await?;
        check_status(response.status(), "update", user)?;
        info!(user, "overlay updated");
        Ok(())
    }

    /// Fetch the record stored for `user`.
    ///
    /// Fails with [`ApiError::Malformed`] unless the stored list is exactly
    /// one Text and one Logo element.
    pub async fn restore(&self, user: &str) -> Result<OverlaySet, ApiError> {
        let response = self.client.get(self.url_for(user)).send().await?;
        check_status(response.status(), "restore", user)?;

        let text = response.text().await?;
        let stored: StoredOverlay = serde_json::from_str(&text)?;
        debug!(user, "overlay fetched");

        let overlays = stored.into_overlays().inspect_err(|e| {
            warn!(user, error = %e, "stored overlay rejected");
        })?;
        info!(user, "overlay restored");
        Ok(overlays)
    }

    /// Remove the record stored for `user`
    pub async fn delete(&self, user: &str) -> Result<(), ApiError> {
        let response = self.client.delete(self.url_for(user)).send().await?;
        check_status(response.status(), "delete", user)?;
        info!(user, "overlay deleted");
        Ok(())
    }
}

impl Default for OverlayClient {
    fn default() -> Self {
        Self::new()
    }
}

fn check_status(status: reqwest::StatusCode, op: &str, user: &str) -> Result<(), ApiError> {
    if status.is_success() {
        Ok(())
    } else {
        warn!(%status, op, user, "overlay request rejected");
        Err(ApiError::Status(status))
    }
}
