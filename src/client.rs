//! HTTP client for fetching a device's status document.

use std::time::Duration;

use tracing::debug;

use crate::error::ProbeError;

/// Client for the outbound `GET http://<target>/status` request.
///
/// Wraps a [`reqwest::Client`] with an explicit request timeout so a hung
/// device cannot pin a scrape indefinitely. The underlying client holds a
/// connection pool and is cheap to clone.
#[derive(Debug, Clone)]
pub struct DeviceClient {
    http: reqwest::Client,
}

impl DeviceClient {
    /// Creates a client whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// Fetches the raw status document from `http://<target>/status`.
    ///
    /// The target string is used verbatim, host or `host:port`. An empty or
    /// malformed target fails at the transport layer like any unreachable
    /// host and surfaces as [`ProbeError::Fetch`].
    pub async fn fetch_status(&self, target: &str) -> Result<Vec<u8>, ProbeError> {
        let url = format!("http://{}/status", target);
        debug!("Fetching device status from {}", url);

        let response = self.http.get(&url).send().await.map_err(ProbeError::Fetch)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(ProbeError::UpstreamStatus(status));
        }

        let body = response.bytes().await.map_err(ProbeError::Fetch)?;
        Ok(body.to_vec())
    }
}
