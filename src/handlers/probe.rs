//! Probe endpoint handler: one device scrape per request.

use axum::extract::{Query, State};
use prometheus::Registry;
use serde::Deserialize;
use tracing::{debug, error, instrument};

use crate::error::ProbeError;
use crate::metrics::{render, DeviceMetrics};
use crate::state::SharedState;
use crate::status::decode_status;

/// Query parameters accepted by the `/probe` endpoint.
#[derive(Debug, Deserialize)]
pub struct ProbeParams {
    /// Device address, `host` or `host:port`. Passed through verbatim; a
    /// missing or empty target simply fails at fetch time.
    #[serde(default)]
    pub target: String,
}

/// Handler for the `/probe` endpoint.
///
/// Runs the fetch → decode → map → render pipeline against the requested
/// target. Device metrics are registered into a registry created for this
/// one request, so concurrent scrapes cannot see each other's samples and
/// nothing accumulates across requests.
#[instrument(skip(state))]
pub async fn probe_handler(
    State(state): State<SharedState>,
    Query(params): Query<ProbeParams>,
) -> Result<String, ProbeError> {
    // Counted before any fallible step so failed scrapes show up too.
    state.hit_counter.inc();
    debug!("Processing /probe request for target '{}'", params.target);

    let body = state.client.fetch_status(&params.target).await?;

    let status = match decode_status(&body) {
        Ok(status) => status,
        Err(err) => {
            // The client gets a generic message; the parse detail is for
            // the operator log only.
            if let ProbeError::Decode(source) = &err {
                error!("Failed to decode device status: {}", source);
            }
            return Err(err);
        }
    };

    let registry = Registry::new();
    let metrics = DeviceMetrics::new(&registry)?;
    metrics.record(&status);

    Ok(render(&registry)?)
}
