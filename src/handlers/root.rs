//! Root endpoint handler for the usage hint.

use tracing::{debug, instrument};

/// Handler for the root `/` endpoint.
#[instrument]
pub async fn root_handler() -> &'static str {
    debug!("Processing / request");

    "Go to /probe?target=x.y.z.w to get the metrics for the Shelly device at x.y.z.w,\n\
     or /metrics to get the metrics for the exporter itself\n"
}
