//! HTTP endpoint handlers for the exporter.
//!
//! This module provides handlers for all HTTP endpoints:
//! - `/`: Static usage hint
//! - `/probe`: Scrape one Shelly device and return its metrics
//! - `/metrics`: Exporter's own metrics endpoint

pub mod metrics;
pub mod probe;
pub mod root;

// Re-export handlers
pub use metrics::metrics_handler;
pub use probe::probe_handler;
pub use root::root_handler;

use axum::{routing::get, Router};

use crate::state::SharedState;

/// Builds the exporter's route table over the given state.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/probe", get(probe_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}
