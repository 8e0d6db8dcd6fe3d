//! shelly-exporter - Prometheus exporter for Shelly power-relay devices.
//!
//! On every `/probe` request the exporter fetches the device's JSON status
//! document over HTTP and translates it into Prometheus gauge metrics:
//! wifi signal strength, uptime, temperature, relay states and meter power
//! readings. Device metrics are built in a registry scoped to the single
//! request; the process-wide registry only carries the exporter's own
//! `hit_counter`.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod state;
pub mod status;

// Re-export commonly used types
pub use client::DeviceClient;
pub use error::ProbeError;
pub use state::{AppState, SharedState};
pub use status::DeviceStatus;
