//! Application state shared across HTTP handlers.

use std::sync::Arc;

use prometheus::{Counter, Registry};

use crate::client::DeviceClient;
use crate::config::Config;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// Process-wide state, assembled once at startup and handed to every
/// request handler. The registry here only carries the exporter's own
/// `hit_counter`; device metrics live in per-request registries.
pub struct AppState {
    pub registry: Registry,
    pub hit_counter: Counter,
    pub client: DeviceClient,
    pub config: Arc<Config>,
}
