//! Device status document model and decoder.
//!
//! The Shelly device reports its state as a JSON document at
//! `http://<device>/status`. Only the fields the exporter maps to metrics
//! are modeled here; everything else in the payload is ignored so newer
//! firmware with richer documents keeps working. Absent fields decode to
//! their zero values.

use serde::Deserialize;

use crate::error::ProbeError;

/// Wifi station block of the status document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WifiStation {
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub ssid: String,
    /// IP address the device reports for itself. Used as the `ip` label on
    /// all device metrics, not the scrape target.
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub rssi: i64,
}

/// One relay channel.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelayState {
    #[serde(default)]
    pub ison: bool,
}

/// One power meter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeterReading {
    /// Current power draw in watts.
    #[serde(default)]
    pub power: f64,
}

/// Decoded device status, immutable for the duration of one scrape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceStatus {
    #[serde(default)]
    pub wifi_sta: WifiStation,
    #[serde(default)]
    pub relays: Vec<RelayState>,
    #[serde(default)]
    pub meters: Vec<MeterReading>,
    /// Device uptime in seconds.
    #[serde(default)]
    pub uptime: u64,
    /// Device temperature in Celsius.
    #[serde(default)]
    pub temperature: f64,
}

/// Decodes a raw status payload into a [`DeviceStatus`].
pub fn decode_status(raw: &[u8]) -> Result<DeviceStatus, ProbeError> {
    serde_json::from_slice(raw).map_err(ProbeError::Decode)
}
