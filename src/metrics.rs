//! Prometheus metrics for one probed device, and text rendering.
//!
//! [`DeviceMetrics`] holds the five gauge families derived from a device
//! status document. It is constructed against a registry scoped to a single
//! `/probe` request and dropped with it, so concurrent scrapes never share
//! samples.

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};

use crate::status::DeviceStatus;

/// Gauge families for one device scrape.
pub struct DeviceMetrics {
    wifi_rssi: GaugeVec,
    uptime_seconds: GaugeVec,
    temperature_celsius: GaugeVec,
    relay_status: GaugeVec,
    meter_power_watts: GaugeVec,
}

impl DeviceMetrics {
    /// Creates the gauge families and registers them with `registry`.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let wifi_rssi = GaugeVec::new(
            Opts::new(
                "shelly_wifi_rssi",
                "RSSI of the Shelly device's WiFi connection",
            ),
            &["ip", "ssid"],
        )?;
        let uptime_seconds = GaugeVec::new(
            Opts::new(
                "shelly_uptime_seconds",
                "Uptime of the Shelly device in seconds",
            ),
            &["ip"],
        )?;
        let temperature_celsius = GaugeVec::new(
            Opts::new(
                "shelly_temperature_celsius",
                "Temperature of the Shelly device in Celsius",
            ),
            &["ip"],
        )?;
        let relay_status = GaugeVec::new(
            Opts::new(
                "shelly_relay_status",
                "Status of the Shelly device's relays (1 for on, 0 for off)",
            ),
            &["ip", "relay"],
        )?;
        let meter_power_watts = GaugeVec::new(
            Opts::new(
                "shelly_meter_power_watts",
                "Power consumption of the Shelly device's meters in watts",
            ),
            &["ip", "meter"],
        )?;

        registry.register(Box::new(wifi_rssi.clone()))?;
        registry.register(Box::new(uptime_seconds.clone()))?;
        registry.register(Box::new(temperature_celsius.clone()))?;
        registry.register(Box::new(relay_status.clone()))?;
        registry.register(Box::new(meter_power_watts.clone()))?;

        Ok(Self {
            wifi_rssi,
            uptime_seconds,
            temperature_celsius,
            relay_status,
            meter_power_watts,
        })
    }

    /// Populates the gauges from a decoded status document.
    ///
    /// The `ip` label on every sample is the address the device reports for
    /// itself in `wifi_sta.ip`, not the scrape target string. Relays and
    /// meters are labeled by their zero-based position in the arrays.
    pub fn record(&self, status: &DeviceStatus) {
        let ip = status.wifi_sta.ip.as_str();

        self.wifi_rssi
            .with_label_values(&[ip, status.wifi_sta.ssid.as_str()])
            .set(status.wifi_sta.rssi as f64);

        self.uptime_seconds
            .with_label_values(&[ip])
            .set(status.uptime as f64);

        self.temperature_celsius
            .with_label_values(&[ip])
            .set(status.temperature);

        for (i, relay) in status.relays.iter().enumerate() {
            self.relay_status
                .with_label_values(&[ip, &i.to_string()])
                .set(if relay.ison { 1.0 } else { 0.0 });
        }

        for (i, meter) in status.meters.iter().enumerate() {
            self.meter_power_watts
                .with_label_values(&[ip, &i.to_string()])
                .set(meter.power);
        }
    }
}

/// Renders all samples of `registry` in the Prometheus text exposition
/// format.
pub fn render(registry: &Registry) -> Result<String, prometheus::Error> {
    let families = registry.gather();
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    encoder.encode(&families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
