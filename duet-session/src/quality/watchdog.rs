use crate::quality::{bitrate_kbps, latency_ms, packet_loss_pct, resolution};
use duet_core::{QualityRecord, QualitySample, TransportState};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchdogConfig {
    pub interval_ms: u64,
    pub min_bitrate_kbps: u32,
    pub max_packet_loss_pct: u32,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            min_bitrate_kbps: 100,
            max_packet_loss_pct: 10,
        }
    }
}

impl WatchdogConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

/// Turns raw samples into [`QualityRecord`]s and decides when connectivity
/// should be restarted. Keeps only the previous sample.
#[derive(Debug)]
pub struct Watchdog {
    config: WatchdogConfig,
    previous: Option<QualitySample>,
}

impl Watchdog {
    pub fn new(config: WatchdogConfig) -> Self {
        Self {
            config,
            previous: None,
        }
    }

    pub fn config(&self) -> &WatchdogConfig {
        &self.config
    }

    /// Derives a record from `sample` and the previous one. `armed` is false
    /// while negotiation has not reached a connected state; the record is
    /// still produced but never flags a restart.
    pub fn evaluate(
        &mut self,
        sample: QualitySample,
        transport_state: TransportState,
        armed: bool,
    ) -> QualityRecord {
        let previous = self.previous.take();

        let bitrate = bitrate_kbps(previous.as_ref(), &sample);
        let loss = packet_loss_pct(previous.as_ref(), &sample);

        let low_bitrate = previous.is_some() && bitrate < self.config.min_bitrate_kbps;
        let lossy = loss > self.config.max_packet_loss_pct;
        let disconnected = transport_state == TransportState::Disconnected;

        let record = QualityRecord {
            bitrate_kbps: bitrate,
            packet_loss_pct: loss,
            latency_ms: latency_ms(&sample),
            resolution: resolution(&sample),
            transport_state,
            watchdog_triggered: armed && (low_bitrate || lossy || disconnected),
        };

        self.previous = Some(sample);
        record
    }

    pub fn reset(&mut self) {
        self.previous = None;
    }
}
