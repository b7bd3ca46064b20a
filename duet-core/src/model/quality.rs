use crate::model::peer::UserId;
use crate::model::state::TransportState;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Raw counters pulled from the transport for video and the active
/// candidate pair. `packets_received` and `packets_lost` always describe the
/// same stream so their ratio is a loss rate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QualitySample {
    pub timestamp_ms: f64,
    pub bytes_received: u64,
    pub packets_received: u64,
    pub packets_lost: u64,
    pub rtt_seconds: Option<f64>,
    pub frame_width: Option<u32>,
    pub frame_height: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Metrics derived from two consecutive samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityRecord {
    pub bitrate_kbps: u32,
    pub packet_loss_pct: u32,
    pub latency_ms: Option<u32>,
    pub resolution: Option<Resolution>,
    pub transport_state: TransportState,
    pub watchdog_triggered: bool,
}

/// The record shape handed to the external telemetry sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryRecord {
    pub session_id: Uuid,
    pub user_id: UserId,
    pub bitrate_kbps: u32,
    pub packet_loss_pct: u32,
    pub latency_ms: Option<u32>,
    pub resolution: Option<String>,
    pub connection_state: TransportState,
    pub watchdog_triggered: bool,
}

impl TelemetryRecord {
    pub fn from_quality(session_id: Uuid, user_id: UserId, record: &QualityRecord) -> Self {
        Self {
            session_id,
            user_id,
            bitrate_kbps: record.bitrate_kbps,
            packet_loss_pct: record.packet_loss_pct,
            latency_ms: record.latency_ms,
            resolution: record.resolution.map(|r| r.to_string()),
            connection_state: record.transport_state,
            watchdog_triggered: record.watchdog_triggered,
        }
    }
}
