//! Arithmetic over two consecutive [`QualitySample`]s.

use duet_core::{QualitySample, Resolution};

/// Inbound bitrate in kbit/s (1 kbit = 1024 bits). Zero without a previous
/// sample or when the clock did not advance.
pub fn bitrate_kbps(previous: Option<&QualitySample>, current: &QualitySample) -> u32 {
    let Some(previous) = previous else {
        return 0;
    };

    let seconds = (current.timestamp_ms - previous.timestamp_ms) / 1000.0;
    if seconds <= 0.0 {
        return 0;
    }

    let bytes = current
        .bytes_received
        .saturating_sub(previous.bytes_received) as f64;
    ((bytes * 8.0) / (seconds * 1024.0)).round() as u32
}

/// Share of packets lost since the previous sample, in whole percent. The
/// first sample is measured against zeroed counters.
pub fn packet_loss_pct(previous: Option<&QualitySample>, current: &QualitySample) -> u32 {
    let (lost_before, received_before) = previous
        .map(|p| (p.packets_lost, p.packets_received))
        .unwrap_or((0, 0));

    let lost = current.packets_lost.saturating_sub(lost_before);
    let received = current.packets_received.saturating_sub(received_before);
    let total = lost + received;
    if total == 0 {
        return 0;
    }

    ((lost as f64 / total as f64) * 100.0).round() as u32
}

pub fn latency_ms(sample: &QualitySample) -> Option<u32> {
    sample
        .rtt_seconds
        .filter(|rtt| rtt.is_finite() && *rtt >= 0.0)
        .map(|rtt| (rtt * 1000.0).round() as u32)
}

pub fn resolution(sample: &QualitySample) -> Option<Resolution> {
    match (sample.frame_width, sample.frame_height) {
        (Some(width), Some(height)) => Some(Resolution { width, height }),
        _ => None,
    }
}
