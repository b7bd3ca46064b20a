use anyhow::Result;
use async_trait::async_trait;
use duet_core::TelemetryRecord;
use std::sync::Arc;
use tracing::{info, warn};

/// External destination for quality records.
#[async_trait]
pub trait TelemetrySink: Send + Sync + 'static {
    async fn emit(&self, record: TelemetryRecord) -> Result<()>;
}

/// Default sink: logs every record under the `duet::telemetry` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetrySink;

#[async_trait]
impl TelemetrySink for TracingTelemetrySink {
    async fn emit(&self, record: TelemetryRecord) -> Result<()> {
        info!(
            target: "duet::telemetry",
            session_id = %record.session_id,
            user_id = %record.user_id,
            bitrate_kbps = record.bitrate_kbps,
            packet_loss_pct = record.packet_loss_pct,
            latency_ms = ?record.latency_ms,
            resolution = ?record.resolution,
            connection_state = record.connection_state.as_str(),
            watchdog_triggered = record.watchdog_triggered,
            "quality sample"
        );
        Ok(())
    }
}

/// Hands the record to the sink on its own task. Sink errors are logged and
/// go no further.
pub fn emit_detached(sink: Arc<dyn TelemetrySink>, record: TelemetryRecord) {
    tokio::spawn(async move {
        if let Err(e) = sink.emit(record).await {
            warn!("Telemetry sink rejected record: {:#}", e);
        }
    });
}
