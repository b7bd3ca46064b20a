use anyhow::{Result, bail};
use async_trait::async_trait;
use duet_core::TelemetryRecord;
use duet_session::TelemetrySink;
use std::sync::Arc;
use tokio::sync::Mutex;

/// TelemetrySink that stores every record it is given.
#[derive(Clone, Default)]
pub struct RecordingTelemetrySink {
    records: Arc<Mutex<Vec<TelemetryRecord>>>,
    failing: bool,
}

impl RecordingTelemetrySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that records and then reports an error.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub async fn records(&self) -> Vec<TelemetryRecord> {
        self.records.lock().await.clone()
    }

    pub async fn wait_for_records(&self, count: usize, timeout_ms: u64) -> bool {
        let start = tokio::time::Instant::now();
        let timeout = std::time::Duration::from_millis(timeout_ms);

        while start.elapsed() < timeout {
            if self.records.lock().await.len() >= count {
                return true;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        false
    }
}

#[async_trait]
impl TelemetrySink for RecordingTelemetrySink {
    async fn emit(&self, record: TelemetryRecord) -> Result<()> {
        self.records.lock().await.push(record);
        if self.failing {
            bail!("telemetry backend unavailable");
        }
        Ok(())
    }
}
