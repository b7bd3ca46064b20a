use crate::quality::WatchdogConfig;
use crate::transport::TransportConfig;
use serde::{Deserialize, Serialize};

pub const DEFAULT_NAMESPACE: &str = "vc";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Relay channel prefix.
    pub namespace: String,
    pub transport: TransportConfig,
    pub watchdog: WatchdogConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            transport: TransportConfig::default(),
            watchdog: WatchdogConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Parses a JSON document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
