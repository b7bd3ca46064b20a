use duet_core::IceServerConfig;
use serde::{Deserialize, Serialize};

pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";

/// Connectivity helpers handed to the peer transport. The session only
/// configures STUN/TURN, it never runs them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig::stun(DEFAULT_STUN_ADDR)],
        }
    }
}
