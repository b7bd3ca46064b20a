mod metrics;
mod telemetry;
mod watchdog;

pub use metrics::*;
pub use telemetry::*;
pub use watchdog::*;
