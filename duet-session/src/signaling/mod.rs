mod memory_relay;
mod relay;
mod relay_error;

pub use memory_relay::*;
pub use relay::*;
pub use relay_error::*;
