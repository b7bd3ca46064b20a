mod session_command;
mod session_config;
mod session_controller;
mod session_error;
mod session_options;
mod session_snapshot;
mod session_worker;

pub use session_command::*;
pub use session_config::*;
pub use session_controller::*;
pub use session_error::*;
pub use session_options::*;
pub use session_snapshot::*;
