mod candidate_buffer;
mod negotiation_error;
mod negotiator;
mod restart_outcome;

pub use candidate_buffer::*;
pub use negotiation_error::*;
pub use negotiator::*;
pub use restart_outcome::*;
