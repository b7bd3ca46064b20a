pub mod codec;
pub mod model;

pub use codec::{DecodeError, EncodeError, decode, encode};
pub use model::*;
