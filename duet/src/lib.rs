pub use duet_core::{RoomId, UserId};

pub mod model {
    pub use duet_core::*;
}

#[cfg(feature = "session")]
pub mod session {
    pub use duet_session::*;
}
