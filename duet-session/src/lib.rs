//! Two-party call negotiation over a publish/subscribe relay.
//!
//! A [`SessionController`] subscribes to the room's relay channel, drives the
//! offer/answer exchange through a [`Negotiator`], samples transport quality
//! with a [`Watchdog`] and exposes a [`SessionSnapshot`] to the caller.

pub mod negotiation;
pub mod quality;
pub mod session;
pub mod signaling;
pub mod transport;

pub use negotiation::*;
pub use quality::*;
pub use session::*;
pub use signaling::*;
pub use transport::*;
