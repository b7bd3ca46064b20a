use crate::transport::PeerTransport;
use duet_core::IceCandidate;
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Remote candidates that arrived before a remote description existed.
///
/// The buffer starts closed. [`CandidateBuffer::drain_into`] opens it and
/// applies everything queued so far in arrival order; from then on pushed
/// candidates go straight to the transport.
#[derive(Debug, Default)]
pub struct CandidateBuffer {
    pending: VecDeque<IceCandidate>,
    open: bool,
}

impl CandidateBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&mut self, candidate: IceCandidate, transport: &dyn PeerTransport) {
        if !self.open {
            debug!(
                "Buffering remote ICE candidate ({} pending)",
                self.pending.len() + 1
            );
            self.pending.push_back(candidate);
            return;
        }

        apply(transport, candidate).await;
    }

    /// Applies buffered candidates FIFO and opens the buffer. Returns how
    /// many were accepted by the transport. Calling it again is a no-op.
    pub async fn drain_into(&mut self, transport: &dyn PeerTransport) -> usize {
        self.open = true;

        let mut applied = 0;
        while let Some(candidate) = self.pending.pop_front() {
            if apply(transport, candidate).await {
                applied += 1;
            }
        }

        if applied > 0 {
            debug!("Applied {} buffered ICE candidates", applied);
        }
        applied
    }

    /// Drops queued candidates and closes the buffer.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.open = false;
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// True once a remote description has been accepted.
    pub fn is_open(&self) -> bool {
        self.open
    }
}

async fn apply(transport: &dyn PeerTransport, candidate: IceCandidate) -> bool {
    match transport.add_ice_candidate(candidate).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Dropping rejected ICE candidate: {:#}", e);
            false
        }
    }
}
