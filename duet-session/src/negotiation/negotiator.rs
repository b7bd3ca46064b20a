use crate::negotiation::{CandidateBuffer, NegotiationError, RestartOutcome};
use crate::transport::PeerTransport;
use duet_core::{
    IceCandidate, NegotiationState, Participant, Role, SessionDescription, Signal, SignalMessage,
    TransportState, UserId,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Offer/answer state machine for one call attempt.
///
/// The negotiator never talks to the relay. Every handler returns the
/// messages that should be published and the caller does the publishing, so
/// the whole protocol can be driven message by message in tests.
///
/// The initiator is the only side that ever creates offers, restart offers
/// included. The responder only answers. That removes glare: an offer seen
/// by the initiator is ignored, and a responder keeps the first offer it
/// accepted.
pub struct Negotiator {
    participant: Participant,
    transport: Arc<dyn PeerTransport>,
    state: NegotiationState,
    candidates: CandidateBuffer,
    local_offer: Option<SessionDescription>,
    pending_restart: Option<SessionDescription>,
    failure: Option<String>,
    connected_entries: usize,
}

impl Negotiator {
    pub fn new(participant: Participant, transport: Arc<dyn PeerTransport>) -> Self {
        Self {
            participant,
            transport,
            state: NegotiationState::Idle,
            candidates: CandidateBuffer::new(),
            local_offer: None,
            pending_restart: None,
            failure: None,
            connected_entries: 0,
        }
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn user_id(&self) -> &UserId {
        &self.participant.user_id
    }

    pub fn role(&self) -> Role {
        self.participant.role
    }

    /// User-facing failure message, set only in `Failed`.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn has_remote_description(&self) -> bool {
        self.candidates.is_open()
    }

    pub fn buffered_candidates(&self) -> usize {
        self.candidates.len()
    }

    /// How many times the machine has entered `Connected`.
    pub fn connected_entries(&self) -> usize {
        self.connected_entries
    }

    pub fn transport(&self) -> &Arc<dyn PeerTransport> {
        &self.transport
    }

    /// Called once the relay subscription is live.
    pub async fn on_channel_ready(&mut self) -> Result<Vec<SignalMessage>, NegotiationError> {
        if self.state != NegotiationState::Idle {
            debug!("Channel ready in {}, nothing to do", self.state);
            return Ok(Vec::new());
        }

        match self.participant.role {
            Role::Initiator => Ok(vec![self.create_offer().await?]),
            Role::Responder => {
                self.transition(NegotiationState::AwaitingRemoteOffer);
                Ok(vec![SignalMessage::ready(self.user_id().clone())])
            }
        }
    }

    pub async fn on_message(
        &mut self,
        msg: SignalMessage,
    ) -> Result<Vec<SignalMessage>, NegotiationError> {
        if msg.is_from(self.user_id()) {
            return Ok(Vec::new());
        }

        if self.state.is_terminal() {
            debug!(
                "Ignoring '{}' from {} in {}",
                msg.signal.kind(),
                msg.sender,
                self.state
            );
            return Ok(Vec::new());
        }

        match msg.signal {
            Signal::Offer {
                description,
                ice_restart,
            } => self.handle_offer(msg.sender, description, ice_restart).await,
            Signal::Answer(description) => self.handle_answer(msg.sender, description).await,
            Signal::IceCandidate(candidate) => {
                self.candidates
                    .push(candidate, self.transport.as_ref())
                    .await;
                Ok(Vec::new())
            }
            Signal::Ready => self.handle_ready(msg.sender).await,
        }
    }

    /// Maps transport connectivity onto the negotiation state and returns the
    /// resulting state.
    pub fn on_transport_state_change(&mut self, transport: TransportState) -> NegotiationState {
        if self.state.is_terminal() {
            return self.state;
        }

        match transport {
            TransportState::Connected | TransportState::Completed => {
                if self.has_remote_description() {
                    self.transition(NegotiationState::Connected);
                }
            }
            TransportState::Disconnected => {
                if self.has_remote_description() {
                    self.transition(NegotiationState::Recovering);
                }
            }
            TransportState::Failed => {
                self.fail(NegotiationError::Transport);
            }
            TransportState::Closed => self.transition(NegotiationState::Closed),
            TransportState::New | TransportState::Checking => {}
        }

        self.state
    }

    /// Turns a locally gathered candidate into a message for the peer.
    pub fn on_local_candidate(&self, candidate: IceCandidate) -> Option<SignalMessage> {
        if self.state.is_terminal() {
            return None;
        }
        Some(SignalMessage::ice(self.user_id().clone(), candidate))
    }

    /// Asks for connectivity to be renegotiated in place. Never changes the
    /// negotiation state; the transport reports the outcome.
    pub async fn restart(&mut self) -> RestartOutcome {
        if !matches!(
            self.state,
            NegotiationState::Connected | NegotiationState::Recovering
        ) {
            return RestartOutcome::Skipped(self.state);
        }

        if self.participant.role == Role::Responder {
            debug!("Restart requested on responder, waiting for initiator");
            return RestartOutcome::AwaitingPeer;
        }

        if let Some(pending) = &self.pending_restart {
            debug!("Restart already pending, re-sending restart offer");
            return RestartOutcome::Offered(SignalMessage::restart_offer(
                self.user_id().clone(),
                pending.clone(),
            ));
        }

        match self.transport.create_restart_offer().await {
            Ok(description) => {
                info!("Created ICE restart offer");
                self.pending_restart = Some(description.clone());
                RestartOutcome::Offered(SignalMessage::restart_offer(
                    self.user_id().clone(),
                    description,
                ))
            }
            Err(e) => {
                warn!("ICE restart failed: {:#}", e);
                RestartOutcome::Failed(format!("{e:#}"))
            }
        }
    }

    /// Closes the transport and ends the attempt.
    pub async fn close(&mut self) {
        if let Err(e) = self.transport.close().await {
            warn!("Error while closing transport: {:#}", e);
        }
        self.transition(NegotiationState::Closed);
    }

    /// Drops any candidates that never got applied.
    pub fn discard_candidates(&mut self) {
        self.candidates.clear();
    }

    async fn create_offer(&mut self) -> Result<SignalMessage, NegotiationError> {
        let description = match self.transport.create_offer().await {
            Ok(description) => description,
            Err(e) => return Err(self.fail(NegotiationError::CreateOffer(e))),
        };

        self.local_offer = Some(description.clone());
        self.transition(NegotiationState::AwaitingAnswer);
        Ok(SignalMessage::offer(self.user_id().clone(), description))
    }

    async fn handle_offer(
        &mut self,
        sender: UserId,
        description: SessionDescription,
        ice_restart: bool,
    ) -> Result<Vec<SignalMessage>, NegotiationError> {
        if self.participant.role == Role::Initiator {
            warn!("Ignoring offer from {}: this side is the initiator", sender);
            return Ok(Vec::new());
        }

        let renegotiation = self.has_remote_description();
        if renegotiation && !ice_restart {
            warn!("Ignoring duplicate offer from {}", sender);
            return Ok(Vec::new());
        }

        if let Err(e) = self.transport.set_remote_description(description).await {
            return Err(self.fail(NegotiationError::RemoteDescription(e)));
        }
        self.candidates.drain_into(self.transport.as_ref()).await;

        let answer = match self.transport.create_answer().await {
            Ok(answer) => answer,
            Err(e) => return Err(self.fail(NegotiationError::CreateAnswer(e))),
        };

        if renegotiation {
            info!("Answered ICE restart offer from {}", sender);
        } else {
            self.transition(NegotiationState::Connected);
        }

        Ok(vec![SignalMessage::answer(self.user_id().clone(), answer)])
    }

    async fn handle_answer(
        &mut self,
        sender: UserId,
        description: SessionDescription,
    ) -> Result<Vec<SignalMessage>, NegotiationError> {
        let initial =
            self.state == NegotiationState::AwaitingAnswer && !self.has_remote_description();
        let restart = self.pending_restart.is_some();

        if self.participant.role != Role::Initiator || !(initial || restart) {
            warn!(
                "Ignoring unexpected answer from {} in {}",
                sender, self.state
            );
            return Ok(Vec::new());
        }

        if let Err(e) = self.transport.set_remote_description(description).await {
            return Err(self.fail(NegotiationError::RemoteDescription(e)));
        }

        if initial {
            self.candidates.drain_into(self.transport.as_ref()).await;
            self.transition(NegotiationState::Connected);
        } else {
            info!("ICE restart answer applied");
        }
        self.pending_restart = None;

        Ok(Vec::new())
    }

    async fn handle_ready(
        &mut self,
        sender: UserId,
    ) -> Result<Vec<SignalMessage>, NegotiationError> {
        if self.participant.role != Role::Initiator || self.has_remote_description() {
            return Ok(Vec::new());
        }

        match (&self.local_offer, self.state) {
            (Some(offer), NegotiationState::AwaitingAnswer) => {
                info!("{} is ready, re-sending the existing offer", sender);
                Ok(vec![SignalMessage::offer(
                    self.user_id().clone(),
                    offer.clone(),
                )])
            }
            (None, NegotiationState::Idle) => {
                info!("{} is ready before we offered, creating offer", sender);
                Ok(vec![self.create_offer().await?])
            }
            _ => Ok(Vec::new()),
        }
    }

    fn transition(&mut self, next: NegotiationState) {
        if self.state == next {
            return;
        }

        info!("Negotiation state {} -> {}", self.state, next);
        if next == NegotiationState::Connected {
            self.connected_entries += 1;
        }
        self.state = next;
    }

    fn fail(&mut self, err: NegotiationError) -> NegotiationError {
        error!("Negotiation failed: {}", err);
        self.failure = Some(err.user_message().to_string());
        self.transition(NegotiationState::Failed);
        err
    }
}
