use crate::engine::{NegotiationState, Role, Session};
use crate::error::CallError;
use crate::signaling::SignalingOutput;
use crate::transport::PeerBackend;
use duet_core::{IceCandidate, SessionDescription, SignalMessage};
use tracing::{debug, info, warn};

/// Drives offer/answer and candidate exchange for one call.
///
/// All methods take `&mut self`, so transitions of one session never
/// interleave.
pub struct NegotiationEngine<P, S> {
    peer: P,
    signaling: S,
    session: Session,
}

impl<P: PeerBackend, S: SignalingOutput> NegotiationEngine<P, S> {
    pub fn new(peer: P, signaling: S) -> Self {
        Self {
            peer,
            signaling,
            session: Session::new(),
        }
    }

    pub fn state(&self) -> NegotiationState {
        self.session.state()
    }

    pub fn role(&self) -> Option<Role> {
        self.session.role()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn peer(&self) -> &P {
        &self.peer
    }

    pub fn signaling(&self) -> &S {
        &self.signaling
    }

    /// Makes this side the caller and sends an offer.
    pub async fn start_call(&mut self) -> Result<(), CallError> {
        if self.state() != NegotiationState::Idle {
            return Err(CallError::InvalidState {
                operation: "start_call",
                state: self.state(),
            });
        }

        self.peer
            .acquire_local_media()
            .await
            .map_err(CallError::MediaUnavailable)?;
        self.session.assume(Role::Caller);

        let offer = match self.peer.create_offer().await {
            Ok(offer) => offer,
            Err(e) => {
                self.session.reset_to_idle();
                return Err(CallError::SetupFailed(e));
            }
        };

        self.signaling.send(SignalMessage::Offer { description: offer });
        self.session.transition(NegotiationState::Offering);
        info!("Offer sent, waiting for answer");
        Ok(())
    }

    pub async fn handle_signal(&mut self, message: SignalMessage) -> Result<(), CallError> {
        match message {
            SignalMessage::Offer { description } => self.on_offer(description).await,
            SignalMessage::Answer { description } => self.on_answer(description).await,
            SignalMessage::Ice { candidate } => {
                self.on_remote_candidate(candidate).await;
                Ok(())
            }
            SignalMessage::EndCall => {
                self.end().await;
                Ok(())
            }
            SignalMessage::Join { room_id } => {
                warn!("Unexpected join for room '{}' from relay, ignoring", room_id);
                Ok(())
            }
        }
    }

    async fn on_offer(&mut self, description: SessionDescription) -> Result<(), CallError> {
        if self.state() == NegotiationState::Ended {
            debug!("Call already ended, ignoring offer");
            return Ok(());
        }
        if self.role() == Some(Role::Caller) {
            warn!(
                "Ignoring competing offer ({} bytes of SDP) while calling in state {:?}",
                description.sdp.len(),
                self.state()
            );
            return Ok(());
        }
        if self.session.remote_description_set() {
            warn!("Remote description already set, ignoring repeated offer");
            return Ok(());
        }

        self.session.transition(NegotiationState::AwaitingRemote);
        self.session.assume(Role::Callee);
        info!("Incoming offer, answering");

        if let Err(e) = self.peer.acquire_local_media().await {
            self.session.reset_to_idle();
            return Err(CallError::MediaUnavailable(e));
        }

        if let Err(e) = self.peer.set_remote_description(description).await {
            self.session.reset_to_idle();
            return Err(CallError::SetupFailed(e));
        }
        self.apply_remote_description().await;

        let answer = match self.peer.create_answer().await {
            Ok(answer) => answer,
            Err(e) => {
                self.session.reset_to_idle();
                return Err(CallError::SetupFailed(e));
            }
        };

        self.signaling.send(SignalMessage::Answer {
            description: answer,
        });
        self.session.transition(NegotiationState::Connected);
        info!("Answer sent, call connected");
        Ok(())
    }

    async fn on_answer(&mut self, description: SessionDescription) -> Result<(), CallError> {
        if self.role() != Some(Role::Caller) || self.state() != NegotiationState::Offering {
            warn!(
                "Ignoring answer: role {:?}, state {:?}",
                self.role(),
                self.state()
            );
            return Ok(());
        }

        if let Err(e) = self.peer.set_remote_description(description).await {
            self.session.reset_to_idle();
            return Err(CallError::SetupFailed(e));
        }
        self.apply_remote_description().await;

        self.session.transition(NegotiationState::Connected);
        info!("Answer received, call connected");
        Ok(())
    }

    async fn on_remote_candidate(&mut self, candidate: IceCandidate) {
        if self.state() == NegotiationState::Ended {
            debug!("Call already ended, ignoring candidate");
            return;
        }

        if self.session.remote_description_set() {
            self.apply_candidate(candidate).await;
        } else {
            debug!("No remote description yet, buffering candidate");
            self.session.buffer_candidate(candidate);
        }
    }

    /// Marks the remote description as set and flushes buffered candidates
    /// in the same step.
    async fn apply_remote_description(&mut self) {
        let pending = self.session.accept_remote_description();
        if !pending.is_empty() {
            debug!("Flushing {} buffered candidate(s)", pending.len());
        }
        for candidate in pending {
            self.apply_candidate(candidate).await;
        }
    }

    async fn apply_candidate(&self, candidate: IceCandidate) {
        if let Err(e) = self.peer.add_ice_candidate(candidate).await {
            warn!("Failed to add remote candidate: {:#}", e);
        }
    }

    /// Trickles a locally discovered candidate to the remote side.
    pub fn on_local_candidate(&self, candidate: IceCandidate) {
        if self.state() == NegotiationState::Ended {
            return;
        }
        self.signaling.send(SignalMessage::Ice { candidate });
    }

    /// Ends the session and releases the peer. Returns `false` if it had
    /// already ended.
    pub async fn end(&mut self) -> bool {
        if self.state() == NegotiationState::Ended {
            return false;
        }

        self.session.finish();
        if let Err(e) = self.peer.close().await {
            warn!("Failed to close peer connection: {:#}", e);
        }
        info!("Negotiation ended");
        true
    }
}
