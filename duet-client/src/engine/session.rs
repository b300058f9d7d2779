use duet_core::IceCandidate;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Caller,
    Callee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    Idle,
    /// Caller sent its offer and waits for the answer.
    Offering,
    /// Callee is processing a received offer.
    AwaitingRemote,
    HasRemoteDescription,
    Connected,
    Ended,
}

/// Negotiation state of one call.
#[derive(Debug)]
pub struct Session {
    role: Option<Role>,
    state: NegotiationState,
    pending_candidates: VecDeque<IceCandidate>,
    remote_description_set: bool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            role: None,
            state: NegotiationState::Idle,
            pending_candidates: VecDeque::new(),
            remote_description_set: false,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn remote_description_set(&self) -> bool {
        self.remote_description_set
    }

    pub fn pending_candidates(&self) -> usize {
        self.pending_candidates.len()
    }

    pub(crate) fn assume(&mut self, role: Role) {
        self.role = Some(role);
    }

    pub(crate) fn transition(&mut self, state: NegotiationState) {
        self.state = state;
    }

    pub(crate) fn buffer_candidate(&mut self, candidate: IceCandidate) {
        self.pending_candidates.push_back(candidate);
    }

    /// Flips the remote-description flag and hands back everything buffered
    /// before it, oldest first.
    pub(crate) fn accept_remote_description(&mut self) -> Vec<IceCandidate> {
        self.remote_description_set = true;
        self.state = NegotiationState::HasRemoteDescription;
        self.pending_candidates.drain(..).collect()
    }

    /// Back to `Idle` after a failed setup. The remote-description flag is
    /// kept because the peer connection still carries that description.
    pub(crate) fn reset_to_idle(&mut self) {
        self.role = None;
        self.state = NegotiationState::Idle;
    }

    pub(crate) fn finish(&mut self) {
        self.state = NegotiationState::Ended;
        self.pending_candidates.clear();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
