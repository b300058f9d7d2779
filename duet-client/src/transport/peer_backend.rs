use anyhow::Result;
use async_trait::async_trait;
use duet_core::{IceCandidate, SessionDescription};

/// Capacity of the channel peer backends report `PeerEvent`s on.
pub const PEER_EVENT_CAPACITY: usize = 64;

/// What the peer connection reports back to the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerEvent {
    /// Locally gathered candidate to trickle to the remote side.
    LocalCandidate(IceCandidate),
    RemoteTrack { kind: String },
    /// Media path is up.
    Connected,
    /// The connection failed or was closed.
    Closed,
}

/// The media peer connection behind a call.
#[async_trait]
pub trait PeerBackend: Send + Sync {
    async fn acquire_local_media(&self) -> Result<()>;

    /// Creates an offer and installs it as the local description.
    async fn create_offer(&self) -> Result<SessionDescription>;

    /// Creates an answer and installs it as the local description.
    async fn create_answer(&self) -> Result<SessionDescription>;

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()>;

    async fn close(&self) -> Result<()>;
}
