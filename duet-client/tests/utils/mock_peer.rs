use anyhow::Result;
use async_trait::async_trait;
use duet_client::PeerBackend;
use duet_core::{IceCandidate, SdpKind, SessionDescription};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerOp {
    AcquireMedia,
    CreateOffer,
    CreateAnswer,
    SetRemote(SdpKind),
    AddCandidate(String),
    Close,
}

/// Peer backend that only records what negotiation asked of it.
#[derive(Clone, Default)]
pub struct MockPeer {
    ops: Arc<Mutex<Vec<PeerOp>>>,
}

impl MockPeer {
    pub fn ops(&self) -> Vec<PeerOp> {
        self.ops.lock().clone()
    }
}

#[async_trait]
impl PeerBackend for MockPeer {
    async fn acquire_local_media(&self) -> Result<()> {
        self.ops.lock().push(PeerOp::AcquireMedia);
        Ok(())
    }

    async fn create_offer(&self) -> Result<SessionDescription> {
        self.ops.lock().push(PeerOp::CreateOffer);
        Ok(SessionDescription::offer("v=0 test-offer"))
    }

    async fn create_answer(&self) -> Result<SessionDescription> {
        self.ops.lock().push(PeerOp::CreateAnswer);
        Ok(SessionDescription::answer("v=0 test-answer"))
    }

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()> {
        self.ops.lock().push(PeerOp::SetRemote(description.kind));
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()> {
        self.ops.lock().push(PeerOp::AddCandidate(candidate.candidate));
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.ops.lock().push(PeerOp::Close);
        Ok(())
    }
}
