use super::mock_peer::MockPeer;
use super::relay::WAIT_TIMEOUT_MS;
use anyhow::{Context, Result};
use duet_client::{
    CallController, CallEvent, CallHandle, CallLimit, NegotiationEngine, NoopRecorder,
    PEER_EVENT_CAPACITY, PeerEvent, SignalingClient, WsConnector,
};
use duet_core::RoomId;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// One side of a call: real signaling over the relay, mock media.
pub struct Participant {
    pub name: &'static str,
    pub handle: CallHandle,
    pub events: mpsc::UnboundedReceiver<CallEvent>,
    pub peer_events: mpsc::Sender<PeerEvent>,
    pub task: JoinHandle<()>,
}

impl Participant {
    pub fn join(
        name: &'static str,
        relay_url: &str,
        room: &str,
        peer: MockPeer,
        limit: Option<CallLimit>,
    ) -> Self {
        let signaling = SignalingClient::new(WsConnector::new(relay_url));
        let signals = signaling.subscribe();
        signaling.connect(RoomId::from(room));

        let (peer_tx, peer_rx) = mpsc::channel(PEER_EVENT_CAPACITY);
        let engine = NegotiationEngine::new(peer, signaling);
        let (controller, handle, events) =
            CallController::new(engine, NoopRecorder::default(), limit, signals, peer_rx);

        Self {
            name,
            handle,
            events,
            peer_events: peer_tx,
            task: tokio::spawn(controller.run()),
        }
    }

    /// Skips events until one matches, returning everything seen.
    pub async fn wait_for<F>(&mut self, matches: F) -> Result<Vec<CallEvent>>
    where
        F: Fn(&CallEvent) -> bool,
    {
        let mut seen = Vec::new();
        let deadline = Duration::from_millis(WAIT_TIMEOUT_MS * 2);
        loop {
            let event = tokio::time::timeout(deadline, self.events.recv())
                .await
                .with_context(|| format!("[{}] Timeout waiting for call event", self.name))?
                .with_context(|| format!("[{}] Call controller is gone", self.name))?;
            let done = matches(&event);
            seen.push(event);
            if done {
                return Ok(seen);
            }
        }
    }
}
