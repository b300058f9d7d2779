use crate::engine::NegotiationEngine;
use crate::lifecycle::{CallConfig, CallController, CallEvent, CallHandle, Recorder};
use crate::signaling::{SignalingClient, WsConnector};
use crate::transport::{PEER_EVENT_CAPACITY, WebRtcPeer};
use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

/// A call wired to the relay and a real peer connection.
pub struct RunningCall {
    pub handle: CallHandle,
    pub events: mpsc::UnboundedReceiver<CallEvent>,
    pub task: JoinHandle<()>,
}

/// Connects to the relay, joins the configured room and spawns the call
/// controller. The call stays idle until `start_call` or a remote offer.
pub async fn launch_call<R>(config: CallConfig, recorder: R) -> Result<RunningCall>
where
    R: Recorder + 'static,
{
    config.validate().context("Invalid call configuration")?;

    let (peer_tx, peer_rx) = mpsc::channel(PEER_EVENT_CAPACITY);
    let peer = WebRtcPeer::new(&config.transport, peer_tx).await?;

    let signaling = SignalingClient::new(WsConnector::new(config.relay_url.clone()));
    let signals = signaling.subscribe();
    signaling.connect(config.room_id.clone());
    info!("Joining room '{}' via {}", config.room_id, config.relay_url);

    let engine = NegotiationEngine::new(peer, signaling);
    let (controller, handle, events) =
        CallController::new(engine, recorder, config.limit, signals, peer_rx);
    let task = tokio::spawn(controller.run());

    Ok(RunningCall {
        handle,
        events,
        task,
    })
}
