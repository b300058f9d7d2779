use crate::signaling::{SignalConnector, SignalSink, SignalStream, SignalingOutput};
use duet_core::{RoomId, SignalMessage};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalingState {
    Disconnected,
    Connecting,
    Connected,
    Closed,
    Failed,
}

struct ClientInner {
    state: SignalingState,
    /// Writer channel; present only while connected.
    outbound: Option<mpsc::UnboundedSender<String>>,
    /// Messages sent before the connection opened, in send order.
    queue: VecDeque<SignalMessage>,
    subscriber: Option<mpsc::UnboundedSender<SignalMessage>>,
    task: Option<JoinHandle<()>>,
}

/// Per-participant connection to the relay.
///
/// Sends issued before the transport is up are queued and flushed right after
/// the `join` frame, so the relay always learns the room first.
#[derive(Clone)]
pub struct SignalingClient {
    connector: Arc<dyn SignalConnector>,
    inner: Arc<Mutex<ClientInner>>,
}

impl SignalingClient {
    pub fn new(connector: impl SignalConnector) -> Self {
        Self {
            connector: Arc::new(connector),
            inner: Arc::new(Mutex::new(ClientInner {
                state: SignalingState::Disconnected,
                outbound: None,
                queue: VecDeque::new(),
                subscriber: None,
                task: None,
            })),
        }
    }

    pub fn state(&self) -> SignalingState {
        self.inner.lock().state
    }

    /// Number of messages waiting for the connection to open.
    pub fn pending(&self) -> usize {
        self.inner.lock().queue.len()
    }

    /// Starts connecting in the background and joins `room_id` once open.
    pub fn connect(&self, room_id: RoomId) {
        {
            let mut inner = self.inner.lock();
            if inner.state != SignalingState::Disconnected {
                warn!("Signaling client is {:?}, ignoring connect", inner.state);
                return;
            }
            inner.state = SignalingState::Connecting;
        }

        let connector = self.connector.clone();
        let inner = self.inner.clone();
        let task = tokio::spawn(async move {
            let (sink, stream) = match connector.connect().await {
                Ok(ends) => ends,
                Err(e) => {
                    error!("Signaling connection failed: {:#}", e);
                    let mut guard = inner.lock();
                    if guard.state == SignalingState::Connecting {
                        guard.state = SignalingState::Failed;
                        guard.queue.clear();
                    }
                    return;
                }
            };

            let (tx, rx) = mpsc::unbounded_channel();
            tokio::spawn(write_loop(sink, rx));

            {
                let mut guard = inner.lock();
                if guard.state != SignalingState::Connecting {
                    // Closed while connecting; dropping `tx` shuts the writer.
                    return;
                }
                let join = SignalMessage::Join {
                    room_id: room_id.clone(),
                };
                forward(&tx, &join);
                let queued = guard.queue.len();
                for message in guard.queue.drain(..) {
                    forward(&tx, &message);
                }
                guard.outbound = Some(tx);
                guard.state = SignalingState::Connected;
                info!(
                    "Signaling connected, joined room '{}' ({} queued message(s) flushed)",
                    room_id, queued
                );
            }

            read_loop(stream, inner).await;
        });

        self.inner.lock().task = Some(task);
    }

    /// Replaces the current subscriber; the previous receiver ends.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<SignalMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.lock().subscriber = Some(tx);
        rx
    }

    pub fn send(&self, message: SignalMessage) {
        let mut inner = self.inner.lock();
        match inner.state {
            SignalingState::Connected => {
                if let Some(tx) = &inner.outbound {
                    forward(tx, &message);
                }
            }
            SignalingState::Disconnected | SignalingState::Connecting => {
                debug!("Queueing '{}' until the relay connection opens", message.kind());
                inner.queue.push_back(message);
            }
            SignalingState::Closed | SignalingState::Failed => {
                warn!(
                    "Signaling is {:?}, dropping '{}'",
                    inner.state,
                    message.kind()
                );
            }
        }
    }

    /// Stops reading, discards queued messages and closes the transport once
    /// already handed-off messages are written.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        if inner.state == SignalingState::Closed {
            return;
        }
        inner.state = SignalingState::Closed;

        let discarded = inner.queue.len();
        inner.queue.clear();
        inner.outbound = None;
        inner.subscriber = None;
        if let Some(task) = inner.task.take() {
            task.abort();
        }
        info!("Signaling closed ({} queued message(s) discarded)", discarded);
    }
}

impl SignalingOutput for SignalingClient {
    fn send(&self, message: SignalMessage) {
        SignalingClient::send(self, message);
    }

    fn close(&self) {
        SignalingClient::close(self);
    }
}

fn forward(tx: &mpsc::UnboundedSender<String>, message: &SignalMessage) {
    match serde_json::to_string(message) {
        Ok(text) => {
            if tx.send(text).is_err() {
                warn!("Signaling writer is gone, dropping '{}'", message.kind());
            }
        }
        Err(e) => error!("Failed to encode '{}': {}", message.kind(), e),
    }
}

async fn write_loop(mut sink: SignalSink, mut rx: mpsc::UnboundedReceiver<String>) {
    while let Some(text) = rx.recv().await {
        if let Err(e) = sink.send(text).await {
            warn!("Signaling write failed: {:#}", e);
            return;
        }
    }
    if let Err(e) = sink.close().await {
        debug!("Signaling sink close failed: {:#}", e);
    }
}

async fn read_loop(mut stream: SignalStream, inner: Arc<Mutex<ClientInner>>) {
    while let Some(frame) = stream.next().await {
        let text = match frame {
            Ok(text) => text,
            Err(e) => {
                warn!("Signaling transport error: {:#}", e);
                break;
            }
        };

        let message = match serde_json::from_str::<SignalMessage>(&text) {
            Ok(message) => message,
            Err(e) => {
                warn!("Dropping undecodable signaling frame: {}", e);
                continue;
            }
        };

        let subscriber = inner.lock().subscriber.clone();
        match subscriber {
            Some(tx) => {
                if tx.send(message).is_err() {
                    debug!("Subscriber dropped its receiver");
                }
            }
            None => debug!("No subscriber, dropping '{}'", message.kind()),
        }
    }

    let mut guard = inner.lock();
    if guard.state == SignalingState::Connected {
        warn!("Relay connection lost");
        guard.state = SignalingState::Failed;
        guard.outbound = None;
    }
}
