use crate::room::{MemberSender, RoomRegistry};
use crate::signaling::RelayFrame;
use axum::extract::ws::Utf8Bytes;
use duet_core::{ConnectionId, RoomId};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

struct RelayInner {
    registry: RoomRegistry,
}

/// Process-wide rendezvous point shared by every WebSocket handler.
#[derive(Clone)]
pub struct RelayService {
    inner: Arc<RelayInner>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct RelayStats {
    pub rooms: usize,
    pub connections: usize,
}

impl RelayService {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RelayInner {
                registry: RoomRegistry::new(),
            }),
        }
    }

    pub fn join(&self, room_id: &RoomId, connection_id: ConnectionId, tx: MemberSender) {
        self.inner.registry.join(room_id, connection_id, tx);
    }

    pub fn leave(&self, room_id: &RoomId, connection_id: &ConnectionId) {
        self.inner.registry.leave(room_id, connection_id);
    }

    pub fn relay(&self, room_id: &RoomId, sender: &ConnectionId, frame: &Utf8Bytes) -> usize {
        self.inner.registry.broadcast(room_id, sender, frame)
    }

    pub fn room_size(&self, room_id: &RoomId) -> usize {
        self.inner.registry.room_size(room_id)
    }

    pub fn stats(&self) -> RelayStats {
        RelayStats {
            rooms: self.inner.registry.room_count(),
            connections: self.inner.registry.connection_count(),
        }
    }

    pub fn open_connection(&self, tx: MemberSender) -> RelayConnection {
        RelayConnection {
            id: ConnectionId::new(),
            room_id: None,
            tx,
            service: self.clone(),
        }
    }
}

impl Default for RelayService {
    fn default() -> Self {
        Self::new()
    }
}

/// Relay-side state of one client connection. The room tag is set by the
/// first `join` and stays fixed until the connection closes.
pub struct RelayConnection {
    id: ConnectionId,
    room_id: Option<RoomId>,
    tx: MemberSender,
    service: RelayService,
}

impl RelayConnection {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn room_id(&self) -> Option<&RoomId> {
        self.room_id.as_ref()
    }

    /// Handles one inbound text frame. Never fails: bad input is logged and
    /// dropped so the connection stays up.
    pub fn handle_text(&mut self, text: Utf8Bytes) {
        let frame = match RelayFrame::classify(text.as_str()) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Dropping frame from {}: {}", self.id, e);
                return;
            }
        };

        match frame {
            RelayFrame::Join { room_id } => {
                if let Some(current) = &self.room_id {
                    warn!(
                        "Connection {} already in room '{}', ignoring join to '{}'",
                        self.id, current, room_id
                    );
                    return;
                }
                info!("Connection {} joined room '{}'", self.id, room_id);
                self.service.join(&room_id, self.id, self.tx.clone());
                self.room_id = Some(room_id);
            }
            RelayFrame::Forward => {
                let Some(room_id) = &self.room_id else {
                    debug!("Connection {} sent a frame before joining, dropping", self.id);
                    return;
                };
                let delivered = self.service.relay(room_id, &self.id, &text);
                debug!(
                    "Relayed frame from {} to {} peer(s) in '{}'",
                    self.id, delivered, room_id
                );
            }
        }
    }
}

impl Drop for RelayConnection {
    fn drop(&mut self) {
        if let Some(room_id) = self.room_id.take() {
            self.service.leave(&room_id, &self.id);
        }
    }
}
