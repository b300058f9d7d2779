use axum::extract::ws::{Message, Utf8Bytes};
use dashmap::DashMap;
use duet_core::{ConnectionId, RoomId};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Outbound half of a member connection; drained by its writer task.
pub type MemberSender = mpsc::UnboundedSender<Message>;

/// Room id -> members. A room exists only while it has at least one member.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<RoomId, HashMap<ConnectionId, MemberSender>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&self, room_id: &RoomId, connection_id: ConnectionId, tx: MemberSender) {
        let mut members = self.rooms.entry(room_id.clone()).or_default();
        if members.is_empty() {
            info!("Creating room '{}'", room_id);
        }
        members.insert(connection_id, tx);
        debug!(
            "Connection {} joined room '{}' ({} members)",
            connection_id,
            room_id,
            members.len()
        );
    }

    pub fn leave(&self, room_id: &RoomId, connection_id: &ConnectionId) {
        if let Some(mut members) = self.rooms.get_mut(room_id) {
            members.remove(connection_id);
        }

        if self
            .rooms
            .remove_if(room_id, |_, members| members.is_empty())
            .is_some()
        {
            info!("Room '{}' is empty, removing", room_id);
        }
    }

    /// Forwards `frame` to every open member of the room except `sender`.
    /// Returns the number of connections the frame was handed to.
    pub fn broadcast(&self, room_id: &RoomId, sender: &ConnectionId, frame: &Utf8Bytes) -> usize {
        // Write guard: broadcasts into the same room never interleave.
        let Some(members) = self.rooms.get_mut(room_id) else {
            return 0;
        };

        let mut delivered = 0;
        for (id, tx) in members.iter() {
            if id == sender || tx.is_closed() {
                continue;
            }
            if tx.send(Message::Text(frame.clone())).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    pub fn room_size(&self, room_id: &RoomId) -> usize {
        self.rooms.get(room_id).map_or(0, |members| members.len())
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn connection_count(&self) -> usize {
        self.rooms.iter().map(|entry| entry.value().len()).sum()
    }
}
