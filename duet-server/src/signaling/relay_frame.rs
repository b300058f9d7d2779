use duet_core::RoomId;
use serde::Deserialize;
use thiserror::Error;

/// The only part of a frame the relay looks at.
#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "roomId")]
    room_id: Option<serde_json::Value>,
}

/// How the relay treats an inbound text frame.
#[derive(Debug, PartialEq, Eq)]
pub enum RelayFrame {
    /// Sets the connection's room tag; never forwarded.
    Join { room_id: RoomId },
    /// Everything else is forwarded verbatim to the rest of the room.
    Forward,
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("malformed frame: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("join frame without roomId")]
    JoinWithoutRoom,
}

impl RelayFrame {
    pub fn classify(text: &str) -> Result<Self, FrameError> {
        let envelope: Envelope = serde_json::from_str(text).map_err(FrameError::Malformed)?;

        if envelope.kind != "join" {
            return Ok(RelayFrame::Forward);
        }

        match envelope.room_id {
            Some(serde_json::Value::String(room_id)) => Ok(RelayFrame::Join {
                room_id: RoomId(room_id),
            }),
            _ => Err(FrameError::JoinWithoutRoom),
        }
    }
}
