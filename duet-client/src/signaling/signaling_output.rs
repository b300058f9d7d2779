use duet_core::SignalMessage;

/// Outbound side of signaling as seen by the negotiation engine.
pub trait SignalingOutput: Send + Sync {
    /// Hands a message to the relay connection. Never blocks; delivery is
    /// best-effort.
    fn send(&self, message: SignalMessage);

    fn close(&self);
}
