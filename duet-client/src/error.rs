use crate::engine::NegotiationState;
use thiserror::Error;

/// Failures surfaced by call setup. Transport plumbing below this level
/// reports through `anyhow`.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("local media unavailable: {0:#}")]
    MediaUnavailable(anyhow::Error),

    #[error("call setup failed: {0:#}")]
    SetupFailed(anyhow::Error),

    #[error("{operation} is not allowed in state {state:?}")]
    InvalidState {
        operation: &'static str,
        state: NegotiationState,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("alert window ({alert_before}s) must be shorter than the call limit ({max_duration}s)")]
    AlertWindowTooLarge { alert_before: u64, max_duration: u64 },

    #[error("room id must not be empty")]
    EmptyRoom,
}
