use duet_core::utils::DEFAULT_RELAY_PORT;
use std::net::{Ipv4Addr, SocketAddr};

/// Relay listener configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind: SocketAddr,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_RELAY_PORT)),
        }
    }
}
