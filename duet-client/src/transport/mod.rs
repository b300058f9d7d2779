mod peer_backend;
mod transport_config;
mod webrtc_peer;

pub use peer_backend::*;
pub use transport_config::*;
pub use webrtc_peer::*;
