mod signal_connector;
mod signaling_client;
mod signaling_output;

pub use signal_connector::*;
pub use signaling_client::*;
pub use signaling_output::*;
