mod mock_peer;
mod participant;
mod relay;

pub use mock_peer::*;
pub use participant::*;
pub use relay::*;
