mod engine;
mod error;
mod lifecycle;
mod signaling;
mod transport;


pub use engine::*;
pub use error::*;
pub use lifecycle::*;
pub use signaling::*;
pub use transport::*;
