mod negotiation_engine;
mod session;

pub use negotiation_engine::*;
pub use session::*;
