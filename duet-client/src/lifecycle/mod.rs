mod call_clock;
mod call_config;
mod call_controller;
mod launch;
mod recorder;

pub use call_clock::*;
pub use call_config::*;
pub use call_controller::*;
pub use launch::*;
pub use recorder::*;
