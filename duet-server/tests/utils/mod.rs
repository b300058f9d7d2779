pub mod relay_helpers;

pub use relay_helpers::*;
pub use test_client::*;
