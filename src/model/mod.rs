pub mod common;
pub mod remote;
pub mod seed;

pub use common::*;
pub use remote::*;
pub use seed::*;
