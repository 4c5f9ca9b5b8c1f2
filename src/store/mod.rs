pub mod appwrite;
pub mod memory;
pub mod traits;

pub use appwrite::*;
pub use memory::*;
pub use traits::*;
