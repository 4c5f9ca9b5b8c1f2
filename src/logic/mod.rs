pub mod content_type;
pub mod ingest;
pub mod seeder;

pub use content_type::*;
pub use ingest::*;
pub use seeder::*;
