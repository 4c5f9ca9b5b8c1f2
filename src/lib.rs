pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

// Export config types
pub use config::{AppConfig, AppwriteConfig, SeederConfig, TableNames};

// Export error taxonomy
pub use error::{RemoteError, RunFailure, SeedError};

// Export logic types
pub use logic::{
    content_type_for, AssetIngest, AssetIngestor, Phase, SeedOrchestrator, SeedSummary,
};

// Export all model types
pub use model::*;

// Export store types
pub use store::{AppwriteStore, BlobStore, MemoryStore, RowStore};
