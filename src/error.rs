use thiserror::Error;

use crate::logic::seeder::Phase;

/// Transport or status failure from the hosted row/blob store.
///
/// Nothing at this layer retries; a failed call surfaces immediately and the
/// orchestrator aborts the run.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("{status} from {url}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        RemoteError::Transport(err.to_string())
    }
}

/// Failure of a single seeding step.
#[derive(Error, Debug)]
pub enum SeedError {
    #[error("remote call failed: {0}")]
    Remote(#[from] RemoteError),

    #[error("failed to download image from {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("failed to upload {file_name}: {source}")]
    Upload {
        file_name: String,
        #[source]
        source: RemoteError,
    },

    // A seed entry names a category/customisation that does not exist in the
    // dataset. Defect in the bundled data, never retried.
    #[error("seed dataset references unknown {kind} '{name}'")]
    DatasetIntegrity { kind: &'static str, name: String },

    #[error("seeding run cancelled")]
    Cancelled,
}

/// A failed run: which phase broke, on which entity (by name, where one was
/// being processed), and why. The store may be left in a mixed state; the
/// only recovery path is a subsequent successful run.
#[derive(Error, Debug)]
pub struct RunFailure {
    pub phase: Phase,
    pub entity: Option<String>,
    #[source]
    pub error: SeedError,
}

impl std::fmt::Display for RunFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "seeding failed during {}", self.phase)?;
        if let Some(entity) = &self.entity {
            write!(f, " (entity '{}')", entity)?;
        }
        write!(f, ": {}", self.error)
    }
}

impl RunFailure {
    pub fn new(phase: Phase, error: SeedError) -> Self {
        Self {
            phase,
            entity: None,
            error,
        }
    }

    pub fn on_entity(phase: Phase, entity: impl Into<String>, error: SeedError) -> Self {
        Self {
            phase,
            entity: Some(entity.into()),
            error,
        }
    }
}
