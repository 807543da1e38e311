//! Errors that end a probe run.

use std::time::Duration;

use tessera_biome::SubmitError;

/// Errors that can occur while probing a region.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The registry lacks the ocean or band biomes the synthetic world needs.
    #[error("registry has no ocean or band biomes")]
    MissingBiomes,
    /// A slice worker thread could not be spawned.
    #[error("failed to start slice workers: {0}")]
    Workers(#[source] std::io::Error),
    /// The build task was rejected by the worker pool.
    #[error("failed to submit slice build: {0}")]
    Submit(#[from] SubmitError),
    /// The build did not finish in time.
    #[error("slice build did not finish within {0:?}")]
    Timeout(Duration),
}
