//! Error types for the verification engine.
//!
//! Only run-level conditions are errors. Everything that can go wrong with a
//! single file is a [`crate::verify::VerificationOutcome`] instead.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("manifest not found: {}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Extension is not one of the known digest formats.
    #[error("unsupported manifest format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("manifest is empty: {}", path.display())]
    Empty { path: PathBuf },

    #[error("failed to read manifest {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error("no supported manifest found in {}", dir.display())]
    NoManifest { dir: PathBuf },

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("a verification run is already in progress")]
    AlreadyRunning,

    #[error("failed to build worker pool")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to spawn verification thread")]
    Spawn(#[source] io::Error),

    #[error("verification thread terminated unexpectedly")]
    Aborted,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown hash algorithm: {0}")]
pub struct UnknownAlgorithm(pub String);
