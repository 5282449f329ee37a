pub mod algorithm;
pub mod config;
pub mod crc;
pub mod error;
pub mod manifest;
pub mod progress;
pub mod report;
pub mod scheduler;
pub mod verify;

pub use algorithm::{normalize_digest, DigestMode, Digester, HashAlgorithm};
pub use config::VerifyConfig;
pub use error::{ConfigError, ManifestError, RunError};
pub use manifest::{Manifest, ManifestEntry};
pub use progress::{Event, EventSink, ProgressSample, Severity};
pub use report::{summarize, RunReport};
pub use scheduler::{RunHandle, StopHandle, Verifier};
pub use verify::{FileVerification, VerificationOutcome};
