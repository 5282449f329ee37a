use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_CHUNK_SIZE: usize = 8 << 20;
pub const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 100;
pub const DEFAULT_MAX_WORKERS: usize = 4;
pub const DEFAULT_SPEED_SAMPLES: usize = 5;

/// Tuning knobs for a verification run.
///
/// None of the values affect which outcome a file gets, only how fast and how
/// chatty the run is. `full_buffer_limit` is the exception: it bounds the memory
/// the CityHash128 full-buffer mode may use and turns larger files into
/// `UnsupportedAlgorithm` outcomes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Bytes per streaming read.
    pub chunk_size: usize,
    /// Minimum spacing between throttled file-progress events.
    pub progress_interval_ms: u64,
    /// Upper bound on the worker pool size.
    pub max_workers: usize,
    /// Length of the sliding throughput window.
    pub speed_samples: usize,
    pub full_buffer_limit: Option<u64>,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            progress_interval_ms: DEFAULT_PROGRESS_INTERVAL_MS,
            max_workers: DEFAULT_MAX_WORKERS,
            speed_samples: DEFAULT_SPEED_SAMPLES,
            full_buffer_limit: None,
        }
    }
}

impl VerifyConfig {
    pub fn from_toml_str(path: &Path, text: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(text)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_toml_str(path, &text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid {
                field: "chunk_size",
                reason: "must be greater than zero".into(),
            });
        }
        if self.max_workers == 0 {
            return Err(ConfigError::Invalid {
                field: "max_workers",
                reason: "must be at least 1".into(),
            });
        }
        if self.speed_samples < 2 {
            return Err(ConfigError::Invalid {
                field: "speed_samples",
                reason: format!("need at least 2 samples, got {}", self.speed_samples),
            });
        }
        Ok(())
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}
