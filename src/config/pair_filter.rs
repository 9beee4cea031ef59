use crate::features::SiftParams;
use crate::kvld::{KvldParameters, MAX_RUNS};
use crate::matching::RatioMatcherParams;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("config {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// Tunables of the pairwise filter tool. Every section is optional.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PairFilterConfig {
    pub describer: SiftParams,
    pub matching: RatioMatcherParams,
    pub kvld: KvldParameters,
    /// Upper bound on K-VLD runs in the relaxation loop.
    pub max_runs: usize,
}

impl Default for PairFilterConfig {
    fn default() -> Self {
        Self {
            describer: SiftParams::default(),
            matching: RatioMatcherParams::default(),
            kvld: KvldParameters::default(),
            max_runs: MAX_RUNS,
        }
    }
}

impl PairFilterConfig {
    fn validate(&self) -> Result<(), String> {
        if !(self.matching.ratio > 0.0 && self.matching.ratio <= 1.0) {
            return Err(format!("matching.ratio must be in (0, 1], got {}", self.matching.ratio));
        }
        if !(self.kvld.inlier_rate > 0.0 && self.kvld.inlier_rate <= 1.0) {
            return Err(format!(
                "kvld.inlier_rate must be in (0, 1], got {}",
                self.kvld.inlier_rate
            ));
        }
        if self.max_runs == 0 || self.max_runs > MAX_RUNS {
            return Err(format!("max_runs must be in 1..={MAX_RUNS}, got {}", self.max_runs));
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<PairFilterConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: PairFilterConfig =
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    config.validate().map_err(|reason| ConfigError::Invalid {
        path: path.to_path_buf(),
        reason,
    })?;
    Ok(config)
}
