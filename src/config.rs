// src/config.rs
//! Runtime configuration (TOML).
//!
//! Resolution order:
//! 1) $MOTOR_MATCH_CONFIG_PATH (must exist)
//! 2) config/motor_match.toml
//! 3) built-in defaults
//!
//! ```toml
//! [inputs]
//! drafts = ["data/drafts/memo.json", "data/drafts/datasheet.json"]
//! catalog = "data/catalog.json"
//!
//! [output]
//! dir = "outputs"
//!
//! [consolidation]
//! unknown_fields = "extension"   # or "reject"
//!
//! [ranking]
//! parallel = false
//! summary_rows = 5
//!
//! [metrics]
//! enabled = true
//! ```

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::requirements::UnknownFieldPolicy;

pub const ENV_CONFIG_PATH: &str = "MOTOR_MATCH_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/motor_match.toml";

const SUMMARY_ROWS_MAX: usize = 50;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub inputs: InputsConfig,
    pub output: OutputConfig,
    pub consolidation: ConsolidationConfig,
    pub ranking: RankingConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputsConfig {
    pub drafts: Vec<PathBuf>,
    pub catalog: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("outputs"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidationConfig {
    pub unknown_fields: UnknownFieldPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub parallel: bool,
    pub summary_rows: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            summary_rows: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl AppConfig {
    /// Load from an explicit TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let cfg = Self::parse(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        info!(target: "config", path = %path.display(), "config loaded");
        Ok(cfg)
    }

    /// Env path, then the default path, then built-in defaults.
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        let default = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default.exists() {
            return Self::load_from(&default);
        }
        Ok(Self::default())
    }

    pub fn parse(s: &str) -> Result<Self> {
        let cfg: AppConfig = toml::from_str(s)?;
        Ok(cfg.sanitized())
    }

    fn sanitized(mut self) -> Self {
        self.ranking.summary_rows = self.ranking.summary_rows.clamp(1, SUMMARY_ROWS_MAX);
        self
    }
}
