//! Configuration for the AIPanel engine.
//!
//! Settings live in a JSON file inside the panel data directory. The
//! only tunable today is the optional delegation channel; without one
//! the panel runs on simulated replies.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Top-level panel configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PanelConfig {
    /// External assistant to delegate turns to; `None` means
    /// simulated replies only.
    #[serde(default)]
    pub delegate: Option<DelegateConfig>,
}

impl PanelConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Configuration for the delegation channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelegateConfig {
    /// Command and arguments to invoke the external assistant.
    pub command_argv: Vec<String>,

    /// Maximum time to wait for a delegated reply before falling back.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    30
}
