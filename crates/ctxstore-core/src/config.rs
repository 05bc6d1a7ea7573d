use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Store configuration, persisted as `.ctxstore/config.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Journal length at which an update triggers synchronous compaction.
    #[serde(default = "default_compact_threshold")]
    pub compact_threshold: usize,
}

fn default_version() -> u32 {
    1
}

fn default_compact_threshold() -> usize {
    50
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            compact_threshold: default_compact_threshold(),
        }
    }
}

impl StoreConfig {
    /// Load the config, falling back to defaults when the file is absent.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: StoreConfig = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
