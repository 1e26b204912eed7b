// src/config.rs
//! Patcher configuration

use crate::ConfigError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LOG_PREFIX: &str = "[MonkeyPatcher] ";

/// Where the namespace conflict check looks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictScope {
    /// Own and inherited properties of the target prototype
    #[default]
    PrototypeChain,
    /// Own properties only; an inherited member may be shadowed
    OwnOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatcherConfig {
    pub log_prefix: String,
    pub conflict_scope: ConflictScope,
}

impl Default for PatcherConfig {
    fn default() -> Self {
        Self {
            log_prefix: DEFAULT_LOG_PREFIX.to_string(),
            conflict_scope: ConflictScope::default(),
        }
    }
}

impl PatcherConfig {
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }
}
