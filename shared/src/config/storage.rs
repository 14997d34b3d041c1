//! Storage backend selection

use serde::{Deserialize, Serialize};

use super::{env_parse, ConfigError};

/// Which storage backend holds rate-limit state and token records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// In-process concurrent map; state is lost on restart and not shared
    Memory,
    /// Shared Redis store for stateless, horizontally scaled deployments
    Redis,
}

impl std::str::FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "in-memory" | "local" => Ok(StorageKind::Memory),
            "redis" => Ok(StorageKind::Redis),
            _ => Err(format!("Invalid storage type: {}", s)),
        }
    }
}

impl std::fmt::Display for StorageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageKind::Memory => write!(f, "memory"),
            StorageKind::Redis => write!(f, "redis"),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Selected backend
    pub kind: StorageKind,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kind: StorageKind::Memory,
        }
    }
}

impl StorageConfig {
    /// Read `STORAGE_TYPE` (memory | redis)
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            kind: env_parse("STORAGE_TYPE")?.unwrap_or(StorageKind::Memory),
        })
    }
}
