//! Backend selection from configuration
//!
//! ```toml
//! backend = "s3"
//!
//! [s3]
//! bucket = "uploads"
//! region = "eu-west-1"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::backend::StorageService;
use crate::error::StorageError;
use crate::local::LocalStorage;
use crate::memory::MemoryStorage;
use crate::remote::RemoteStorage;
use crate::s3::S3Config;

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// One of "memory", "local", or "s3"
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default)]
    pub local: LocalStorageConfig,
    #[serde(default)]
    pub s3: S3Config,
}

/// Local storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStorageConfig {
    #[serde(default = "default_local_path")]
    pub path: String,
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            path: default_local_path(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            local: LocalStorageConfig::default(),
            s3: S3Config::default(),
        }
    }
}

fn default_backend() -> String {
    "local".to_string()
}

fn default_local_path() -> String {
    "./data/files".to_string()
}

impl StorageConfig {
    /// Parse configuration from TOML
    pub fn from_toml_str(content: &str) -> Result<Self, StorageError> {
        toml::from_str(content)
            .map_err(|e| StorageError::Configuration(format!("Failed to parse config: {}", e)))
    }

    /// Load configuration from a file, falling back to defaults if it does not exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            StorageError::Configuration(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        Self::from_toml_str(&content)
    }

    /// Create the configured backend
    pub async fn build(&self) -> Result<Arc<dyn StorageService>, StorageError> {
        info!("Using {} storage backend", self.backend);

        match self.backend.as_str() {
            "memory" => Ok(Arc::new(MemoryStorage::new())),
            "local" => Ok(Arc::new(LocalStorage::new(&self.local.path).await?)),
            "s3" => Ok(Arc::new(RemoteStorage::s3(self.s3.clone())?)),
            other => Err(StorageError::Configuration(format!(
                "Unknown storage backend: {}",
                other
            ))),
        }
    }
}
