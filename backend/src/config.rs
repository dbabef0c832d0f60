//! # Store Configuration
//!
//! Settings shared by the account and child stores, loadable from YAML:
//!
//! ```yaml
//! data_directory: "/home/alice/.local/share/childcare-tracker"
//! hash_algorithm: "sha512"
//! ```
//!
//! Missing keys take their defaults, so an empty file is a valid config.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::data_directory_service::resolve_data_directory;
use crate::domain::hashing::HashAlgorithm;
use crate::error::{Result, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Root under which `accounts.dat`, `extrafields.dat` and one directory per owner live
    pub data_directory: PathBuf,
    /// Name of the digest used for credentials
    pub hash_algorithm: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_directory: resolve_data_directory(),
            hash_algorithm: HashAlgorithm::default().name().to_string(),
        }
    }
}

impl StoreConfig {
    /// Load a config from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml_content = fs::read_to_string(path)
            .map_err(|e| StoreError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let config = Self::from_yaml(&yaml_content)
            .map_err(|e| StoreError::Config(format!("{}: {}", path.display(), e)))?;
        debug!("Loaded store config from {:?}", path);
        Ok(config)
    }

    fn from_yaml(yaml_content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        // serde_yaml reads an empty document as null rather than an empty mapping
        if yaml_content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml_content)
    }

    pub fn with_data_directory<P: Into<PathBuf>>(mut self, data_directory: P) -> Self {
        self.data_directory = data_directory.into();
        self
    }

    pub fn with_hash_algorithm(mut self, hash_algorithm: impl Into<String>) -> Self {
        self.hash_algorithm = hash_algorithm.into();
        self
    }

    /// Resolve the configured digest; fails with `HashUnavailable` for an unknown name
    pub fn hash_algorithm(&self) -> Result<HashAlgorithm> {
        HashAlgorithm::from_name(&self.hash_algorithm)
    }
}
