//! File-based configuration for opening an index.
//!
//! ```toml
//! path = "/var/lib/graph/node-ids.redb"
//! create_if_missing = true
//! lock_stripes = 2048
//! cache_size_bytes = 67108864
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::index::IndexOptions;
use crate::primitives::concurrency::DEFAULT_LOCK_STRIPES;

/// On-disk form of the index tunables.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    /// Location of the store file.
    pub path: Option<PathBuf>,
    /// Create the store when absent.
    pub create_if_missing: bool,
    /// Lock stripe count.
    pub lock_stripes: usize,
    /// Store page cache budget in bytes.
    pub cache_size_bytes: Option<usize>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: None,
            create_if_missing: true,
            lock_stripes: DEFAULT_LOCK_STRIPES,
            cache_size_bytes: None,
        }
    }
}

impl IndexConfig {
    /// Reads and parses a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses TOML text that did not come from a file.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })
    }

    /// Serializes back to TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|source| ConfigError::Serialize { source })
    }

    /// The configured store path, or an error if none was set.
    pub fn require_path(&self) -> Result<&Path, ConfigError> {
        self.path.as_deref().ok_or(ConfigError::MissingPath)
    }

    /// Open options carrying these tunables.
    pub fn to_options(&self) -> IndexOptions {
        let mut options = IndexOptions::new()
            .create_if_missing(self.create_if_missing)
            .lock_stripes(self.lock_stripes);
        if let Some(bytes) = self.cache_size_bytes {
            options = options.cache_size_bytes(bytes);
        }
        options
    }
}

/// Errors raised while loading an [`IndexConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read index config {path}: {source}")]
    Read {
        /// File that was read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file is not valid TOML for [`IndexConfig`].
    #[error("failed to parse index config {path}: {source}")]
    Parse {
        /// File that was parsed.
        path: PathBuf,
        /// Underlying error.
        source: toml::de::Error,
    },
    /// The config could not be rendered as TOML.
    #[error("failed to serialize index config: {source}")]
    Serialize {
        /// Underlying error.
        source: toml::ser::Error,
    },
    /// No `path` key was present.
    #[error("index config has no store path")]
    MissingPath,
}
