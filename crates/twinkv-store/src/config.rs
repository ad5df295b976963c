//! Backend selection and TOML configuration.
//!
//! ```toml
//! backend = "embedded"
//! path = "/var/lib/twinkv/store.redb"
//! ```
//!
//! ```toml
//! backend = "distributed"
//! address = "127.0.0.1:8500"
//! timeout_secs = 10
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::distributed::DistributedStore;
use crate::embedded::EmbeddedStore;
use crate::error::{StoreError, StoreResult};
use crate::traits::Store;

/// Which backend implementation to use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Local single-file store with containers.
    #[default]
    Embedded,
    /// Remote flat keyspace.
    Distributed,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embedded => f.write_str("embedded"),
            Self::Distributed => f.write_str("distributed"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = StoreError;

    fn from_str(s: &str) -> StoreResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "embedded" => Ok(Self::Embedded),
            "distributed" => Ok(Self::Distributed),
            other => Err(StoreError::Config(format!("unknown backend: {other:?}"))),
        }
    }
}

/// Open a store of the given kind from positional options.
pub fn open_store(kind: BackendKind, options: &[String]) -> StoreResult<Box<dyn Store>> {
    Ok(match kind {
        BackendKind::Embedded => Box::new(EmbeddedStore::init(options)?),
        BackendKind::Distributed => Box::new(DistributedStore::init(options)?),
    })
}

/// Store configuration as read from a TOML file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: BackendKind,
    /// Store file (embedded).
    pub path: Option<PathBuf>,
    /// Server address (distributed).
    pub address: Option<String>,
    /// Request timeout in seconds (distributed).
    pub timeout_secs: Option<u64>,
}

impl StoreConfig {
    pub fn embedded(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: BackendKind::Embedded,
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn distributed(address: impl Into<String>, timeout_secs: Option<u64>) -> Self {
        Self {
            backend: BackendKind::Distributed,
            address: Some(address.into()),
            timeout_secs,
            ..Self::default()
        }
    }

    pub fn from_toml_str(s: &str) -> StoreResult<Self> {
        toml::from_str(s).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Lower to the positional options the backend's `init` expects.
    pub fn options(&self) -> StoreResult<Vec<String>> {
        match self.backend {
            BackendKind::Embedded => {
                let path = self.path.as_ref().ok_or_else(|| {
                    StoreError::Config("embedded backend requires `path`".into())
                })?;
                Ok(vec![path.display().to_string()])
            }
            BackendKind::Distributed => {
                let address = self.address.as_ref().ok_or_else(|| {
                    StoreError::Config("distributed backend requires `address`".into())
                })?;
                let mut options = vec![address.clone()];
                if let Some(secs) = self.timeout_secs {
                    options.push(secs.to_string());
                }
                Ok(options)
            }
        }
    }

    /// Open the configured store.
    pub fn open(&self) -> StoreResult<Box<dyn Store>> {
        open_store(self.backend, &self.options()?)
    }
}
