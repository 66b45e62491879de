//! Database configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "BYTEDB_DATA_DIR";

/// Database configuration.
///
/// ```rust
/// use bytedb::Config;
///
/// let config = Config::with_data_dir("/var/lib/bytedb");
/// assert_eq!(config.data_dir.to_str(), Some("/var/lib/bytedb"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding one `<table>.db` snapshot per table.
    /// Created on open if missing.
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
        }
    }
}

impl Config {
    /// Creates a new configuration with the specified data directory.
    #[must_use]
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Default configuration, with the data directory taken from
    /// `BYTEDB_DATA_DIR` when it is set and non-empty.
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var_os(DATA_DIR_ENV) {
            Some(dir) if !dir.is_empty() => Self::with_data_dir(dir),
            _ => Self::default(),
        }
    }
}
