//! `pstyle.toml` configuration.
//!
//! ```toml
//! [convert]
//! from_style = "named"
//! to_style = "qmark"
//! normalize = true
//!
//! [database]
//! url = "sqlite://app.db"
//! max_connections = 5
//! ```
//!
//! `PSTYLE_DATABASE_URL` overrides `database.url`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{PstyleError, PstyleResult};
use crate::style::Style;

pub const CONFIG_FILE: &str = "pstyle.toml";
pub const DATABASE_URL_ENV: &str = "PSTYLE_DATABASE_URL";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub convert: ConvertConfig,
    pub database: DatabaseConfig,
}

/// Defaults for the `conv` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    pub from_style: Option<Style>,
    pub to_style: Option<Style>,
    pub normalize: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            from_style: None,
            to_style: None,
            normalize: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    /// Style the database accepts; inferred from the URL when unset.
    pub paramstyle: Option<Style>,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            paramstyle: None,
            max_connections: Self::DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Otherwise `./pstyle.toml` is tried, then
    /// `<config dir>/pstyle/pstyle.toml`, then built-in defaults.
    pub fn load(explicit: Option<&Path>) -> PstyleResult<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_path(path)?,
            None => match Self::search_paths().into_iter().find(|p| p.is_file()) {
                Some(path) => Self::from_path(&path)?,
                None => {
                    debug!("no {} found, using defaults", CONFIG_FILE);
                    Self::default()
                }
            },
        };

        if let Ok(url) = std::env::var(DATABASE_URL_ENV) {
            config.database.url = Some(url);
        }
        Ok(config)
    }

    pub fn from_path(path: &Path) -> PstyleResult<Self> {
        debug!("reading config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| PstyleError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml_str(content: &str) -> PstyleResult<Self> {
        toml::from_str(content).map_err(|e| PstyleError::Config(e.to_string()))
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("pstyle").join(CONFIG_FILE));
        }
        paths
    }
}
