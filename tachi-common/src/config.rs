//! Bootstrap configuration loading
//!
//! Resolution order for every setting:
//! 1. Command-line argument (handled by the binary)
//! 2. TOML config file
//! 3. Compiled default
//!
//! A missing TOML file is not an error: a warning is logged and compiled
//! defaults are used.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::import_types::ImportType;
use crate::{Error, Result};

/// Bootstrap configuration loaded from TOML
///
/// Read once at startup; changes require a restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    /// SQLite database file. Defaults to `tachi.db` in the data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// HTTP bind address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub import: ImportConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            port: default_port(),
            bind_address: default_bind_address(),
            logging: LoggingConfig::default(),
            import: ImportConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` overrides it.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Import pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Version tokens each import type may produce, keyed by import type.
    ///
    /// Checked against the newest version seen in every import.
    #[serde(default = "default_supported_versions")]
    pub supported_versions: BTreeMap<String, Vec<String>>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            supported_versions: default_supported_versions(),
        }
    }
}

impl ImportConfig {
    /// Allowed version tokens for an import type (empty if none configured)
    pub fn allowed_versions(&self, import_type: ImportType) -> &[String] {
        self.supported_versions
            .get(import_type.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn validate(&self) -> Result<()> {
        for key in self.supported_versions.keys() {
            key.parse::<ImportType>().map_err(|_| {
                Error::Config(format!(
                    "[import.supported_versions] has unknown import type '{}'",
                    key
                ))
            })?;
        }
        Ok(())
    }
}

fn default_port() -> u16 {
    8080
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_supported_versions() -> BTreeMap<String, Vec<String>> {
    let versions = |list: &[&str]| list.iter().map(|v| v.to_string()).collect::<Vec<_>>();

    let mut map = BTreeMap::new();
    map.insert(
        ImportType::FileEamusementIidxCsv.to_string(),
        versions(&["26", "27", "28", "29"]),
    );
    map.insert(
        ImportType::FilePliIidxCsv.to_string(),
        versions(&["26", "27", "28", "29"]),
    );
    map.insert(ImportType::ApiArcIidx.to_string(), versions(&["27", "28", "29"]));
    map.insert(
        ImportType::IrFervidex.to_string(),
        versions(&["27", "28", "29", "inf"]),
    );
    map
}

impl TomlConfig {
    /// Load configuration from a TOML file
    ///
    /// With no explicit path the platform config location is tried. A missing
    /// file yields defaults; an unreadable or invalid file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) => p,
                None => {
                    warn!("Could not determine config directory, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        if !path.exists() {
            warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&content)?;

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.import.validate()?;
        Ok(config)
    }

    /// Database path, falling back to the platform data directory
    pub fn resolved_database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| default_data_dir().join("tachi.db"))
    }
}

/// Platform config file location (`~/.config/tachi/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tachi").join("config.toml"))
}

/// OS-dependent data directory
pub fn default_data_dir() -> PathBuf {
    if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("tachi"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\tachi"))
    } else if cfg!(any(target_os = "linux", target_os = "macos")) {
        dirs::data_local_dir()
            .map(|d| d.join("tachi"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/tachi"))
    } else {
        PathBuf::from("./tachi_data")
    }
}
