//! Configuration file model and discovery
//!
//! Configuration for the registry tools resolves in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! This module owns tiers 3 and 4. Command-line and environment handling live
//! with each binary.

use crate::{Error, Result};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the per-user config directory (`~/.config/dwr`)
pub const CONFIG_DIR_NAME: &str = "dwr";

/// Config file name inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// System-wide config location checked after the user config on Linux
pub const SYSTEM_CONFIG_PATH: &str = "/etc/dwr/config.toml";

/// Compiled defaults used when neither CLI, environment nor TOML supply a value
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledDefaults {
    pub output_path: PathBuf,
    pub extension: String,
    pub label_source: String,
    pub filename_delimiter: String,
    pub description: String,
    pub log_level: String,
}

impl Default for CompiledDefaults {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("output/clean_wav_registry.json"),
            extension: "wav".to_string(),
            label_source: "parent_dir".to_string(),
            filename_delimiter: "_".to_string(),
            description: "Clean WAV file registry".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// `[scan]` section of the TOML config
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSection {
    pub root_dir: Option<PathBuf>,
    pub filter_terms: Option<Vec<String>>,
    pub output_path: Option<PathBuf>,
    pub extension: Option<String>,
    pub label_source: Option<String>,
    pub filename_delimiter: Option<String>,
    pub description: Option<String>,
}

/// `[logging]` section of the TOML config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: CompiledDefaults::default().log_level,
        }
    }
}

/// Parsed TOML config file
///
/// Every field is optional so a partial file (or no file at all) is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub scan: ScanSection,
    /// Raw label → canonical label overrides, appended to the built-in alias table
    pub aliases: AliasOverrides,
    pub logging: LoggingConfig,
}

/// `[aliases]` entries in the order they appear in the file
///
/// Order matters: when a path contains several labels, the first alias in
/// table order wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasOverrides(Vec<(String, String)>);

impl AliasOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an override, or replace the target of an existing key in place
    pub fn insert(&mut self, raw: impl Into<String>, target: impl Into<String>) {
        let (raw, target) = (raw.into(), target.into());
        match self.0.iter_mut().find(|(k, _)| *k == raw) {
            Some(existing) => existing.1 = target,
            None => self.0.push((raw, target)),
        }
    }

    pub fn get(&self, raw: &str) -> Option<&String> {
        self.0.iter().find(|(k, _)| k == raw).map(|(_, t)| t)
    }

    pub fn as_slice(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for AliasOverrides {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (raw, target) in &self.0 {
            map.serialize_entry(raw, target)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AliasOverrides {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OverridesVisitor;

        impl<'de> Visitor<'de> for OverridesVisitor {
            type Value = AliasOverrides;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of label = \"canonical label\" pairs")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut overrides = AliasOverrides::new();
                while let Some((raw, target)) = access.next_entry::<String, String>()? {
                    overrides.insert(raw, target);
                }
                Ok(overrides)
            }
        }

        deserializer.deserialize_map(OverridesVisitor)
    }
}

impl TomlConfig {
    /// Parse a config file from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        let config = toml::from_str(&content)?;
        debug!(path = %path.display(), "Parsed config file");
        Ok(config)
    }

    /// Load the TOML tier of the configuration
    ///
    /// An explicitly requested file must exist and parse. When no file is
    /// requested the default locations are probed, and finding none is not an
    /// error: compiled defaults apply.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            let config = Self::from_file(path)?;
            return Ok((config, ConfigSource::Explicit(path.to_path_buf())));
        }

        match locate_config_file() {
            Some(path) => {
                let config = Self::from_file(&path)?;
                Ok((config, ConfigSource::Discovered(path)))
            }
            None => Ok((Self::default(), ConfigSource::Defaults)),
        }
    }
}

/// Where the TOML tier came from
///
/// Reported by the binary once tracing is initialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Path given on the command line or via environment
    Explicit(PathBuf),
    /// Found in one of the default locations
    Discovered(PathBuf),
    /// No file found; compiled defaults only
    Defaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Explicit(p) | ConfigSource::Discovered(p) => {
                write!(f, "{}", p.display())
            }
            ConfigSource::Defaults => write!(f, "compiled defaults"),
        }
    }
}

/// Find the first existing config file among the default locations
pub fn locate_config_file() -> Option<PathBuf> {
    default_config_paths().into_iter().find(|p| p.exists())
}

/// Default config file locations for the current platform, in probe order
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
    }
    if cfg!(target_os = "linux") {
        paths.push(PathBuf::from(SYSTEM_CONFIG_PATH));
    }
    paths
}

/// Expand a leading `~` to the user's home directory
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
