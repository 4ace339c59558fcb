//! Scan configuration resolution
//!
//! **Priority:** CLI → ENV → TOML → compiled defaults
//!
//! CLI and ENV are handled together by clap (`env` attribute on each flag);
//! the TOML tier and compiled defaults come from [`dwr_common::config`].

use crate::error::ScanError;
use crate::services::type_normalizer::AliasTable;
use clap::Parser;
use dwr_common::config::{expand_home, CompiledDefaults, TomlConfig};
use std::fmt;
use std::path::PathBuf;

/// Command-line arguments
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "dwr-scan",
    version,
    about = "Build the clean WAV registry for the drone audio dataset"
)]
pub struct CliArgs {
    /// TOML config file (default: ~/.config/dwr/config.toml, then /etc/dwr/config.toml)
    #[arg(long, env = "DWR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Dataset root directory to scan
    #[arg(long, env = "DWR_ROOT_DIR")]
    pub root_dir: Option<PathBuf>,

    /// Keep only files whose path contains one of these terms (repeatable, comma separated)
    #[arg(long = "filter", env = "DWR_FILTER_TERMS", value_delimiter = ',')]
    pub filter_terms: Vec<String>,

    /// Ignore filter terms from the config file
    #[arg(long, conflicts_with = "filter_terms")]
    pub no_filter: bool,

    /// Registry JSON output path
    #[arg(long, env = "DWR_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Audio file extension to collect
    #[arg(long)]
    pub extension: Option<String>,

    /// Where the drone label is read from: parent_dir, filename_prefix, path_search
    #[arg(long)]
    pub label_source: Option<String>,

    /// Log level when RUST_LOG is unset (overrides the config file)
    #[arg(long, env = "DWR_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Audit an existing registry instead of scanning
    #[arg(long)]
    pub check: bool,
}

/// Where the raw drone label is taken from in a file's path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LabelSource {
    /// Name of the directory holding the file
    #[default]
    ParentDir,
    /// File stem up to the first delimiter (`mambo_0001.wav` → `mambo`)
    FilenamePrefix { delimiter: String },
    /// Any known label found in the root-relative path
    PathSearch,
}

impl LabelSource {
    pub fn parse(name: &str, delimiter: &str) -> Result<Self, ScanError> {
        match name.trim().to_lowercase().replace('-', "_").as_str() {
            "parent_dir" => Ok(LabelSource::ParentDir),
            "filename_prefix" => {
                if delimiter.is_empty() {
                    return Err(ScanError::Config(
                        "filename_prefix label source needs a non-empty delimiter".to_string(),
                    ));
                }
                Ok(LabelSource::FilenamePrefix {
                    delimiter: delimiter.to_string(),
                })
            }
            "path_search" => Ok(LabelSource::PathSearch),
            other => Err(ScanError::Config(format!(
                "Unknown label source '{}' (expected parent_dir, filename_prefix or path_search)",
                other
            ))),
        }
    }
}

impl fmt::Display for LabelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelSource::ParentDir => write!(f, "parent_dir"),
            LabelSource::FilenamePrefix { delimiter } => {
                write!(f, "filename_prefix({})", delimiter)
            }
            LabelSource::PathSearch => write!(f, "path_search"),
        }
    }
}

/// Fully resolved configuration for one scan
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub root_dir: PathBuf,
    /// Lowercased on use; empty means no filtering
    pub filter_terms: Vec<String>,
    pub output_path: PathBuf,
    pub extension: String,
    pub label_source: LabelSource,
    pub aliases: AliasTable,
    pub description: String,
}

impl ScanConfig {
    /// Config with compiled defaults for everything but the two paths
    pub fn new(root_dir: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        let defaults = CompiledDefaults::default();
        Self {
            root_dir: root_dir.into(),
            filter_terms: Vec::new(),
            output_path: output_path.into(),
            extension: defaults.extension,
            label_source: LabelSource::default(),
            aliases: AliasTable::builtin(),
            description: defaults.description,
        }
    }

    pub fn with_filter_terms<S: Into<String>>(mut self, terms: impl IntoIterator<Item = S>) -> Self {
        self.filter_terms = terms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_label_source(mut self, label_source: LabelSource) -> Self {
        self.label_source = label_source;
        self
    }

    pub fn with_aliases(mut self, aliases: AliasTable) -> Self {
        self.aliases = aliases;
        self
    }

    /// Merge CLI/ENV arguments over the TOML tier and compiled defaults
    pub fn resolve(cli: &CliArgs, toml: &TomlConfig) -> Result<Self, ScanError> {
        let defaults = CompiledDefaults::default();
        let scan = &toml.scan;

        let root_dir = cli
            .root_dir
            .clone()
            .or_else(|| scan.root_dir.clone())
            .map(|p| expand_home(&p))
            .ok_or_else(|| {
                ScanError::Config(
                    "No root directory configured. Set one of:\n\
                     1. Command line: --root-dir /path/to/DroneAudioDataset\n\
                     2. Environment: DWR_ROOT_DIR=/path/to/DroneAudioDataset\n\
                     3. TOML config: [scan] root_dir = \"/path/to/DroneAudioDataset\""
                        .to_string(),
                )
            })?;

        let filter_terms = if cli.no_filter {
            Vec::new()
        } else if !cli.filter_terms.is_empty() {
            cli.filter_terms.clone()
        } else {
            scan.filter_terms.clone().unwrap_or_default()
        };
        let filter_terms = filter_terms
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        let output_path = resolve_output_path(cli, toml);

        let extension = cli
            .extension
            .clone()
            .or_else(|| scan.extension.clone())
            .unwrap_or(defaults.extension);
        if extension.trim_start_matches('.').is_empty() {
            return Err(ScanError::Config("Extension must not be empty".to_string()));
        }

        let delimiter = scan
            .filename_delimiter
            .clone()
            .unwrap_or(defaults.filename_delimiter);
        let label_source_name = cli
            .label_source
            .clone()
            .or_else(|| scan.label_source.clone())
            .unwrap_or(defaults.label_source);
        let label_source = LabelSource::parse(&label_source_name, &delimiter)?;

        let aliases = AliasTable::with_overrides(toml.aliases.as_slice())?;

        let description = scan.description.clone().unwrap_or(defaults.description);

        Ok(Self {
            root_dir,
            filter_terms,
            output_path,
            extension,
            label_source,
            aliases,
            description,
        })
    }
}

/// Registry artifact location: CLI/ENV flag, then TOML, then compiled default
///
/// Needs no root directory, so `--check` can audit an artifact on its own.
pub fn resolve_output_path(cli: &CliArgs, toml: &TomlConfig) -> PathBuf {
    cli.output
        .clone()
        .or_else(|| toml.scan.output_path.clone())
        .map(|p| expand_home(&p))
        .unwrap_or_else(|| CompiledDefaults::default().output_path)
}

/// Effective log level: CLI/ENV flag, then TOML `[logging] level`
pub fn resolve_log_level(cli: &CliArgs, toml: &TomlConfig) -> String {
    cli.log_level
        .clone()
        .unwrap_or_else(|| toml.logging.level.clone())
}
