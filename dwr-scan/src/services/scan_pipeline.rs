//! One registry scan, end to end
//!
//! discover → validate → aggregate → write. Only configuration-level problems
//! abort; per-file failures are logged, counted and skipped.

use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::models::registry::staging_path;
use crate::models::{CleanWavRegistry, RegistryHeader};
use crate::services::entry_validator::EntryValidator;
use crate::services::file_scanner::{DiscoveryStats, FileScanner};
use crate::services::registry_builder::RegistryBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Outcome of a completed scan
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub registry: CleanWavRegistry,
    pub discovery: DiscoveryStats,
    pub output_path: PathBuf,
}

/// Scan and write the registry artifact
///
/// Nothing is written when the root or output location is unusable.
pub fn run_scan(config: &ScanConfig) -> Result<ScanReport, ScanError> {
    let scanner = FileScanner::from_config(config);
    scanner.check_root()?;
    ensure_output_writable(&config.output_path)?;

    let (registry, discovery) = build_registry(config)?;

    registry
        .save_to_file(&config.output_path)
        .map_err(|e| ScanError::OutputNotWritable(config.output_path.clone(), e.to_string()))?;
    info!(
        path = %config.output_path.display(),
        entries = registry.len(),
        "Saved registry"
    );

    Ok(ScanReport {
        registry,
        discovery,
        output_path: config.output_path.clone(),
    })
}

/// Scan without writing anything
pub fn build_registry(
    config: &ScanConfig,
) -> Result<(CleanWavRegistry, DiscoveryStats), ScanError> {
    let scanner = FileScanner::from_config(config);
    let validator = EntryValidator::from_config(config);

    let root_dir = std::fs::canonicalize(&config.root_dir)
        .map_err(|e| ScanError::RootUnreadable(config.root_dir.clone(), e.to_string()))?;

    let mut builder = RegistryBuilder::new(RegistryHeader {
        created_by: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        description: config.description.clone(),
        root_dir,
        filter_terms: config.filter_terms.clone(),
        label_source: config.label_source.to_string(),
    });

    info!(
        root = %config.root_dir.display(),
        filter_terms = ?config.filter_terms,
        label_source = %config.label_source,
        "Scanning for {} files",
        config.extension
    );

    let mut discovery = scanner.discover()?;
    for path in discovery.by_ref() {
        match validator.validate_with_resolution(&path) {
            Ok(validated) => {
                builder.add_validated(validated);
            }
            Err(e) => builder.record_rejection(&e),
        }
    }
    let stats = discovery.stats();

    debug!(
        seen = stats.files_seen,
        wrong_extension = stats.wrong_extension,
        filtered_out = stats.filtered_out,
        walk_errors = stats.walk_errors,
        candidates = stats.yielded,
        "Discovery complete"
    );

    Ok((builder.build(), stats))
}

/// Fail before scanning when the artifact location cannot be written
fn ensure_output_writable(output: &Path) -> Result<(), ScanError> {
    let not_writable = |reason: String| ScanError::OutputNotWritable(output.to_path_buf(), reason);

    if output.is_dir() {
        return Err(not_writable("path is a directory".to_string()));
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| not_writable(e.to_string()))?;
    }

    let probe = staging_path(output);
    std::fs::write(&probe, b"").map_err(|e| not_writable(e.to_string()))?;
    std::fs::remove_file(&probe).map_err(|e| not_writable(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_root_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out/registry.json");
        let config = ScanConfig::new(temp_dir.path().join("missing"), &output);

        assert!(matches!(run_scan(&config), Err(ScanError::RootNotFound(_))));
        assert!(!output.exists());
        assert!(!temp_dir.path().join("out").exists());
    }

    #[test]
    fn test_output_directory_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config = ScanConfig::new(temp_dir.path(), temp_dir.path());

        assert!(matches!(
            run_scan(&config),
            Err(ScanError::OutputNotWritable(_, _))
        ));
    }

    #[test]
    fn test_empty_root_gives_empty_registry() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("data");
        std::fs::create_dir_all(&root).unwrap();
        let output = temp_dir.path().join("registry.json");

        let report = run_scan(&ScanConfig::new(&root, &output)).unwrap();
        assert!(report.registry.is_empty());
        assert!(output.exists());
    }
}
