//! dwr-scan - Clean WAV registry builder
//!
//! Scans the drone acoustic dataset, corrects legacy drone labels
//! (e.g. "membo" → "mambo") and writes the JSON registry consumed by the
//! training pipelines.
//!
//! Exit status is nonzero only for fatal configuration errors; files that fail
//! validation are skipped and reported.

use anyhow::{Context, Result};
use clap::Parser;
use dwr_common::config::{ConfigSource, TomlConfig};
use dwr_scan::config::{resolve_log_level, resolve_output_path, CliArgs};
use dwr_scan::services::scan_pipeline::{run_scan, ScanReport};
use dwr_scan::{CleanWavRegistry, DroneType, ScanConfig};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// Sample paths listed per drone type after a scan
const SAMPLES_PER_TYPE: usize = 3;

fn main() -> Result<()> {
    let cli = CliArgs::parse();
    let (toml, source) = TomlConfig::load(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(resolve_log_level(&cli, &toml))),
        )
        .init();

    info!("Starting dwr-scan v{}", env!("CARGO_PKG_VERSION"));
    match &source {
        ConfigSource::Defaults => warn!("No config file found, using compiled defaults"),
        other => info!("Configuration loaded from {}", other),
    }

    if cli.check {
        return check_registry(&resolve_output_path(&cli, &toml));
    }

    let config = ScanConfig::resolve(&cli, &toml)?;
    let report = run_scan(&config)?;
    print_summary(&report, &config);
    Ok(())
}

/// `--check`: audit an existing artifact against the filesystem
fn check_registry(output_path: &Path) -> Result<()> {
    let registry = CleanWavRegistry::load_from_file(output_path)
        .with_context(|| format!("Failed to load registry {}", output_path.display()))?;

    info!(
        path = %output_path.display(),
        entries = registry.len(),
        "Auditing registry"
    );

    let warnings = registry.audit_entries();
    for warning in &warnings {
        warn!("{}", warning);
    }
    info!("Audit complete: {} warning(s)", warnings.len());
    Ok(())
}

fn print_summary(report: &ScanReport, config: &ScanConfig) {
    let registry = &report.registry;
    let summary = registry.summary();
    let stats = report.discovery;

    info!("Processing complete:");
    info!("- Candidates: {} of {} files", stats.yielded, stats.files_seen);
    info!("- Registered: {}", summary.total);
    if summary.rejected > 0 {
        info!("- Rejected: {}", summary.rejected);
    }
    if summary.duplicates > 0 {
        info!("- Duplicates skipped: {}", summary.duplicates);
    }
    if summary.corrected > 0 {
        info!("- Legacy labels corrected: {}", summary.corrected);
    }
    if stats.walk_errors > 0 {
        info!("- Unreadable entries skipped: {}", stats.walk_errors);
    }

    info!("Registry summary:");
    for (drone_type, count) in &summary.counts {
        info!("- {}: {} files", drone_type.as_str().to_uppercase(), count);
    }
    if summary.unknown > 0 {
        warn!(
            "{} file(s) have an unrecognized drone label; review entries typed \"unknown\"",
            summary.unknown
        );
    }

    let root = &registry.header().root_dir;
    let mut samples: BTreeMap<DroneType, Vec<String>> = BTreeMap::new();
    for entry in registry.entries() {
        let list = samples.entry(entry.drone_type).or_default();
        if list.len() < SAMPLES_PER_TYPE {
            let shown = entry.path.strip_prefix(root).unwrap_or(&entry.path);
            list.push(shown.display().to_string());
        }
    }
    for (drone_type, files) in &samples {
        info!("{} samples:", drone_type.as_str().to_uppercase());
        for file in files {
            info!("  - {}", file);
        }
    }

    if registry.is_empty() {
        warn!(
            root = %config.root_dir.display(),
            filter_terms = ?config.filter_terms,
            "No WAV files matched; check the root directory and filter terms"
        );
    }
}
