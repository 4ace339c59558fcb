//! Command-line and environment configuration tests
//!
//! Uses serial_test because clap reads DWR_* environment variables; tests that
//! set them must not run in parallel with tests that parse arguments.

use clap::Parser;
use dwr_common::config::TomlConfig;
use dwr_scan::config::{CliArgs, LabelSource};
use dwr_scan::ScanConfig;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

const DWR_VARS: [&str; 5] = [
    "DWR_CONFIG",
    "DWR_ROOT_DIR",
    "DWR_FILTER_TERMS",
    "DWR_OUTPUT",
    "DWR_LOG_LEVEL",
];

fn clear_env() {
    for var in DWR_VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_cli_flags() {
    clear_env();
    let cli = CliArgs::try_parse_from([
        "dwr-scan",
        "--root-dir",
        "/data/drones",
        "--filter",
        "bebop,mambo",
        "--filter",
        "drone",
        "--output",
        "/tmp/registry.json",
        "--label-source",
        "path_search",
    ])
    .unwrap();

    assert_eq!(cli.root_dir, Some(PathBuf::from("/data/drones")));
    assert_eq!(cli.filter_terms, vec!["bebop", "mambo", "drone"]);

    let config = ScanConfig::resolve(&cli, &TomlConfig::default()).unwrap();
    assert_eq!(config.output_path, PathBuf::from("/tmp/registry.json"));
    assert_eq!(config.label_source, LabelSource::PathSearch);
}

#[test]
#[serial]
fn test_env_vars_fill_in_for_flags() {
    clear_env();
    env::set_var("DWR_ROOT_DIR", "/env/root");
    env::set_var("DWR_FILTER_TERMS", "bebop, mambo");
    env::set_var("DWR_OUTPUT", "/env/out.json");

    let cli = CliArgs::try_parse_from(["dwr-scan"]).unwrap();
    let config = ScanConfig::resolve(&cli, &TomlConfig::default()).unwrap();
    clear_env();

    assert_eq!(config.root_dir, PathBuf::from("/env/root"));
    assert_eq!(config.filter_terms, vec!["bebop".to_string(), "mambo".to_string()]);
    assert_eq!(config.output_path, PathBuf::from("/env/out.json"));
}

#[test]
#[serial]
fn test_cli_beats_env() {
    clear_env();
    env::set_var("DWR_ROOT_DIR", "/env/root");

    let cli = CliArgs::try_parse_from(["dwr-scan", "--root-dir", "/cli/root"]).unwrap();
    clear_env();

    assert_eq!(cli.root_dir, Some(PathBuf::from("/cli/root")));
}

#[test]
#[serial]
fn test_no_filter_conflicts_with_filter() {
    clear_env();
    let result = CliArgs::try_parse_from(["dwr-scan", "--no-filter", "--filter", "drone"]);
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_config_file_via_env() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("training_data.toml");
    std::fs::write(
        &path,
        "[scan]\nroot_dir = \"/toml/root\"\nfilter_terms = [\"bebop\"]\n\n[aliases]\nbebob = \"bebop\"\n",
    )
    .unwrap();
    env::set_var("DWR_CONFIG", &path);

    let cli = CliArgs::try_parse_from(["dwr-scan"]).unwrap();
    clear_env();

    let (toml, _) = TomlConfig::load(cli.config.as_deref()).unwrap();
    let config = ScanConfig::resolve(&cli, &toml).unwrap();

    assert_eq!(config.root_dir, PathBuf::from("/toml/root"));
    assert_eq!(config.filter_terms, vec!["bebop".to_string()]);
    assert_eq!(
        config.aliases.resolve("Bebob").drone_type,
        dwr_scan::DroneType::Bebop
    );
}
