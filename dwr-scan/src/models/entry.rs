//! Clean WAV registry entry

use super::DroneType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One validated audio file
///
/// Built by [`crate::services::entry_validator::EntryValidator`]; the fields
/// are public for reading but nothing else in the crate constructs entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanWavEntry {
    /// Absolute path with symlinks resolved; unique within a registry
    pub path: PathBuf,
    /// Canonical drone label
    pub drone_type: DroneType,
    /// File length in bytes, always > 0
    pub size_bytes: u64,
    /// Last modification time at scan time
    pub modified: DateTime<Utc>,
    /// From the WAV header, when readable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
}
