//! Clean WAV registry artifact
//!
//! JSON layout (schema version 1):
//!
//! ```json
//! {
//!   "version": 1,
//!   "header": { "created_by": "...", "root_dir": "...", ... },
//!   "entries": [ { "path": "...", "drone_type": "mambo", ... } ],
//!   "summary": { "counts": { "bebop": 0, ... }, "total": 0, "unknown": 0, ... }
//! }
//! ```
//!
//! Downstream training code reads this file directly. Any change to its shape
//! must bump [`SCHEMA_VERSION`].

use super::{CleanWavEntry, DroneType};
use dwr_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Current artifact schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Files smaller than this are flagged by [`CleanWavRegistry::audit_entries`]
pub const SUSPICIOUS_SIZE_BYTES: u64 = 1024;

/// Metadata about how the registry was produced
///
/// Carries no timestamp so identical input trees give identical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryHeader {
    /// Tool name and version
    pub created_by: String,
    pub description: String,
    /// Absolute scan root
    pub root_dir: PathBuf,
    pub filter_terms: Vec<String>,
    /// How drone labels were extracted from paths
    pub label_source: String,
}

/// Aggregate counts written next to the entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySummary {
    /// Entry count per canonical type, every type present
    pub counts: BTreeMap<DroneType, usize>,
    pub total: usize,
    pub unknown: usize,
    /// Candidates dropped because their path was already registered
    pub duplicates: usize,
    /// Entries whose label was corrected through the alias table
    pub corrected: usize,
    /// Candidates that failed validation
    pub rejected: usize,
}

/// Validated, deduplicated, path-ordered registry
///
/// Entries can only be added through
/// [`crate::services::registry_builder::RegistryBuilder`]; a built registry is
/// read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanWavRegistry {
    version: u32,
    header: RegistryHeader,
    entries: Vec<CleanWavEntry>,
    summary: RegistrySummary,
}

impl CleanWavRegistry {
    /// Assemble a registry; `entries` must already be unique and sorted by path
    pub(crate) fn from_parts(
        header: RegistryHeader,
        entries: Vec<CleanWavEntry>,
        summary: RegistrySummary,
    ) -> Self {
        Self {
            version: SCHEMA_VERSION,
            header,
            entries,
            summary,
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn header(&self) -> &RegistryHeader {
        &self.header
    }

    pub fn entries(&self) -> &[CleanWavEntry] {
        &self.entries
    }

    pub fn summary(&self) -> &RegistrySummary {
        &self.summary
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by its canonical path
    pub fn get(&self, path: &Path) -> Option<&CleanWavEntry> {
        self.entries
            .binary_search_by(|e| e.path.as_path().cmp(path))
            .ok()
            .map(|i| &self.entries[i])
    }

    /// Count entries by drone type, computed from the entries themselves
    pub fn count_by_drone_type(&self) -> BTreeMap<DroneType, usize> {
        let mut counts: BTreeMap<DroneType, usize> =
            DroneType::ALL.iter().map(|t| (*t, 0)).collect();
        for entry in &self.entries {
            *counts.entry(entry.drone_type).or_insert(0) += 1;
        }
        counts
    }

    /// Serialize to the artifact format
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Write the artifact, replacing any previous one
    ///
    /// Writes to a sibling staging file and renames it over the target, so a
    /// failure never leaves a truncated artifact behind.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let staging = staging_path(path);
        std::fs::write(&staging, self.to_json()?)?;
        if let Err(e) = std::fs::rename(&staging, path) {
            let _ = std::fs::remove_file(&staging);
            return Err(Error::Io(e));
        }

        tracing::debug!(path = %path.display(), entries = self.len(), "Registry written");
        Ok(())
    }

    /// Parse an artifact written by [`Self::save_to_file`]
    ///
    /// Rejects other schema versions and entry lists that are not strictly
    /// ordered by path, since [`Self::get`] depends on that order.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let registry: Self = serde_json::from_str(&content)?;
        if registry.version != SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Unsupported registry schema version {} in {} (expected {})",
                registry.version,
                path.display(),
                SCHEMA_VERSION
            )));
        }
        if let Some(pair) = registry
            .entries
            .windows(2)
            .find(|pair| pair[0].path >= pair[1].path)
        {
            return Err(Error::Config(format!(
                "Registry entries in {} are not unique and sorted by path at {}",
                path.display(),
                pair[1].path.display()
            )));
        }
        Ok(registry)
    }

    /// Re-check persisted entries against the filesystem
    ///
    /// Returns one warning per problem: missing file, size changed since the
    /// scan, or a file too small to hold a useful sample.
    pub fn audit_entries(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        for (i, entry) in self.entries.iter().enumerate() {
            match std::fs::metadata(&entry.path) {
                Ok(meta) => {
                    if meta.len() != entry.size_bytes {
                        warnings.push(format!(
                            "Entry {}: Size changed since scan ({} -> {} bytes): {}",
                            i,
                            entry.size_bytes,
                            meta.len(),
                            entry.path.display()
                        ));
                    }
                }
                Err(_) => {
                    warnings.push(format!(
                        "Entry {}: File no longer exists: {}",
                        i,
                        entry.path.display()
                    ));
                }
            }

            if entry.size_bytes < SUSPICIOUS_SIZE_BYTES {
                warnings.push(format!(
                    "Entry {}: Suspiciously small file size: {} bytes",
                    i, entry.size_bytes
                ));
            }
        }

        warnings
    }
}

/// Staging file used while writing `output`
pub fn staging_path(output: &Path) -> PathBuf {
    let mut name = output
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    output.with_file_name(name)
}
