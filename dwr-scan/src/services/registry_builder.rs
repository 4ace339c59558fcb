//! Registry aggregation
//!
//! Collects validated entries for one scan, drops duplicate paths (first seen
//! wins), and produces a path-ordered [`CleanWavRegistry`].

use crate::error::ValidationError;
use crate::models::{CleanWavEntry, CleanWavRegistry, DroneType, RegistryHeader, RegistrySummary};
use crate::services::entry_validator::Validated;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::warn;

/// Result of adding one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// Path already registered; the earlier entry is kept
    Duplicate,
}

/// Accumulates entries during a scan
#[derive(Debug)]
pub struct RegistryBuilder {
    header: RegistryHeader,
    entries: BTreeMap<PathBuf, CleanWavEntry>,
    duplicates: usize,
    corrected: usize,
    rejected: usize,
}

impl RegistryBuilder {
    pub fn new(header: RegistryHeader) -> Self {
        Self {
            header,
            entries: BTreeMap::new(),
            duplicates: 0,
            corrected: 0,
            rejected: 0,
        }
    }

    /// Add an entry unless its path is already present
    pub fn add(&mut self, entry: CleanWavEntry) -> AddOutcome {
        if self.entries.contains_key(&entry.path) {
            self.duplicates += 1;
            warn!(path = %entry.path.display(), "Duplicate path, keeping first entry");
            return AddOutcome::Duplicate;
        }
        self.entries.insert(entry.path.clone(), entry);
        AddOutcome::Added
    }

    /// Add a validator result, counting alias corrections for kept entries
    pub fn add_validated(&mut self, validated: Validated) -> AddOutcome {
        let corrected = validated.resolution.corrected;
        let outcome = self.add(validated.entry);
        if outcome == AddOutcome::Added && corrected {
            self.corrected += 1;
        }
        outcome
    }

    /// Count a candidate that failed validation
    pub fn record_rejection(&mut self, error: &ValidationError) {
        self.rejected += 1;
        warn!(path = %error.path().display(), "Skipping file: {}", error);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Finish the scan
    pub fn build(self) -> CleanWavRegistry {
        let entries: Vec<CleanWavEntry> = self.entries.into_values().collect();

        let mut counts: BTreeMap<DroneType, usize> =
            DroneType::ALL.iter().map(|t| (*t, 0)).collect();
        for entry in &entries {
            *counts.entry(entry.drone_type).or_insert(0) += 1;
        }

        let summary = RegistrySummary {
            total: entries.len(),
            unknown: counts[&DroneType::Unknown],
            counts,
            duplicates: self.duplicates,
            corrected: self.corrected,
            rejected: self.rejected,
        };

        CleanWavRegistry::from_parts(self.header, entries, summary)
    }
}
