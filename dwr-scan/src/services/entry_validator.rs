//! Entry validation
//!
//! Turns one candidate path into a [`CleanWavEntry`] or a [`ValidationError`].
//! Only reads metadata (stat + WAV header); source files are never modified.

use crate::config::{LabelSource, ScanConfig};
use crate::error::ValidationError;
use crate::models::{CleanWavEntry, DroneType};
use crate::services::type_normalizer::{normalize_key, AliasTable, Resolution};
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A validated entry together with how its label was resolved
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    pub entry: CleanWavEntry,
    pub resolution: Resolution,
    /// Label text as found in the path
    pub raw_label: String,
}

/// Builds registry entries from candidate paths
#[derive(Debug, Clone)]
pub struct EntryValidator {
    root: PathBuf,
    /// `root` with symlinks resolved, when it exists
    canonical_root: PathBuf,
    label_source: LabelSource,
    aliases: AliasTable,
}

impl EntryValidator {
    pub fn new(root: impl Into<PathBuf>, label_source: LabelSource, aliases: AliasTable) -> Self {
        let root = root.into();
        let canonical_root = std::fs::canonicalize(&root).unwrap_or_else(|_| root.clone());
        Self {
            root,
            canonical_root,
            label_source,
            aliases,
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(
            &config.root_dir,
            config.label_source.clone(),
            config.aliases.clone(),
        )
    }

    /// Validate one file into an entry
    pub fn validate(&self, path: &Path) -> Result<CleanWavEntry, ValidationError> {
        self.validate_with_resolution(path).map(|v| v.entry)
    }

    /// Validate one file, keeping the label resolution for reporting
    pub fn validate_with_resolution(&self, path: &Path) -> Result<Validated, ValidationError> {
        let meta = std::fs::metadata(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ValidationError::NotFound(path.to_path_buf()),
            _ => ValidationError::Unreadable(path.to_path_buf(), e.to_string()),
        })?;

        if !meta.is_file() {
            return Err(ValidationError::NotARegularFile(path.to_path_buf()));
        }

        if meta.len() == 0 {
            return Err(ValidationError::Empty(path.to_path_buf()));
        }

        let canonical = std::fs::canonicalize(path)
            .map_err(|e| ValidationError::Unreadable(path.to_path_buf(), e.to_string()))?;

        // Label the file by where it lives, not by the link it was reached through
        let label_path = if canonical.starts_with(&self.canonical_root) {
            canonical.as_path()
        } else {
            path
        };
        let (raw_label, resolution) = self
            .extract_label(label_path)
            .ok_or_else(|| ValidationError::LabelMissing(path.to_path_buf()))?;

        let modified: DateTime<Utc> = meta
            .modified()
            .map(DateTime::from)
            .map_err(|e| ValidationError::Unreadable(path.to_path_buf(), e.to_string()))?;

        self.report_resolution(path, &raw_label, &resolution);

        let header = read_wav_header(&canonical);

        Ok(Validated {
            entry: CleanWavEntry {
                path: canonical,
                drone_type: resolution.drone_type,
                size_bytes: meta.len(),
                modified,
                sample_rate: header.map(|h| h.sample_rate),
                channels: header.map(|h| h.channels),
                duration_seconds: header.and_then(|h| h.duration_seconds),
            },
            resolution,
            raw_label,
        })
    }

    /// Pull the raw label out of the path and resolve it
    ///
    /// `None` when the configured position carries no label at all.
    pub fn extract_label(&self, path: &Path) -> Option<(String, Resolution)> {
        let relative = path
            .strip_prefix(&self.canonical_root)
            .or_else(|_| path.strip_prefix(&self.root))
            .unwrap_or(path);

        let raw = match &self.label_source {
            LabelSource::ParentDir => relative
                .parent()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())?,
            LabelSource::FilenamePrefix { delimiter } => {
                let stem = relative.file_stem()?.to_string_lossy().into_owned();
                let (prefix, _) = stem.split_once(delimiter.as_str())?;
                prefix.to_string()
            }
            LabelSource::PathSearch => {
                let resolution = self.aliases.search(relative)?;
                return Some((relative.to_string_lossy().into_owned(), resolution));
            }
        };

        if normalize_key(&raw).is_empty() {
            return None;
        }

        let resolution = self.aliases.resolve(&raw);
        Some((raw, resolution))
    }

    fn report_resolution(&self, path: &Path, raw_label: &str, resolution: &Resolution) {
        if resolution.ambiguous {
            warn!(
                path = %path.display(),
                label = %resolution.drone_type,
                "Several drone labels in path, using first in alias table order"
            );
        }

        if resolution.drone_type == DroneType::Unknown {
            warn!(
                path = %path.display(),
                raw_label,
                "Unrecognized drone label, registering as unknown"
            );
        } else if resolution.corrected {
            info!(
                path = %path.display(),
                raw_label,
                corrected = %resolution.drone_type,
                "Correcting legacy drone label"
            );
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct WavHeader {
    sample_rate: u32,
    channels: u16,
    duration_seconds: Option<f64>,
}

/// Header-only read; files hound cannot parse simply get no audio metadata
fn read_wav_header(path: &Path) -> Option<WavHeader> {
    match hound::WavReader::open(path) {
        Ok(reader) => {
            let spec = reader.spec();
            let duration_seconds = (spec.sample_rate > 0)
                .then(|| f64::from(reader.duration()) / f64::from(spec.sample_rate));
            Some(WavHeader {
                sample_rate: spec.sample_rate,
                channels: spec.channels,
                duration_seconds,
            })
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "No readable WAV header");
            None
        }
    }
}
