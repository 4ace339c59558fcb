//! Audio file discovery
//!
//! Walks the dataset root and yields candidate WAV paths lazily. Each call to
//! [`FileScanner::discover`] starts a fresh walk; nothing is cached between
//! runs.
//!
//! Symlinks: directory links are followed, and a link pointing back at one of
//! its ancestors is reported and skipped instead of looping. File links are
//! treated as regular files; the validator resolves them so the registry can
//! deduplicate.

use crate::config::ScanConfig;
use crate::error::ScanError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Counters for one discovery walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoveryStats {
    /// Regular files encountered (after ignore patterns)
    pub files_seen: usize,
    /// Files dropped for not having the audio extension
    pub wrong_extension: usize,
    /// Files dropped because no filter term matched
    pub filtered_out: usize,
    /// Unreadable entries or symlink loops skipped
    pub walk_errors: usize,
    /// Candidates handed to the caller
    pub yielded: usize,
}

/// Audio file scanner
#[derive(Debug, Clone)]
pub struct FileScanner {
    root: PathBuf,
    extension: String,
    filter_terms: Vec<String>,
    ignore_patterns: Vec<String>,
}

impl FileScanner {
    /// Scanner for `.wav` files under `root`, no filter terms
    ///
    /// Ignores system files like .DS_Store, Thumbs.db, .git, etc.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: "wav".to_string(),
            filter_terms: Vec::new(),
            ignore_patterns: vec![
                ".DS_Store".to_string(),
                "Thumbs.db".to_string(),
                ".git".to_string(),
                ".svn".to_string(),
            ],
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(&config.root_dir)
            .with_extension(&config.extension)
            .with_filter_terms(&config.filter_terms)
    }

    /// Expected extension, compared case-insensitively, leading dot optional
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_lowercase();
        self
    }

    /// Substrings of which at least one must occur in the root-relative path
    pub fn with_filter_terms<S: AsRef<str>>(mut self, terms: &[S]) -> Self {
        self.filter_terms = terms
            .iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Fail fast on a root that cannot be walked
    pub fn check_root(&self) -> Result<(), ScanError> {
        let meta = match std::fs::metadata(&self.root) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ScanError::RootNotFound(self.root.clone()));
            }
            Err(e) => return Err(ScanError::RootUnreadable(self.root.clone(), e.to_string())),
        };

        if !meta.is_dir() {
            return Err(ScanError::RootNotADirectory(self.root.clone()));
        }

        std::fs::read_dir(&self.root)
            .map_err(|e| ScanError::RootUnreadable(self.root.clone(), e.to_string()))?;

        Ok(())
    }

    /// Start a new walk over the root
    pub fn discover(&self) -> Result<Discovery<'_>, ScanError> {
        self.check_root()?;
        debug!(root = %self.root.display(), "Starting discovery");

        let walker = WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter();

        Ok(Discovery {
            scanner: self,
            walker,
            stats: DiscoveryStats::default(),
        })
    }

    /// Collect a full walk
    pub fn scan(&self) -> Result<Vec<PathBuf>, ScanError> {
        Ok(self.discover()?.collect())
    }

    fn is_ignored(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return false;
        }
        let file_name = entry.file_name().to_string_lossy();
        self.ignore_patterns.iter().any(|p| file_name == p.as_str())
    }

    fn has_audio_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase() == self.extension)
            .unwrap_or(false)
    }

    fn matches_filters(&self, path: &Path) -> bool {
        if self.filter_terms.is_empty() {
            return true;
        }
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let haystack = relative.to_string_lossy().to_lowercase();
        self.filter_terms.iter().any(|term| haystack.contains(term.as_str()))
    }
}

/// One in-progress walk, yielding candidate paths
///
/// Unreadable subdirectories and symlink loops are logged and skipped.
pub struct Discovery<'a> {
    scanner: &'a FileScanner,
    walker: walkdir::IntoIter,
    stats: DiscoveryStats,
}

impl Discovery<'_> {
    /// Counters so far; final once the iterator is exhausted
    pub fn stats(&self) -> DiscoveryStats {
        self.stats
    }
}

impl Iterator for Discovery<'_> {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    self.stats.walk_errors += 1;
                    match (e.loop_ancestor(), e.path()) {
                        (Some(ancestor), Some(path)) => warn!(
                            path = %path.display(),
                            ancestor = %ancestor.display(),
                            "Symlink loop detected, skipping"
                        ),
                        _ => warn!("Error accessing entry, skipping: {}", e),
                    }
                    continue;
                }
            };

            if self.scanner.is_ignored(&entry) {
                if entry.file_type().is_dir() {
                    self.walker.skip_current_dir();
                }
                continue;
            }

            if !entry.file_type().is_file() {
                continue;
            }

            self.stats.files_seen += 1;
            let path = entry.into_path();

            if !self.scanner.has_audio_extension(&path) {
                self.stats.wrong_extension += 1;
                continue;
            }

            if !self.scanner.matches_filters(&path) {
                self.stats.filtered_out += 1;
                debug!(path = %path.display(), "Excluded by filter terms");
                continue;
            }

            self.stats.yielded += 1;
            return Some(path);
        }
    }
}
