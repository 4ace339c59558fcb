//! dwr-scan library interface
//!
//! Builds the clean WAV registry for the drone acoustic dataset: discovers
//! candidate files, validates them into typed entries with corrected drone
//! labels, and writes a deterministic JSON manifest.

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use crate::config::{LabelSource, ScanConfig};
pub use crate::error::{ScanError, ValidationError};
pub use crate::models::{CleanWavEntry, CleanWavRegistry, DroneType};
pub use crate::services::scan_pipeline::{run_scan, ScanReport};
