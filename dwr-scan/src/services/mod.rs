//! Scan services, leaves first:
//! type normalizer → file scanner → entry validator → registry builder → pipeline

pub mod entry_validator;
pub mod file_scanner;
pub mod registry_builder;
pub mod scan_pipeline;
pub mod type_normalizer;

pub use entry_validator::{EntryValidator, Validated};
pub use file_scanner::{Discovery, DiscoveryStats, FileScanner};
pub use registry_builder::{AddOutcome, RegistryBuilder};
pub use type_normalizer::{normalize, AliasTable, Resolution};
