//! Registry data models

pub mod drone_type;
pub mod entry;
pub mod registry;

pub use drone_type::DroneType;
pub use entry::CleanWavEntry;
pub use registry::{CleanWavRegistry, RegistryHeader, RegistrySummary, SCHEMA_VERSION};
