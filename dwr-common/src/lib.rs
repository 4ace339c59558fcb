//! # DWR Common Library
//!
//! Shared code for the drone WAV registry tools:
//! - Error and result types
//! - TOML configuration file model and discovery

pub mod config;
pub mod error;

pub use error::{Error, Result};
