//! Catalog module - Versioned change catalog and configuration loading.
//!
//! The configuration file pairs per-chart version requirements with a
//! catalog of change-sets keyed by chart version.

mod config;

pub use config::*;
