//! Chart module - File-level collaborators around the migration engine.
//!
//! Handles the `Chart.yaml` dependency version bump, the order-preserving
//! `values.yaml` round trip, and chart directory discovery. The engine
//! itself never touches the filesystem.

mod chart_file;
mod discover;
mod values_file;

pub use chart_file::*;
pub use discover::*;
pub use values_file::*;
