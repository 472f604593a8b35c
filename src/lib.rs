//! # Helm Chart Updater
//!
//! Version-gated migration of Helm chart values files.
//!
//! Given a chart's current version, a target version, and a catalog of
//! per-version change-sets, the engine selects the change-sets that still
//! have to run, applies each key mutation (add, rename, remove) to the
//! nested values document, and reports per-operation outcomes.
//!
//! ## Modules
//!
//! - [`value`] - In-memory representation of YAML values documents
//! - [`keypath`] - Path representation and navigation through nested documents
//! - [`ops`] - Declarative key mutations and their executor
//! - [`resolver`] - Version gating: which change-sets apply, in what order
//! - [`engine`] - Orchestration of one chart's migration
//! - [`catalog`] - Change catalog and configuration loading
//! - [`chart`] - Chart.yaml / values.yaml file collaborators

pub mod catalog;
pub mod chart;
pub mod engine;
pub mod keypath;
pub mod ops;
pub mod resolver;
pub mod value;

pub use catalog::{ChangeCatalog, ChartRequirement, Config, ConfigError};
pub use chart::{discover_charts, ChartError, ChartFile, ValuesFile};
pub use engine::{migrate, MigrationReport, MutationApplier};
pub use keypath::{ListGrowth, NavigationError, Path, PathSegment};
pub use ops::{Operation, OperationResult, Outcome};
pub use value::Value;
