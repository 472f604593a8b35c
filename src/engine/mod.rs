//! Engine module - Orchestrates version selection and operation execution.


use crate::catalog::{ChangeCatalog, ChartRequirement};
use crate::keypath::ListGrowth;
use crate::ops::{self, OperationResult, Outcome};
use crate::resolver;
use crate::value::Value;
use semver::Version;
use serde::Serialize;
use tracing::{debug, warn};

/// MigrationReport is the ordered record of everything one migration did.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    /// One entry per executed operation, in execution order.
    pub results: Vec<OperationResult>,
    /// The version the chart ends up at: `update_to_version` when the
    /// chart was within the governed range, the unchanged current version
    /// otherwise.
    pub effective_version: Version,
}

impl MigrationReport {
    pub fn applied(&self) -> usize {
        self.count(Outcome::Applied)
    }

    pub fn skipped(&self) -> usize {
        self.count(Outcome::SkippedExisting) + self.count(Outcome::SkippedAbsent)
    }

    pub fn failed(&self) -> usize {
        self.count(Outcome::Failed)
    }

    fn count(&self, outcome: Outcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }
}

/// MutationApplier runs the version-gated change-sets of a catalog
/// against one chart's values document.
///
/// Stateless between invocations; one instance may be reused across
/// charts, or cheaply constructed per chart.
#[derive(Debug, Clone, Copy, Default)]
pub struct MutationApplier {
    growth: ListGrowth,
}

impl MutationApplier {
    pub fn new() -> Self {
        MutationApplier::default()
    }

    /// Overrides the policy for list writes past the end of a list.
    pub fn with_list_growth(growth: ListGrowth) -> Self {
        MutationApplier { growth }
    }

    /// Migrates a values document from `current_version` toward the
    /// requirement's `update_to_version`.
    ///
    /// Every operation of every selected version runs; an individual
    /// operation's failure is recorded and never aborts the rest.
    pub fn migrate(
        &self,
        document: &mut Value,
        current_version: &Version,
        requirement: &ChartRequirement,
        catalog: &ChangeCatalog,
    ) -> MigrationReport {
        let selected = resolver::select(current_version, requirement, catalog.versions());

        let in_range = *current_version >= requirement.min_version
            && *current_version <= requirement.max_version;
        let effective_version = if !selected.is_empty() || in_range {
            requirement.update_to_version.clone()
        } else {
            current_version.clone()
        };

        debug!(
            chart = %requirement.chart_name,
            current = %current_version,
            versions = selected.len(),
            "selected change-set versions"
        );

        let mut results = Vec::new();
        for version in &selected {
            let operations = catalog.get(version).unwrap_or(&[]);
            for operation in operations {
                let (outcome, detail) = ops::apply(document, operation, self.growth);
                if outcome == Outcome::Failed {
                    warn!(
                        chart = %requirement.chart_name,
                        version = %version,
                        operation = %operation,
                        detail = detail.as_deref().unwrap_or(""),
                        "operation failed"
                    );
                }
                results.push(OperationResult {
                    operation: operation.clone(),
                    version: version.clone(),
                    outcome,
                    detail,
                });
            }
        }

        MigrationReport {
            results,
            effective_version,
        }
    }
}

/// Convenience wrapper running a one-off migration with default policies.
pub fn migrate(
    document: &mut Value,
    current_version: &Version,
    requirement: &ChartRequirement,
    catalog: &ChangeCatalog,
) -> MigrationReport {
    MutationApplier::new().migrate(document, current_version, requirement, catalog)
}
