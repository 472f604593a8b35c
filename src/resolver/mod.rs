//! Resolver module - Version gating for change-sets.
//!
//! Given the chart's current version and one requirement, the resolver
//! decides which catalog versions still have to be applied, and in what
//! order.

use crate::catalog::ChartRequirement;
use semver::Version;

/// Selects the catalog versions whose change-sets apply, sorted ascending.
///
/// Returns an empty list when the chart is outside the requirement's
/// governed range (`min_version..=max_version`) or already at or past
/// `update_to_version`. Otherwise every catalog version in
/// `(current, update_to_version]` is selected, in strict semantic-version
/// order.
pub fn select<'a>(
    current: &Version,
    requirement: &ChartRequirement,
    catalog_versions: impl IntoIterator<Item = &'a Version>,
) -> Vec<Version> {
    if *current < requirement.min_version || *current > requirement.max_version {
        return Vec::new();
    }
    if requirement.update_to_version <= *current {
        return Vec::new();
    }
    let mut selected: Vec<Version> = catalog_versions
        .into_iter()
        .filter(|v| **v > *current && **v <= requirement.update_to_version)
        .cloned()
        .collect();
    selected.sort();
    selected
}
