//! Translates a VCS diff into the set of files the next run must touch.

use std::collections::{BTreeMap, BTreeSet};

use strata_graphs::DependencyGraph;
use tracing::info;

use crate::vcs::DiffResult;

/// Files affected by a change set, with a human-readable reason per file.
#[derive(Debug, Clone, Default)]
pub struct ImpactSet {
    /// Files that must be re-analyzed.
    pub reanalyze: BTreeSet<String>,
    /// Files whose results must be dropped.
    pub remove: BTreeSet<String>,
    /// Old path to new path, for carrying results across renames.
    pub rename_map: BTreeMap<String, String>,
    /// Why each path is in `reanalyze` or `remove`.
    pub reason: BTreeMap<String, String>,
}

impl ImpactSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reanalyze.is_empty() && self.remove.is_empty()
    }
}

/// Computes the impact of `diff` against the previous run's graph.
///
/// Directly changed files are marked from their diff status; dependents
/// are then pulled in one hop deep, seeded from the `reanalyze` set
/// only. Removals do not propagate: a dependent of a deleted file still
/// holds valid results until its own next change. The cascade
/// deliberately stops at one hop: a dependent's own dependents only get
/// re-analyzed if its re-analysis changes its interface, which a later
/// diff will show.
#[must_use]
pub fn compute_impact(diff: &DiffResult, graph: &DependencyGraph) -> ImpactSet {
    let mut impact = ImpactSet::default();

    for path in &diff.added {
        impact.reanalyze.insert(path.clone());
        impact.reason.insert(path.clone(), "added".to_string());
    }
    for path in &diff.modified {
        impact.reanalyze.insert(path.clone());
        impact.reason.insert(path.clone(), "modified".to_string());
    }
    for path in &diff.deleted {
        impact.remove.insert(path.clone());
        impact.reason.insert(path.clone(), "deleted".to_string());
    }
    for (old, new) in &diff.renamed {
        impact.remove.insert(old.clone());
        impact.reanalyze.insert(new.clone());
        impact.rename_map.insert(old.clone(), new.clone());
        impact
            .reason
            .insert(new.clone(), format!("renamed from {old}"));
    }

    let directly_changed: BTreeSet<String> = impact.reanalyze.clone();
    for changed in &directly_changed {
        let Some(dependents) = graph.dependents_of(changed) else {
            continue;
        };
        for dependent in dependents {
            if impact.remove.contains(dependent) || impact.reanalyze.contains(dependent) {
                continue;
            }
            impact.reanalyze.insert(dependent.clone());
            impact
                .reason
                .insert(dependent.clone(), format!("depends on changed file {changed}"));
        }
    }

    info!(
        reanalyze = impact.reanalyze.len(),
        remove = impact.remove.len(),
        renames = impact.rename_map.len(),
        "change impact computed"
    );
    impact
}

/// Whether the impacted fraction of the tree is large enough that a
/// fresh full run beats patching the old plan. An empty tree never
/// triggers a full run.
#[must_use]
pub fn should_full_reanalyze(impact: &ImpactSet, total_files: usize, threshold: f64) -> bool {
    if total_files == 0 {
        return false;
    }
    #[allow(clippy::cast_precision_loss)]
    let impacted = impact.reanalyze.len() as f64;
    #[allow(clippy::cast_precision_loss)]
    let total = total_files as f64;
    impacted > threshold * total
}
