//! Turns a layered dependency graph into a phased analysis plan.
//!
//! Each dependency layer becomes a phase, analyzed bottom-up so every
//! file's dependencies have been seen before the file itself. Files
//! trapped in import cycles cannot be ordered that way, so they are
//! grouped into a phase of their own that runs first.

use serde::{Deserialize, Serialize};
use strata_graphs::{CYCLE_LAYER, DependencyGraph};
use tracing::info;

/// A small group of files analyzed together.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Batch {
    /// Plan-wide identifier, monotonically increasing in plan order.
    pub id: u32,
    pub files: Vec<String>,
    /// One-line guidance for whoever picks the batch up.
    pub hint: String,
}

/// All batches that share a dependency layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Phase {
    /// Phase 0 holds cycle members; phase `n + 1` holds layer `n`.
    pub id: i32,
    pub name: String,
    pub batches: Vec<Batch>,
    pub learning_objectives: Vec<String>,
}

/// A complete phased plan over the tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    pub phases: Vec<Phase>,
    /// Starts at 1.0 and drops by 0.1 per detected cycle, floored at 0.
    pub confidence_score: f64,
}

impl Plan {
    /// Batch ids in plan order.
    #[must_use]
    pub fn batch_ids(&self) -> Vec<u32> {
        self.phases
            .iter()
            .flat_map(|phase| phase.batches.iter().map(|b| b.id))
            .collect()
    }

    #[must_use]
    pub fn batch_count(&self) -> usize {
        self.phases.iter().map(|p| p.batches.len()).sum()
    }

    #[must_use]
    pub fn find_batch(&self, id: u32) -> Option<&Batch> {
        self.phases
            .iter()
            .flat_map(|p| p.batches.iter())
            .find(|b| b.id == id)
    }

    /// Ids of every batch containing at least one of `paths`.
    pub fn batches_touching<'a, I>(&self, paths: I) -> Vec<u32>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let paths: std::collections::BTreeSet<&str> =
            paths.into_iter().map(String::as_str).collect();
        self.phases
            .iter()
            .flat_map(|p| p.batches.iter())
            .filter(|b| b.files.iter().any(|f| paths.contains(f.as_str())))
            .map(|b| b.id)
            .collect()
    }
}

/// Generates the phased plan for `graph`, chunking each layer into
/// batches of at most `batch_size` files.
#[must_use]
pub fn generate_plan(graph: &DependencyGraph, batch_size: usize) -> Plan {
    let layers = graph.calculate_layers();
    let cycles = graph.detect_cycles();

    // BTreeMap orders layers ascending, which puts the cycle sentinel
    // first and foundations before the files built on them.
    let mut by_layer: std::collections::BTreeMap<i32, Vec<String>> =
        std::collections::BTreeMap::new();
    for (file, layer) in layers {
        by_layer.entry(layer).or_default().push(file);
    }

    let batch_size = batch_size.max(1);
    let mut next_batch_id: u32 = 1;
    let mut phases = Vec::new();

    for (layer, mut files) in by_layer {
        files.sort();
        let phase_id = if layer == CYCLE_LAYER { 0 } else { layer + 1 };

        let mut batches = Vec::new();
        for chunk in files.chunks(batch_size) {
            batches.push(Batch {
                id: next_batch_id,
                files: chunk.to_vec(),
                hint: batch_hint(layer, chunk.len()),
            });
            next_batch_id += 1;
        }

        phases.push(Phase {
            id: phase_id,
            name: phase_name(layer),
            learning_objectives: phase_objectives(layer, files.len()),
            batches,
        });
    }

    #[allow(clippy::cast_precision_loss)]
    let confidence_score = (1.0 - 0.1 * cycles.len() as f64).max(0.0);

    info!(
        phases = phases.len(),
        batches = next_batch_id - 1,
        cycles = cycles.len(),
        confidence = confidence_score,
        "analysis plan generated"
    );

    Plan {
        phases,
        confidence_score,
    }
}

fn phase_name(layer: i32) -> String {
    if layer == CYCLE_LAYER {
        "Entangled files".to_string()
    } else if layer == 0 {
        "Foundations".to_string()
    } else {
        format!("Layer {layer}")
    }
}

fn batch_hint(layer: i32, files: usize) -> String {
    if layer == CYCLE_LAYER {
        format!("{files} mutually dependent file(s); read them together")
    } else if layer == 0 {
        format!("{files} file(s) with no internal dependencies")
    } else {
        format!("{files} file(s) building on layer {}", layer - 1)
    }
}

fn phase_objectives(layer: i32, files: usize) -> Vec<String> {
    if layer == CYCLE_LAYER {
        vec![
            format!("Untangle the import cycle spanning {files} file(s)"),
            "Identify which direction of each cyclic dependency is essential".to_string(),
        ]
    } else if layer == 0 {
        vec![
            format!("Understand the {files} foundation file(s) everything else builds on"),
            "Map the core data types and utilities they define".to_string(),
        ]
    } else {
        vec![
            format!("See how layer {layer} composes the layers beneath it"),
            "Note which lower-layer interfaces each file actually uses".to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_graph() -> DependencyGraph {
        // a -> b -> c, d standalone
        let mut g = DependencyGraph::new();
        g.add_edge("a.py", "b.py");
        g.add_edge("b.py", "c.py");
        g.ensure_node("d.py");
        g
    }

    #[test]
    fn phases_follow_layers_bottom_up() {
        let plan = generate_plan(&chain_graph(), 3);

        let ids: Vec<i32> = plan.phases.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(plan.phases[0].batches[0].files, vec!["c.py", "d.py"]);
        assert_eq!(plan.phases[1].batches[0].files, vec!["b.py"]);
        assert_eq!(plan.phases[2].batches[0].files, vec!["a.py"]);
    }

    #[test]
    fn batch_ids_are_global_and_monotonic() {
        let mut g = DependencyGraph::new();
        for i in 0..10 {
            g.ensure_node(&format!("f{i:02}.py"));
        }
        let plan = generate_plan(&g, 3);

        // 10 leaves at batch size 3 -> batches of 3, 3, 3, 1
        assert_eq!(plan.batch_ids(), vec![1, 2, 3, 4]);
        let sizes: Vec<usize> = plan.phases[0].batches.iter().map(|b| b.files.len()).collect();
        assert_eq!(sizes, vec![3, 3, 3, 1]);
    }

    #[test]
    fn cycle_members_form_phase_zero_first() {
        let mut g = DependencyGraph::new();
        g.add_edge("x.py", "y.py");
        g.add_edge("y.py", "x.py");
        g.ensure_node("leaf.py");
        let plan = generate_plan(&g, 3);

        assert_eq!(plan.phases[0].id, 0);
        assert_eq!(plan.phases[0].batches[0].files, vec!["x.py", "y.py"]);
        assert_eq!(plan.phases[1].id, 1);
    }

    #[test]
    fn confidence_drops_per_cycle_and_floors_at_zero() {
        let mut g = DependencyGraph::new();
        g.add_edge("x.py", "y.py");
        g.add_edge("y.py", "x.py");
        let plan = generate_plan(&g, 3);
        assert!((plan.confidence_score - 0.9).abs() < 1e-9);

        let mut many = DependencyGraph::new();
        for i in 0..12 {
            let a = format!("a{i}.py");
            let b = format!("b{i}.py");
            many.add_edge(&a, &b);
            many.add_edge(&b, &a);
        }
        let plan = generate_plan(&many, 3);
        assert!((plan.confidence_score - 0.0).abs() < 1e-9);
    }

    #[test]
    fn acyclic_plan_has_full_confidence() {
        let plan = generate_plan(&chain_graph(), 3);
        assert!((plan.confidence_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_graph_yields_an_empty_plan() {
        let plan = generate_plan(&DependencyGraph::new(), 3);
        assert!(plan.phases.is_empty());
        assert_eq!(plan.batch_count(), 0);
        assert!((plan.confidence_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn batches_touching_finds_owning_batches() {
        let plan = generate_plan(&chain_graph(), 1);
        let query = vec!["b.py".to_string(), "unknown.py".to_string()];
        let ids = plan.batches_touching(&query);

        assert_eq!(ids.len(), 1);
        assert_eq!(plan.find_batch(ids[0]).unwrap().files, vec!["b.py"]);
    }
}
