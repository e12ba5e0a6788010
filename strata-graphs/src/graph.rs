// File-level dependency graph: forward/reverse adjacency keyed by
// root-relative path strings, plus layering and cycle detection.
//
// Paths are plain strings rather than node structs: the graph is the
// single source of identity, so there is nothing to alias.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Sentinel layer for nodes that participate in (or depend on) a cycle.
pub const CYCLE_LAYER: i32 = -1;

/// Directed dependency graph over root-relative file paths.
///
/// Both adjacency maps are kept mutually consistent: every edge added via
/// [`add_edge`](Self::add_edge) lands in `forward` and `reverse` in the
/// same call. Ordered collections are used throughout so that every
/// observable iteration (layer scans, cycle DFS, planning) is
/// reproducible across runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependencyGraph {
    forward: BTreeMap<String, BTreeSet<String>>,
    reverse: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file with no dependencies yet.
    ///
    /// Every admitted file gets a forward entry even when nothing it
    /// imports resolves, so layering and planning see it.
    pub fn ensure_node(&mut self, path: &str) {
        self.forward.entry(path.to_string()).or_default();
    }

    /// Add a dependency edge: `source` depends on `target`.
    pub fn add_edge(&mut self, source: &str, target: &str) {
        self.forward
            .entry(source.to_string())
            .or_default()
            .insert(target.to_string());
        self.forward.entry(target.to_string()).or_default();
        self.reverse
            .entry(target.to_string())
            .or_default()
            .insert(source.to_string());
    }

    /// All file paths known to the graph, in sorted order.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.forward.keys().map(String::as_str)
    }

    pub fn file_count(&self) -> usize {
        self.forward.len()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.forward.contains_key(path)
    }

    /// Files that `path` directly depends on.
    pub fn dependencies_of(&self, path: &str) -> Option<&BTreeSet<String>> {
        self.forward.get(path)
    }

    /// Files that directly depend on `path` (reverse adjacency).
    pub fn dependents_of(&self, path: &str) -> Option<&BTreeSet<String>> {
        self.reverse.get(path)
    }

    pub fn edge_count(&self) -> usize {
        self.forward.values().map(BTreeSet::len).sum()
    }

    /// Compute the topological depth of every file.
    ///
    /// Layer 0 is a file with no resolved dependencies; otherwise the
    /// layer is `1 + max(layer of each dependency)`. Files that cannot be
    /// assigned (cycle members and anything depending on them) get
    /// [`CYCLE_LAYER`].
    ///
    /// The computation is an iterative fixed point rather than a
    /// recursive topological sort: each pass assigns every node whose
    /// dependencies are all assigned, and the pass count is capped at
    /// `file_count + 2` so termination holds on any input. Worst case is
    /// quadratic in the node count, which is acceptable at file-graph
    /// scale.
    pub fn calculate_layers(&self) -> BTreeMap<String, i32> {
        let mut layers: BTreeMap<String, i32> = BTreeMap::new();

        for (path, deps) in &self.forward {
            if deps.is_empty() {
                layers.insert(path.clone(), 0);
            }
        }

        let max_scans = self.forward.len() + 2;
        for _ in 0..max_scans {
            let mut changed = false;
            for (path, deps) in &self.forward {
                if layers.contains_key(path) {
                    continue;
                }
                if let Some(max_dep) = deps
                    .iter()
                    .map(|d| layers.get(d).copied())
                    .collect::<Option<Vec<i32>>>()
                    .and_then(|v| v.into_iter().max())
                {
                    layers.insert(path.clone(), max_dep + 1);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        for path in self.forward.keys() {
            layers.entry(path.clone()).or_insert(CYCLE_LAYER);
        }

        layers
    }

    /// Detect dependency cycles via depth-first traversal.
    ///
    /// Each reported cycle is the loop path with its first node repeated
    /// as the last element. Cycles are neither deduplicated nor
    /// canonicalized; node iteration is sorted, so the listing is stable
    /// for a given graph, but callers should only rely on membership.
    pub fn detect_cycles(&self) -> Vec<Vec<String>> {
        let mut cycles = Vec::new();
        let mut visited = BTreeSet::new();
        let mut stack = BTreeSet::new();
        let mut path = Vec::new();

        for node in self.forward.keys() {
            if !visited.contains(node.as_str()) {
                self.cycle_dfs(node, &mut visited, &mut stack, &mut path, &mut cycles);
            }
        }

        cycles
    }

    fn cycle_dfs(
        &self,
        node: &str,
        visited: &mut BTreeSet<String>,
        stack: &mut BTreeSet<String>,
        path: &mut Vec<String>,
        cycles: &mut Vec<Vec<String>>,
    ) {
        visited.insert(node.to_string());
        stack.insert(node.to_string());
        path.push(node.to_string());

        if let Some(deps) = self.forward.get(node) {
            for dep in deps {
                if !visited.contains(dep.as_str()) {
                    self.cycle_dfs(dep, visited, stack, path, cycles);
                } else if stack.contains(dep.as_str()) {
                    if let Some(idx) = path.iter().position(|p| p == dep) {
                        let mut cycle: Vec<String> = path[idx..].to_vec();
                        cycle.push(dep.clone());
                        cycles.push(cycle);
                    }
                }
            }
        }

        stack.remove(node);
        path.pop();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
