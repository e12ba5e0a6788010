//! Constructs a [`DependencyGraph`] from a set of scanned source files.
//!
//! Each file is assigned one or more module identities (dotted, slashed
//! or `::`-separated depending on language). Import specifiers are
//! normalized into candidate identities and matched against that index;
//! specifiers that resolve to nothing inside the tree (external crates,
//! stdlib, third-party packages) simply produce no edge.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::graph::DependencyGraph;
use crate::languages::{LanguageRegistry, LanguageSupport, dir_components, extract_file, file_stem};

#[derive(Debug, Default)]
pub struct GraphBuilder {
    registry: LanguageRegistry,
}

impl GraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: LanguageRegistry::new(),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    /// Builds the dependency graph for `files`, given as paths relative
    /// to `root`. Every file becomes a node; unreadable or unparsable
    /// files keep an empty dependency set.
    pub fn build(&self, root: &Path, files: &[String]) -> DependencyGraph {
        let mut files: Vec<&str> = files.iter().map(String::as_str).collect();
        files.sort_unstable();

        // Identity index, first writer wins so ties are deterministic.
        let mut index: HashMap<String, &str> = HashMap::new();
        for &file in &files {
            let Some(lang) = self.registry.for_file(Path::new(file)) else {
                continue;
            };
            for identity in identities_of(lang.as_ref(), Path::new(file)) {
                index.entry(identity).or_insert(file);
            }
        }

        let mut graph = DependencyGraph::new();
        let mut unresolved = 0usize;
        for &file in &files {
            graph.ensure_node(file);
            let Some(lang) = self.registry.for_file(Path::new(file)) else {
                continue;
            };
            for specifier in extract_file(lang.as_ref(), &root.join(file)) {
                match resolve(lang.as_ref(), &specifier, Path::new(file), &index) {
                    Some(target) if target != file => graph.add_edge(file, target),
                    Some(_) => {}
                    None => {
                        unresolved += 1;
                        debug!(source = %file, specifier = %specifier, "unresolved import");
                    }
                }
            }
        }

        info!(
            files = graph.file_count(),
            edges = graph.edge_count(),
            unresolved,
            "dependency graph built"
        );
        graph
    }
}

/// Identities under which a file can be imported. An index file such as
/// `pkg/__init__.py` or `lang/mod.rs` also answers to its directory's
/// identity; identities under a conventional source root are indexed
/// with the root stripped as well; filename-imported languages (C/C++)
/// additionally answer to the bare stem.
fn identities_of(lang: &dyn LanguageSupport, rel: &Path) -> Vec<String> {
    let stem = file_stem(rel);
    let mut components = dir_components(rel);
    if !lang.index_stems().contains(&stem.as_str()) || components.is_empty() {
        components.push(stem);
    }

    let mut identities = vec![components.join(lang.separator())];
    if components.len() > 1 && lang.source_roots().contains(&components[0].as_str()) {
        identities.push(components[1..].join(lang.separator()));
    }
    if lang.index_bare_stems() && components.len() > 1 {
        let bare = components[components.len() - 1].clone();
        if !identities.contains(&bare) {
            identities.push(bare);
        }
    }
    identities
}

fn resolve<'a>(
    lang: &dyn LanguageSupport,
    specifier: &str,
    source_rel: &Path,
    index: &HashMap<String, &'a str>,
) -> Option<&'a str> {
    for candidate in lang.candidate_identities(specifier, source_rel) {
        if let Some(target) = index.get(candidate.as_str()).copied() {
            return Some(target);
        }
    }
    None
}
