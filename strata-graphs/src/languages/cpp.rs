use std::path::Path;

use crate::Result;

use super::{LanguageSupport, child_by_field, dir_components, node_text};

/// Handles both C and C++ sources. The grammar differences do not
/// matter here: `#include` directives parse identically, and extraction
/// ignores everything else.
#[derive(Debug)]
pub struct CppSupport;

const EXTENSIONS: &[&str] = &["c", "h", "cc", "cpp", "cxx", "hh", "hpp"];

impl LanguageSupport for CppSupport {
    fn id(&self) -> &'static str {
        "cpp"
    }

    fn extensions(&self) -> &'static [&'static str] {
        EXTENSIONS
    }

    fn separator(&self) -> &'static str {
        "/"
    }

    fn index_stems(&self) -> &'static [&'static str] {
        &[]
    }

    fn index_bare_stems(&self) -> bool {
        true
    }

    fn tree_sitter_language(&self) -> tree_sitter::Language {
        tree_sitter_cpp::LANGUAGE.into()
    }

    fn extract_imports(&self, tree: &tree_sitter::Tree, source: &str) -> Result<Vec<String>> {
        let mut imports = Vec::new();
        walk(tree.root_node(), source, &mut imports);
        imports.sort();
        imports.dedup();
        Ok(imports)
    }

    /// Includes resolve in three steps: relative to the including
    /// file's directory, as a root-relative path, and finally by bare
    /// filename (headers are routinely included by name alone, with the
    /// directory supplied by the build's include path).
    fn candidate_identities(&self, specifier: &str, source_rel: &Path) -> Vec<String> {
        let mut relative = dir_components(source_rel);
        let mut plain: Vec<String> = Vec::new();
        let mut escaped = false;

        for part in specifier.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    if relative.pop().is_none() {
                        escaped = true;
                    }
                }
                _ => {
                    relative.push(part.to_string());
                    plain.push(part.to_string());
                }
            }
        }

        if let Some(last) = relative.last_mut() {
            strip_extension(last);
        }
        if let Some(last) = plain.last_mut() {
            strip_extension(last);
        }

        let mut candidates = Vec::new();
        if !escaped && !relative.is_empty() {
            candidates.push(relative.join("/"));
        }
        if !plain.is_empty() {
            let rooted = plain.join("/");
            if !candidates.contains(&rooted) {
                candidates.push(rooted);
            }
            let stem = plain[plain.len() - 1].clone();
            if !candidates.contains(&stem) {
                candidates.push(stem);
            }
        }
        candidates
    }
}

fn strip_extension(segment: &mut String) {
    if let Some(dot) = segment.rfind('.') {
        if dot > 0 {
            segment.truncate(dot);
        }
    }
}

fn walk(node: tree_sitter::Node<'_>, source: &str, imports: &mut Vec<String>) {
    if node.kind() == "preproc_include" {
        if let Some(path) = child_by_field(node, "path") {
            let text = node_text(path, source)
                .trim_matches(|c| c == '"' || c == '<' || c == '>')
                .trim();
            if !text.is_empty() {
                imports.push(text.to_string());
            }
        }
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(child, source, imports);
    }
}
