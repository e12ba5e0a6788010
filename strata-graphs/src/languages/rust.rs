use std::path::Path;

use crate::Result;

use super::{LanguageSupport, child_by_field, dir_components, file_stem, node_text};

#[derive(Debug)]
pub struct RustSupport;

impl LanguageSupport for RustSupport {
    fn id(&self) -> &'static str {
        "rust"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["rs"]
    }

    fn separator(&self) -> &'static str {
        "::"
    }

    fn index_stems(&self) -> &'static [&'static str] {
        &["mod"]
    }

    fn tree_sitter_language(&self) -> tree_sitter::Language {
        tree_sitter_rust::LANGUAGE.into()
    }

    fn extract_imports(&self, tree: &tree_sitter::Tree, source: &str) -> Result<Vec<String>> {
        let mut imports = Vec::new();
        walk(tree.root_node(), source, &mut imports);
        imports.sort();
        imports.dedup();
        Ok(imports)
    }

    fn candidate_identities(&self, specifier: &str, source_rel: &Path) -> Vec<String> {
        let mut segments: Vec<&str> = specifier.split("::").filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return Vec::new();
        }

        let mut base: Vec<String> = match segments[0] {
            "crate" => {
                segments.remove(0);
                Vec::new()
            }
            "self" => {
                segments.remove(0);
                module_path_of(source_rel)
            }
            "super" => {
                let mut path = module_path_of(source_rel);
                while segments.first() == Some(&"super") {
                    segments.remove(0);
                    if path.pop().is_none() {
                        return Vec::new();
                    }
                }
                path
            }
            // A bare leading segment is either a root module or an
            // external crate; the latter simply fails to resolve.
            _ => Vec::new(),
        };

        base.extend(segments.iter().map(|s| (*s).to_string()));
        if base.is_empty() {
            return Vec::new();
        }

        // The last segment is often an item rather than a module, so
        // also try the path with it stripped.
        let mut candidates = vec![base.join("::")];
        if base.len() > 1 {
            candidates.push(base[..base.len() - 1].join("::"));
        }
        candidates
    }
}

/// Module path of a source file relative to the scan root. `mod.rs`,
/// `lib.rs` and `main.rs` name their containing directory.
fn module_path_of(rel: &Path) -> Vec<String> {
    let mut parts = dir_components(rel);
    let stem = file_stem(rel);
    if !matches!(stem.as_str(), "mod" | "lib" | "main") {
        parts.push(stem);
    }
    parts
}

fn walk(node: tree_sitter::Node<'_>, source: &str, imports: &mut Vec<String>) {
    match node.kind() {
        "use_declaration" => {
            let text = node_text(node, source)
                .trim_start_matches("pub")
                .trim_start()
                .trim_start_matches("use")
                .trim()
                .trim_end_matches(';')
                .trim();
            expand_use_tree(text, "", imports);
        }
        // `mod name;` without a body pulls in a sibling file.
        "mod_item" => {
            if child_by_field(node, "body").is_none() {
                if let Some(name) = child_by_field(node, "name") {
                    imports.push(format!("self::{}", node_text(name, source)));
                }
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(child, source, imports);
    }
}

/// Flattens a use tree such as `a::{b, c::{d, self}}` into full paths.
fn expand_use_tree(tree: &str, prefix: &str, out: &mut Vec<String>) {
    let text = tree.trim();
    if let Some(open) = text.find('{') {
        let close = text.rfind('}').unwrap_or(text.len());
        let head = text[..open].trim().trim_end_matches(':');
        let joined = join_path(prefix, head);
        for part in split_top_level(&text[open + 1..close]) {
            expand_use_tree(part, &joined, out);
        }
        return;
    }

    let leaf = text.split(" as ").next().unwrap_or(text).trim();
    let full = match leaf {
        "self" | "*" => prefix.to_string(),
        _ => join_path(prefix, leaf),
    };
    let full = full
        .trim_start_matches("::")
        .trim_end_matches("::*")
        .trim_end_matches("::self")
        .to_string();
    if !full.is_empty() {
        out.push(full);
    }
}

fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else if segment.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix}::{segment}")
    }
}

/// Splits on commas outside any nested braces.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts.into_iter().map(str::trim).filter(|p| !p.is_empty()).collect()
}
