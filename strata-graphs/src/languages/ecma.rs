// Import extraction and specifier normalization shared between the
// TypeScript and JavaScript supports. The two grammars use the same
// node kinds for module syntax.

use std::path::Path;

use crate::Result;

use super::{child_by_field, dir_components, node_text, unquote};

const RESOLVABLE_EXTENSIONS: [&str; 6] = [".ts", ".tsx", ".js", ".jsx", ".mjs", ".cjs"];

/// Collect module specifiers: ES imports, re-exports, and CommonJS
/// `require(...)` calls.
pub(super) fn extract_imports(tree: &tree_sitter::Tree, source: &str) -> Result<Vec<String>> {
    let mut imports = Vec::new();
    walk(tree.root_node(), source, &mut imports);
    imports.sort();
    imports.dedup();
    Ok(imports)
}

fn walk(node: tree_sitter::Node<'_>, source: &str, imports: &mut Vec<String>) {
    match node.kind() {
        // import ... from '...' and bare import '...'
        "import_statement" | "export_statement" => {
            if let Some(src) = child_by_field(node, "source") {
                imports.push(unquote(node_text(src, source)).to_string());
            }
        }
        // require('...') and dynamic import('...')
        "call_expression" => {
            let callee = child_by_field(node, "function").map(|f| node_text(f, source));
            if matches!(callee, Some("require" | "import")) {
                if let Some(arg) = first_string_argument(node, source) {
                    imports.push(arg);
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

fn first_string_argument(call: tree_sitter::Node<'_>, source: &str) -> Option<String> {
    let args = child_by_field(call, "arguments")?;
    let mut cursor = args.walk();
    args.children(&mut cursor)
        .find(|c| c.kind() == "string")
        .map(|s| unquote(node_text(s, source)).to_string())
}

/// Normalize a specifier into candidate module identities (`/`-joined,
/// extensionless).
///
/// Relative specifiers resolve against the importing file's directory;
/// anything that escapes the tree root resolves to nothing. Bare
/// specifiers pass through as-is; they usually name third-party
/// packages and simply fail to match the index.
pub(super) fn candidate_identities(specifier: &str, source_rel: &Path) -> Vec<String> {
    let mut segments: Vec<String> = if specifier.starts_with("./") || specifier.starts_with("../") {
        dir_components(source_rel)
    } else {
        Vec::new()
    };

    let is_relative = !segments.is_empty() || specifier.starts_with("./");
    if !is_relative && specifier.starts_with("../") {
        // Relative import from a root-level file that climbs above the
        // tree; nothing in-repo can match.
        return Vec::new();
    }

    for part in specifier.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Vec::new();
                }
            }
            _ => segments.push(part.to_string()),
        }
    }

    if let Some(last) = segments.last_mut() {
        for ext in RESOLVABLE_EXTENSIONS {
            if let Some(stripped) = last.strip_suffix(ext) {
                if !stripped.is_empty() {
                    *last = stripped.to_string();
                }
                break;
            }
        }
    }

    if segments.is_empty() {
        Vec::new()
    } else {
        vec![segments.join("/")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_specifier_resolves_against_source_dir() {
        let got = candidate_identities("./utils", Path::new("src/app/main.ts"));
        assert_eq!(got, vec!["src/app/utils".to_string()]);
    }

    #[test]
    fn parent_specifier_pops_a_directory() {
        let got = candidate_identities("../config", Path::new("src/app/main.ts"));
        assert_eq!(got, vec!["src/config".to_string()]);
    }

    #[test]
    fn escaping_the_root_resolves_to_nothing() {
        let got = candidate_identities("../../../x", Path::new("src/main.ts"));
        assert!(got.is_empty());
    }

    #[test]
    fn explicit_extension_is_stripped() {
        // TS ESM style: imports name the emitted .js for a .ts file.
        let got = candidate_identities("./utils.js", Path::new("src/main.ts"));
        assert_eq!(got, vec!["src/utils".to_string()]);
    }

    #[test]
    fn bare_specifier_passes_through() {
        let got = candidate_identities("react", Path::new("src/main.ts"));
        assert_eq!(got, vec!["react".to_string()]);
    }
}
