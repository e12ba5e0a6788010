use std::path::Path;

use crate::Result;

use super::{LanguageSupport, child_by_field, dir_components, node_text};

#[derive(Debug)]
pub struct PythonSupport;

impl LanguageSupport for PythonSupport {
    fn id(&self) -> &'static str {
        "python"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["py", "pyi"]
    }

    fn separator(&self) -> &'static str {
        "."
    }

    fn index_stems(&self) -> &'static [&'static str] {
        &["__init__"]
    }

    fn tree_sitter_language(&self) -> tree_sitter::Language {
        tree_sitter_python::LANGUAGE.into()
    }

    fn extract_imports(&self, tree: &tree_sitter::Tree, source: &str) -> Result<Vec<String>> {
        let mut imports = Vec::new();
        walk(tree.root_node(), source, &mut imports);
        imports.sort();
        imports.dedup();
        Ok(imports)
    }

    /// `pkg.mod` stays as-is; leading dots resolve against the importing
    /// file's package (one dot = same package, each further dot pops a
    /// directory).
    fn candidate_identities(&self, specifier: &str, source_rel: &Path) -> Vec<String> {
        let dots = specifier.chars().take_while(|&c| c == '.').count();
        if dots == 0 {
            return vec![specifier.to_string()];
        }

        let mut base = dir_components(source_rel);
        for _ in 1..dots {
            if base.pop().is_none() {
                return Vec::new();
            }
        }

        let rest = &specifier[dots..];
        if !rest.is_empty() {
            base.extend(rest.split('.').map(str::to_string));
        }

        if base.is_empty() {
            Vec::new()
        } else {
            vec![base.join(".")]
        }
    }
}

fn walk(node: tree_sitter::Node<'_>, source: &str, imports: &mut Vec<String>) {
    match node.kind() {
        // import foo, bar.baz, qux as q
        "import_statement" => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                match child.kind() {
                    "dotted_name" => imports.push(node_text(child, source).to_string()),
                    "aliased_import" => {
                        if let Some(name) = child_by_field(child, "name") {
                            imports.push(node_text(name, source).to_string());
                        }
                    }
                    _ => {}
                }
            }
        }
        // from foo.bar import x  /  from . import utils
        "import_from_statement" => {
            let Some(module) = child_by_field(node, "module_name") else {
                return;
            };
            let module_text = node_text(module, source);

            if module_text.chars().all(|c| c == '.') {
                // `from . import utils` names siblings directly; the
                // imported names are the modules.
                let module_id = module.id();
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    if child.id() == module_id {
                        continue;
                    }
                    match child.kind() {
                        "dotted_name" => {
                            imports.push(format!("{module_text}{}", node_text(child, source)));
                        }
                        "aliased_import" => {
                            if let Some(name) = child_by_field(child, "name") {
                                imports.push(format!("{module_text}{}", node_text(name, source)));
                            }
                        }
                        _ => {}
                    }
                }
            } else {
                imports.push(module_text.to_string());
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(child, source, imports);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::parse_source;

    fn extract(source: &str) -> Vec<String> {
        let tree = parse_source(&PythonSupport, source).unwrap();
        PythonSupport.extract_imports(&tree, source).unwrap()
    }

    #[test]
    fn extracts_plain_imports() {
        let imports = extract("import os\nimport pkg.mod\n");
        assert_eq!(imports, vec!["os".to_string(), "pkg.mod".to_string()]);
    }

    #[test]
    fn extracts_aliased_import() {
        let imports = extract("import numpy as np\n");
        assert_eq!(imports, vec!["numpy".to_string()]);
    }

    #[test]
    fn from_import_keeps_the_module() {
        let imports = extract("from pkg.utils import helper\n");
        assert_eq!(imports, vec!["pkg.utils".to_string()]);
    }

    #[test]
    fn relative_from_import_keeps_dots() {
        let imports = extract("from .utils import helper\nfrom ..config import C\n");
        assert_eq!(imports, vec!["..config".to_string(), ".utils".to_string()]);
    }

    #[test]
    fn dot_only_from_import_names_siblings() {
        let imports = extract("from . import utils\nfrom .. import config\n");
        assert_eq!(imports, vec!["..config".to_string(), ".utils".to_string()]);
    }

    #[test]
    fn syntax_error_still_yields_something_sane() {
        // Tree-sitter parses with error nodes; extraction just walks
        // whatever survived.
        let imports = extract("import os\ndef broken(:\n");
        assert!(imports.contains(&"os".to_string()));
    }

    // ── Specifier normalization ────────────────────────────────────

    #[test]
    fn absolute_specifier_is_its_own_candidate() {
        let got = PythonSupport.candidate_identities("pkg.mod", Path::new("src/main.py"));
        assert_eq!(got, vec!["pkg.mod".to_string()]);
    }

    #[test]
    fn single_dot_resolves_to_same_package() {
        let got = PythonSupport.candidate_identities(".utils", Path::new("src/pkg/a.py"));
        assert_eq!(got, vec!["src.pkg.utils".to_string()]);
    }

    #[test]
    fn double_dot_pops_a_package() {
        let got = PythonSupport.candidate_identities("..config", Path::new("src/pkg/a.py"));
        assert_eq!(got, vec!["src.config".to_string()]);
    }

    #[test]
    fn relative_escape_resolves_to_nothing() {
        let got = PythonSupport.candidate_identities("...x", Path::new("pkg/a.py"));
        assert!(got.is_empty());
    }
}
