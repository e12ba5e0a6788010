use std::path::Path;

use crate::Result;

use super::{LanguageSupport, ecma};

#[derive(Debug)]
pub struct TypeScriptSupport;

impl LanguageSupport for TypeScriptSupport {
    fn id(&self) -> &'static str {
        "typescript"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["ts", "tsx"]
    }

    fn separator(&self) -> &'static str {
        "/"
    }

    fn index_stems(&self) -> &'static [&'static str] {
        &["index"]
    }

    fn tree_sitter_language(&self) -> tree_sitter::Language {
        tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
    }

    fn extract_imports(&self, tree: &tree_sitter::Tree, source: &str) -> Result<Vec<String>> {
        ecma::extract_imports(tree, source)
    }

    fn candidate_identities(&self, specifier: &str, source_rel: &Path) -> Vec<String> {
        ecma::candidate_identities(specifier, source_rel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::parse_source;

    #[test]
    fn extracts_import_and_export_sources() {
        let source = "import { a } from './a';\nexport { b } from '../lib/b';\n";
        let tree = parse_source(&TypeScriptSupport, source).unwrap();
        let imports = TypeScriptSupport.extract_imports(&tree, source).unwrap();
        assert_eq!(imports, vec!["../lib/b".to_string(), "./a".to_string()]);
    }

    #[test]
    fn type_only_import_is_still_an_edge() {
        let source = "import type { T } from './types';\n";
        let tree = parse_source(&TypeScriptSupport, source).unwrap();
        let imports = TypeScriptSupport.extract_imports(&tree, source).unwrap();
        assert_eq!(imports, vec!["./types".to_string()]);
    }
}
