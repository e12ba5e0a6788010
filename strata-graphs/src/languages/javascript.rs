use std::path::Path;

use crate::Result;

use super::{LanguageSupport, ecma};

#[derive(Debug)]
pub struct JavaScriptSupport;

impl LanguageSupport for JavaScriptSupport {
    fn id(&self) -> &'static str {
        "javascript"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["js", "jsx", "mjs", "cjs"]
    }

    fn separator(&self) -> &'static str {
        "/"
    }

    fn index_stems(&self) -> &'static [&'static str] {
        &["index"]
    }

    fn tree_sitter_language(&self) -> tree_sitter::Language {
        tree_sitter_javascript::LANGUAGE.into()
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
    fn extracts_require_calls() {
        let source = "const fs = require('fs');\nconst helper = require('./helper');\n";
        let tree = parse_source(&JavaScriptSupport, source).unwrap();
        let imports = JavaScriptSupport.extract_imports(&tree, source).unwrap();
        assert_eq!(imports, vec!["./helper".to_string(), "fs".to_string()]);
    }

    #[test]
    fn extracts_dynamic_import() {
        let source = "const mod = await import('./lazy');\n";
        let tree = parse_source(&JavaScriptSupport, source).unwrap();
        let imports = JavaScriptSupport.extract_imports(&tree, source).unwrap();
        assert_eq!(imports, vec!["./lazy".to_string()]);
    }
}
