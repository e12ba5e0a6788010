mod ecma;
pub mod cpp;
pub mod javascript;
pub mod python;
pub mod rust;
pub mod typescript;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::{GraphError, Result};

/// Trait implemented by each language's import-extraction support.
///
/// Implementations are best-effort by contract: a specifier that cannot
/// be resolved simply produces no edge, and extraction failures are
/// absorbed by [`extract_file`] rather than surfaced to the graph build.
pub trait LanguageSupport: Send + Sync + std::fmt::Debug {
    /// Language identifier (e.g., "rust", "python").
    fn id(&self) -> &'static str;

    /// File extensions this language handles.
    fn extensions(&self) -> &'static [&'static str];

    /// Separator joining the components of a module identity.
    fn separator(&self) -> &'static str;

    /// File stems that act as a directory's package-index entry file
    /// (`__init__` for Python, `index` for TS/JS, `mod` for Rust).
    fn index_stems(&self) -> &'static [&'static str];

    /// Conventional top-level source roots whose prefix is also indexed
    /// stripped, so rooted and unrooted import styles both resolve.
    fn source_roots(&self) -> &'static [&'static str] {
        &["src"]
    }

    /// Whether a file's bare stem is indexed on its own, for languages
    /// where an import names a file rather than a module path (C/C++
    /// headers included by filename from anywhere in the tree).
    fn index_bare_stems(&self) -> bool {
        false
    }

    /// Tree-sitter language for parsing.
    fn tree_sitter_language(&self) -> tree_sitter::Language;

    /// Extract raw import specifiers from a parsed file.
    fn extract_imports(&self, tree: &tree_sitter::Tree, source: &str) -> Result<Vec<String>>;

    /// Normalize a raw specifier into candidate module identities,
    /// resolving relative forms against the importing file's location.
    fn candidate_identities(&self, specifier: &str, source_rel: &Path) -> Vec<String>;
}

/// Registry of all supported languages, keyed by extension.
#[derive(Debug)]
pub struct LanguageRegistry {
    languages: HashMap<String, Arc<dyn LanguageSupport>>,
    extension_map: HashMap<String, String>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        let mut reg = Self {
            languages: HashMap::new(),
            extension_map: HashMap::new(),
        };
        reg.register(Arc::new(rust::RustSupport));
        reg.register(Arc::new(python::PythonSupport));
        reg.register(Arc::new(typescript::TypeScriptSupport));
        reg.register(Arc::new(javascript::JavaScriptSupport));
        reg.register(Arc::new(cpp::CppSupport));
        reg
    }

    fn register(&mut self, lang: Arc<dyn LanguageSupport>) {
        for ext in lang.extensions() {
            self.extension_map
                .insert((*ext).to_string(), lang.id().to_string());
        }
        self.languages.insert(lang.id().to_string(), lang);
    }

    /// Look up the language support for a file by its extension.
    pub fn for_file(&self, path: &Path) -> Option<Arc<dyn LanguageSupport>> {
        let ext = path.extension()?.to_str()?;
        let lang_id = self.extension_map.get(ext)?;
        self.languages.get(lang_id).cloned()
    }

    /// Get a language by its identifier.
    pub fn get(&self, id: &str) -> Option<Arc<dyn LanguageSupport>> {
        self.languages.get(id).cloned()
    }

    /// List all registered language IDs.
    pub fn language_ids(&self) -> Vec<&str> {
        self.languages.keys().map(String::as_str).collect()
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract import specifiers from a file on disk.
///
/// Never fails: unreadable or unparsable files yield an empty list, with
/// the cause logged at debug level.
pub fn extract_file(lang: &dyn LanguageSupport, abs_path: &Path) -> Vec<String> {
    let Ok(source) = std::fs::read_to_string(abs_path) else {
        debug!(path = %abs_path.display(), "Unreadable file, skipping import extraction");
        return Vec::new();
    };

    match parse_source(lang, &source) {
        Ok(tree) => lang
            .extract_imports(&tree, &source)
            .unwrap_or_else(|e| {
                debug!(path = %abs_path.display(), error = %e, "Import extraction failed");
                Vec::new()
            }),
        Err(e) => {
            debug!(path = %abs_path.display(), error = %e, "Parse failed, skipping import extraction");
            Vec::new()
        }
    }
}

/// Parse source text with the language's tree-sitter grammar.
pub fn parse_source(lang: &dyn LanguageSupport, source: &str) -> Result<tree_sitter::Tree> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&lang.tree_sitter_language())
        .map_err(|e| GraphError::TreeSitter(e.to_string()))?;
    parser
        .parse(source, None)
        .ok_or_else(|| GraphError::TreeSitter("parser returned no tree".to_string()))
}

// ── Shared tree helpers ───────────────────────────────────────────────

/// Extract the source text for a tree-sitter node.
pub(crate) fn node_text<'a>(node: tree_sitter::Node<'_>, source: &'a str) -> &'a str {
    &source[node.byte_range()]
}

/// Find a child by field name.
pub(crate) fn child_by_field<'a>(
    node: tree_sitter::Node<'a>,
    field: &str,
) -> Option<tree_sitter::Node<'a>> {
    node.child_by_field_name(field)
}

/// Strip surrounding quotes from a string-literal node's text.
pub(crate) fn unquote(text: &str) -> &str {
    text.trim_matches(|c| c == '"' || c == '\'' || c == '`')
}

/// The directory components of a root-relative file path, as strings.
pub(crate) fn dir_components(rel_path: &Path) -> Vec<String> {
    rel_path
        .parent()
        .map(|p| {
            p.components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// The file stem of a root-relative path, as a string.
pub(crate) fn file_stem(rel_path: &Path) -> String {
    rel_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_maps_extensions() {
        let reg = LanguageRegistry::new();
        assert_eq!(reg.for_file(Path::new("a/b.py")).unwrap().id(), "python");
        assert_eq!(reg.for_file(Path::new("x.rs")).unwrap().id(), "rust");
        assert_eq!(reg.for_file(Path::new("x.tsx")).unwrap().id(), "typescript");
        assert_eq!(reg.for_file(Path::new("x.mjs")).unwrap().id(), "javascript");
        assert_eq!(reg.for_file(Path::new("x.c")).unwrap().id(), "cpp");
        assert_eq!(reg.for_file(Path::new("x.hpp")).unwrap().id(), "cpp");
        assert!(reg.for_file(Path::new("notes.md")).is_none());
        assert!(reg.for_file(Path::new("Makefile")).is_none());
    }

    #[test]
    fn extract_file_swallows_missing_file() {
        let reg = LanguageRegistry::new();
        let lang = reg.get("python").unwrap();
        let imports = extract_file(lang.as_ref(), Path::new("/nonexistent/void.py"));
        assert!(imports.is_empty());
    }

    #[test]
    fn extract_file_swallows_binary_garbage() {
        let reg = LanguageRegistry::new();
        let lang = reg.get("python").unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.py");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x01]).unwrap();

        let imports = extract_file(lang.as_ref(), &path);
        assert!(imports.is_empty());
    }
}
