//! Glob-based selection of the files admitted into a scan.

use std::path::Path;

use tracing::warn;

use crate::config::ScanSection;

/// Applies a configured set of include and exclude patterns to a tree.
#[derive(Debug, Clone)]
pub struct FileFilter {
    include_patterns: Vec<String>,
    exclude_patterns: Vec<String>,
}

impl FileFilter {
    #[must_use]
    pub fn new(scan: &ScanSection) -> Self {
        Self {
            include_patterns: scan.include_patterns.clone(),
            exclude_patterns: scan.exclude_patterns.clone(),
        }
    }

    /// Walks `root` and returns the admitted files as sorted,
    /// deduplicated root-relative path strings.
    #[must_use]
    pub fn scan(&self, root: &Path) -> Vec<String> {
        let mut matched = Vec::new();

        for pattern in &self.include_patterns {
            let full_pattern = root.join(pattern).to_string_lossy().to_string();
            match glob::glob(&full_pattern) {
                Ok(paths) => {
                    for entry in paths.flatten() {
                        if entry.is_file() && !self.is_excluded(&entry, root) {
                            matched.push(relative_string(&entry, root));
                        }
                    }
                }
                Err(e) => {
                    warn!(pattern = %pattern, error = %e, "Invalid glob pattern");
                }
            }
        }

        matched.sort();
        matched.dedup();
        matched
    }

    fn is_excluded(&self, path: &Path, root: &Path) -> bool {
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy();

        for pattern in &self.exclude_patterns {
            let normalized = pattern.replace("**", "");
            let normalized = normalized.trim_matches('/');
            if rel_str.contains(normalized) {
                return true;
            }
        }
        false
    }
}

fn relative_string(path: &Path, root: &Path) -> String {
    let rel: &Path = path.strip_prefix(root).unwrap_or(path);
    // Stored paths use forward slashes regardless of platform.
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

impl From<&ScanSection> for FileFilter {
    fn from(scan: &ScanSection) -> Self {
        Self::new(scan)
    }
}
