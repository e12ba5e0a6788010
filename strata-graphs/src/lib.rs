//! Dependency graph engine for Strata.
//!
//! Builds a file-level dependency graph from per-language import
//! extraction, then derives the two structures planning needs: a
//! topological layering (via [`graph::DependencyGraph::calculate_layers`])
//! and the list of dependency cycles
//! (via [`graph::DependencyGraph::detect_cycles`]).

pub mod builder;
pub mod graph;
pub mod languages;

pub use builder::GraphBuilder;
pub use graph::{CYCLE_LAYER, DependencyGraph};
pub use languages::{LanguageRegistry, LanguageSupport};

/// Error type for the graph engine.
#[derive(thiserror::Error, Debug)]
pub enum GraphError {
    #[error("Parse error in {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;
