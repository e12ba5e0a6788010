/// Top-level Strata error type.
///
/// All fallible operations in `strata-core` return
/// [`Result<T, StrataError>`](Result). Each variant wraps a
/// domain-specific error enum, allowing callers to match on the error
/// source without losing type information.
#[derive(thiserror::Error, Debug)]
pub enum StrataError {
    /// Error from the graph engine (tree-sitter parsing, graph build).
    #[error("Graph engine error: {0}")]
    Graph(#[from] strata_graphs::GraphError),

    /// Error talking to version control.
    #[error("VCS error: {0}")]
    Vcs(#[from] VcsError),

    /// Error loading or persisting execution state.
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// Error in configuration parsing or validation.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from version-control queries (git subprocess).
#[derive(thiserror::Error, Debug)]
pub enum VcsError {
    /// The git binary could not be spawned.
    #[error("Failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    /// Git exited non-zero.
    #[error("git {command} failed: {stderr}")]
    CommandFailed {
        /// The git subcommand that failed.
        command: String,
        /// Captured stderr, trimmed.
        stderr: String,
    },

    /// The operation did not finish within the configured timeout.
    #[error("git {command} timed out after {seconds}s")]
    Timeout {
        /// The git subcommand that timed out.
        command: String,
        /// Timeout that elapsed.
        seconds: u64,
    },

    /// The target directory is not a git repository.
    #[error("Not a git repository: {0}")]
    NotARepository(String),

    /// Git produced output that was not valid UTF-8.
    #[error("Invalid git output: {0}")]
    InvalidOutput(String),
}

/// Errors loading or persisting execution state.
#[derive(thiserror::Error, Debug)]
pub enum StateError {
    /// JSON serialization of the state file failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem I/O on the state file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors in Strata configuration parsing and validation.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Configuration file syntax could not be parsed (TOML error).
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration values are present but semantically invalid.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Convenience alias used throughout `strata-core`.
pub type Result<T> = std::result::Result<T, StrataError>;
