//! Core library for Strata: incremental source-tree analysis planning.
//!
//! Strata builds a file-level dependency graph over a source tree,
//! derives a layered analysis plan from it, and keeps the plan alive
//! across runs: changes reported by version control are translated into
//! the minimal set of files to re-analyze, and execution progress is
//! persisted so interrupted runs resume where they left off.

pub mod config;
pub mod error;
pub mod filter;
pub mod impact;
pub mod planner;
pub mod session;
pub mod state;
pub mod vcs;

pub use config::StrataConfig;
pub use error::{Result, StrataError};
pub use impact::ImpactSet;
pub use planner::{Batch, Phase, Plan};
pub use session::{AnalysisSession, RefreshOutcome, SessionReport};
pub use state::{ExecutionState, StateStore};
pub use vcs::{DiffResult, GitCli, Vcs};
