//! Durable execution progress for a plan, persisted as JSON under
//! `.strata/state.json`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, StateError};
use crate::planner::Plan;

/// Progress through a plan. `completed_batches` and `failed_batches`
/// never overlap; a batch re-run after failing moves between them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutionState {
    /// Highest batch id whose status has been recorded.
    pub last_batch_id: u32,
    pub completed_batches: Vec<u32>,
    pub failed_batches: Vec<u32>,
    /// Commit the current plan was built against.
    #[serde(default)]
    pub base_commit: String,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Default for ExecutionState {
    fn default() -> Self {
        Self {
            last_batch_id: 0,
            completed_batches: Vec::new(),
            failed_batches: Vec::new(),
            base_commit: String::new(),
            updated_at: Utc::now(),
        }
    }
}

impl ExecutionState {
    /// Records the outcome of a batch, keeping the success and failure
    /// sets disjoint. Completion is terminal: a failure reported for an
    /// already-completed id is ignored. The watermark tracks the
    /// highest batch id ever completed successfully; failures do not
    /// advance it.
    pub fn record_batch(&mut self, batch_id: u32, success: bool) {
        if success {
            self.failed_batches.retain(|&id| id != batch_id);
            if !self.completed_batches.contains(&batch_id) {
                self.completed_batches.push(batch_id);
                self.completed_batches.sort_unstable();
            }
            self.last_batch_id = self.last_batch_id.max(batch_id);
        } else {
            if self.is_batch_completed(batch_id) {
                return;
            }
            if !self.failed_batches.contains(&batch_id) {
                self.failed_batches.push(batch_id);
                self.failed_batches.sort_unstable();
            }
        }
        self.updated_at = Utc::now();
    }

    #[must_use]
    pub fn is_batch_completed(&self, batch_id: u32) -> bool {
        self.completed_batches.contains(&batch_id)
    }

    /// Batches still to run, in plan order. Failed batches stay pending
    /// so a resumed run retries them.
    #[must_use]
    pub fn pending_batches(&self, plan: &Plan) -> Vec<u32> {
        plan.batch_ids()
            .into_iter()
            .filter(|id| !self.is_batch_completed(*id))
            .collect()
    }

    /// Forgets the outcome of the given batches so an incremental run
    /// re-executes them.
    pub fn reset_for_incremental(&mut self, batch_ids: &[u32]) {
        self.completed_batches.retain(|id| !batch_ids.contains(id));
        self.failed_batches.retain(|id| !batch_ids.contains(id));
        self.updated_at = Utc::now();
    }

    pub fn set_base_commit(&mut self, sha: &str) {
        self.base_commit = sha.to_string();
        self.updated_at = Utc::now();
    }
}

/// Loads and persists [`ExecutionState`] for one tree.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            path: root.join(".strata").join("state.json"),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted state. A missing file yields a fresh state;
    /// an unreadable or unparsable file is set aside as
    /// `state.json.corrupt` and also yields a fresh state, so one bad
    /// write never wedges the tool.
    #[must_use]
    pub fn load(&self) -> ExecutionState {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No state file, starting fresh");
                return ExecutionState::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Unreadable state file, starting fresh");
                self.quarantine();
                return ExecutionState::default();
            }
        };

        match serde_json::from_str(&text) {
            Ok(state) => state,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Corrupt state file, starting fresh");
                self.quarantine();
                ExecutionState::default()
            }
        }
    }

    fn quarantine(&self) {
        let aside = self.path.with_extension("json.corrupt");
        if let Err(e) = std::fs::rename(&self.path, &aside) {
            warn!(path = %self.path.display(), error = %e, "Could not set corrupt state aside");
        }
    }

    /// Writes the state to disk synchronously, creating `.strata/` if
    /// needed.
    pub fn save(&self, state: &ExecutionState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(StateError::Io)?;
        }
        let json = serde_json::to_string_pretty(state).map_err(StateError::Serialization)?;
        std::fs::write(&self.path, json).map_err(StateError::Io)?;
        Ok(())
    }

    /// Records a batch outcome and persists immediately, so a crash
    /// between batches loses at most the batch in flight.
    pub fn update_batch_status(
        &self,
        state: &mut ExecutionState,
        batch_id: u32,
        success: bool,
    ) -> Result<()> {
        state.record_batch(batch_id, success);
        self.save(state)
    }
}
