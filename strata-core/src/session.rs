//! High-level orchestration: scan, graph, plan, and the incremental
//! refresh cycle.

use std::path::{Path, PathBuf};

use strata_graphs::{DependencyGraph, GraphBuilder};
use tracing::{info, warn};

use crate::config::StrataConfig;
use crate::error::Result;
use crate::filter::FileFilter;
use crate::impact::{ImpactSet, compute_impact, should_full_reanalyze};
use crate::planner::{Plan, generate_plan};
use crate::state::{ExecutionState, StateStore};
use crate::vcs::{GitCli, Vcs};

/// Everything a full analysis produces.
#[derive(Debug)]
pub struct SessionReport {
    pub files: Vec<String>,
    pub graph: DependencyGraph,
    pub plan: Plan,
    pub state: ExecutionState,
}

/// What a refresh decided to do.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// Nothing changed since the recorded base commit.
    NoChanges,
    /// Too much changed (or the baseline was unusable); a fresh full
    /// analysis replaced the old plan and state.
    Full(SessionReport),
    /// The plan was patched in place and only affected batches were
    /// reset.
    Incremental {
        report: SessionReport,
        impact: ImpactSet,
    },
}

/// One analysis session over a source tree.
pub struct AnalysisSession {
    root: PathBuf,
    config: StrataConfig,
    builder: GraphBuilder,
    store: StateStore,
    vcs: Box<dyn Vcs>,
}

impl std::fmt::Debug for AnalysisSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisSession")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl AnalysisSession {
    /// Opens a session on `root`, reading `.strata/config.toml` if
    /// present and talking to git through the CLI.
    pub fn open(root: &Path) -> Result<Self> {
        let config = StrataConfig::load(root)?;
        let vcs = Box::new(GitCli::new(root.to_path_buf(), config.vcs.diff_timeout_secs));
        Ok(Self::with_vcs(root, config, vcs))
    }

    /// Opens a session with an explicit VCS backend.
    #[must_use]
    pub fn with_vcs(root: &Path, config: StrataConfig, vcs: Box<dyn Vcs>) -> Self {
        Self {
            root: root.to_path_buf(),
            config,
            builder: GraphBuilder::new(),
            store: StateStore::new(root),
            vcs,
        }
    }

    #[must_use]
    pub fn config(&self) -> &StrataConfig {
        &self.config
    }

    #[must_use]
    pub fn state_store(&self) -> &StateStore {
        &self.store
    }

    /// Admitted files of the tree, root-relative and sorted.
    #[must_use]
    pub fn scan(&self) -> Vec<String> {
        FileFilter::new(&self.config.scan).scan(&self.root)
    }

    /// Full analysis: scan, build the graph, derive a plan, and start a
    /// fresh execution state pinned to the current commit.
    pub async fn analyze(&self) -> Result<SessionReport> {
        let files = self.scan();
        let graph = self.builder.build(&self.root, &files);
        let plan = generate_plan(&graph, self.config.plan.batch_size);

        let mut state = ExecutionState::default();
        if self.vcs.is_repo().await? {
            state.set_base_commit(&self.vcs.head_commit().await?);
        }
        self.store.save(&state)?;

        info!(files = files.len(), batches = plan.batch_count(), "full analysis complete");
        Ok(SessionReport {
            files,
            graph,
            plan,
            state,
        })
    }

    /// Brings the plan up to date with the tree.
    ///
    /// Falls back to a full analysis when there is no usable baseline
    /// (no recorded commit, commit unknown to the repo, not a repo) or
    /// when the impacted fraction of the tree crosses the configured
    /// threshold. Otherwise only the batches touching impacted files
    /// are reset.
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        let state = self.store.load();

        if state.base_commit.is_empty() {
            info!("No base commit recorded, running full analysis");
            return Ok(RefreshOutcome::Full(self.analyze().await?));
        }
        if !self.vcs.is_repo().await? {
            warn!("Tree is not a repository, running full analysis");
            return Ok(RefreshOutcome::Full(self.analyze().await?));
        }
        if !self.vcs.commit_exists(&state.base_commit).await? {
            warn!(base = %state.base_commit, "Base commit unknown, running full analysis");
            return Ok(RefreshOutcome::Full(self.analyze().await?));
        }

        let diff = self.vcs.diff_from(&state.base_commit).await?;
        if diff.is_empty() {
            info!("No changes since base commit");
            return Ok(RefreshOutcome::NoChanges);
        }

        let files = self.scan();
        let graph = self.builder.build(&self.root, &files);
        let impact = compute_impact(&diff, &graph);

        if should_full_reanalyze(&impact, files.len(), self.config.plan.full_reanalysis_threshold)
        {
            info!(
                impacted = impact.reanalyze.len(),
                total = files.len(),
                "Impact crosses threshold, running full analysis"
            );
            return Ok(RefreshOutcome::Full(self.analyze().await?));
        }

        let plan = generate_plan(&graph, self.config.plan.batch_size);
        let touched = plan.batches_touching(impact.reanalyze.iter());

        let mut state = state;
        state.reset_for_incremental(&touched);
        state.set_base_commit(&self.vcs.head_commit().await?);
        self.store.save(&state)?;

        info!(
            reset_batches = touched.len(),
            pending = state.pending_batches(&plan).len(),
            "incremental refresh complete"
        );
        Ok(RefreshOutcome::Incremental {
            report: SessionReport {
                files,
                graph,
                plan,
                state,
            },
            impact,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcs::DiffResult;
    use async_trait::async_trait;
    use std::fs;

    struct FakeVcs {
        head: String,
        known_commits: Vec<String>,
        diff: DiffResult,
    }

    impl FakeVcs {
        fn quiet(head: &str) -> Self {
            Self {
                head: head.to_string(),
                known_commits: vec![head.to_string()],
                diff: DiffResult::default(),
            }
        }
    }

    #[async_trait]
    impl Vcs for FakeVcs {
        async fn is_repo(&self) -> std::result::Result<bool, crate::error::VcsError> {
            Ok(true)
        }
        async fn head_commit(&self) -> std::result::Result<String, crate::error::VcsError> {
            Ok(self.head.clone())
        }
        async fn commit_exists(
            &self,
            sha: &str,
        ) -> std::result::Result<bool, crate::error::VcsError> {
            Ok(self.known_commits.iter().any(|c| c == sha))
        }
        async fn diff_from(
            &self,
            _base: &str,
        ) -> std::result::Result<DiffResult, crate::error::VcsError> {
            Ok(self.diff.clone())
        }
    }

    fn write_tree(root: &Path, files: &[(&str, &str)]) {
        for (path, contents) in files {
            let abs = root.join(path);
            fs::create_dir_all(abs.parent().unwrap()).unwrap();
            fs::write(abs, contents).unwrap();
        }
    }

    fn session(root: &Path, vcs: FakeVcs) -> AnalysisSession {
        AnalysisSession::with_vcs(root, StrataConfig::default(), Box::new(vcs))
    }

    #[tokio::test]
    async fn analyze_pins_head_and_persists_state() {
        let dir = tempfile::tempdir().unwrap();
        write_tree(dir.path(), &[("src/a.py", ""), ("src/b.py", "import a\n")]);

        let session = session(dir.path(), FakeVcs::quiet("c0ffee"));
        let report = session.analyze().await.unwrap();

        assert_eq!(report.files.len(), 2);
        assert_eq!(report.state.base_commit, "c0ffee");
        assert_eq!(session.state_store().load().base_commit, "c0ffee");
    }

    #[tokio::test]
    async fn refresh_without_baseline_runs_full() {
        let dir = tempfile::tempdir().unwrap();
        write_tree(dir.path(), &[("src/a.py", "")]);

        let session = session(dir.path(), FakeVcs::quiet("c0ffee"));
        match session.refresh().await.unwrap() {
            RefreshOutcome::Full(report) => assert_eq!(report.state.base_commit, "c0ffee"),
            other => panic!("expected full analysis, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn refresh_with_no_diff_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        write_tree(dir.path(), &[("src/a.py", "")]);

        let session = session(dir.path(), FakeVcs::quiet("c0ffee"));
        session.analyze().await.unwrap();

        assert!(matches!(
            session.refresh().await.unwrap(),
            RefreshOutcome::NoChanges
        ));
    }

    #[tokio::test]
    async fn refresh_with_unknown_base_commit_runs_full() {
        let dir = tempfile::tempdir().unwrap();
        write_tree(dir.path(), &[("src/a.py", "")]);

        let session = session(dir.path(), FakeVcs::quiet("c0ffee"));
        session.analyze().await.unwrap();

        // history rewritten: old head is gone
        let mut vcs = FakeVcs::quiet("deadbeef");
        vcs.known_commits = vec!["deadbeef".to_string()];
        let session = AnalysisSession::with_vcs(
            dir.path(),
            StrataConfig::default(),
            Box::new(vcs),
        );

        assert!(matches!(
            session.refresh().await.unwrap(),
            RefreshOutcome::Full(_)
        ));
    }

    #[tokio::test]
    async fn small_change_refreshes_incrementally() {
        let dir = tempfile::tempdir().unwrap();
        write_tree(
            dir.path(),
            &[
                ("src/a.py", ""),
                ("src/b.py", ""),
                ("src/c.py", ""),
                ("src/d.py", ""),
                ("src/e.py", ""),
            ],
        );

        let session = session(dir.path(), FakeVcs::quiet("c0ffee"));
        session.analyze().await.unwrap();

        let mut vcs = FakeVcs::quiet("f00d");
        vcs.known_commits.push("c0ffee".to_string());
        vcs.diff = DiffResult {
            modified: vec!["src/b.py".into()],
            ..DiffResult::default()
        };
        let session = AnalysisSession::with_vcs(
            dir.path(),
            StrataConfig::default(),
            Box::new(vcs),
        );

        match session.refresh().await.unwrap() {
            RefreshOutcome::Incremental { report, impact } => {
                assert!(impact.reanalyze.contains("src/b.py"));
                assert_eq!(report.state.base_commit, "f00d");
                // the batch holding b.py is pending again
                let pending = report.state.pending_batches(&report.plan);
                let reset = report.plan.batches_touching(impact.reanalyze.iter());
                assert!(reset.iter().all(|id| pending.contains(id)));
            }
            other => panic!("expected incremental refresh, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn sweeping_change_escalates_to_full() {
        let dir = tempfile::tempdir().unwrap();
        write_tree(dir.path(), &[("src/a.py", ""), ("src/b.py", "")]);

        let session = session(dir.path(), FakeVcs::quiet("c0ffee"));
        session.analyze().await.unwrap();

        let mut vcs = FakeVcs::quiet("f00d");
        vcs.known_commits.push("c0ffee".to_string());
        vcs.diff = DiffResult {
            modified: vec!["src/a.py".into(), "src/b.py".into()],
            ..DiffResult::default()
        };
        let session = AnalysisSession::with_vcs(
            dir.path(),
            StrataConfig::default(),
            Box::new(vcs),
        );

        assert!(matches!(
            session.refresh().await.unwrap(),
            RefreshOutcome::Full(_)
        ));
    }
}
