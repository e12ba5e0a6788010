//! Version-control queries backed by the `git` binary.
//!
//! Change detection shells out to `git diff --name-status` rather than
//! reading the object database directly: the porcelain text format is
//! stable, rename detection comes for free, and the subprocess is easy
//! to bound with a timeout.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::VcsError;

/// Changes between two revisions, with paths relative to the repo root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub deleted: Vec<String>,
    /// `(old_path, new_path)` pairs from rename detection.
    pub renamed: Vec<(String, String)>,
}

impl DiffResult {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.modified.is_empty()
            && self.deleted.is_empty()
            && self.renamed.is_empty()
    }

    #[must_use]
    pub fn change_count(&self) -> usize {
        self.added.len() + self.modified.len() + self.deleted.len() + self.renamed.len()
    }
}

/// Read-only interface to version control.
#[async_trait]
pub trait Vcs: Send + Sync {
    /// Whether the root is inside a work tree at all.
    async fn is_repo(&self) -> Result<bool, VcsError>;

    /// SHA of the current `HEAD` commit.
    async fn head_commit(&self) -> Result<String, VcsError>;

    /// Whether `sha` names a commit known to the repository.
    async fn commit_exists(&self, sha: &str) -> Result<bool, VcsError>;

    /// Name-status diff from `base` to `HEAD`, with rename detection.
    async fn diff_from(&self, base: &str) -> Result<DiffResult, VcsError>;
}

/// [`Vcs`] implementation shelling out to the `git` binary.
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
    timeout: Duration,
}

impl GitCli {
    #[must_use]
    pub fn new(root: PathBuf, timeout_secs: u64) -> Self {
        Self {
            root,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<std::process::Output, VcsError> {
        let command_name = args.first().copied().unwrap_or("git").to_string();
        let child = Command::new("git")
            .arg("-C")
            .arg(&self.root)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output();

        match tokio::time::timeout(self.timeout, child).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(VcsError::Timeout {
                command: command_name,
                seconds: self.timeout.as_secs(),
            }),
        }
    }

    async fn run_ok(&self, args: &[&str]) -> Result<String, VcsError> {
        let output = self.run(args).await?;
        if !output.status.success() {
            return Err(VcsError::CommandFailed {
                command: args.first().copied().unwrap_or("git").to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        String::from_utf8(output.stdout).map_err(|e| VcsError::InvalidOutput(e.to_string()))
    }
}

#[async_trait]
impl Vcs for GitCli {
    async fn is_repo(&self) -> Result<bool, VcsError> {
        match self.run(&["rev-parse", "--is-inside-work-tree"]).await {
            Ok(output) => Ok(output.status.success()),
            Err(VcsError::Spawn(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn head_commit(&self) -> Result<String, VcsError> {
        let out = self.run_ok(&["rev-parse", "HEAD"]).await?;
        Ok(out.trim().to_string())
    }

    async fn commit_exists(&self, sha: &str) -> Result<bool, VcsError> {
        let rev = format!("{sha}^{{commit}}");
        let output = self.run(&["cat-file", "-e", &rev]).await?;
        Ok(output.status.success())
    }

    async fn diff_from(&self, base: &str) -> Result<DiffResult, VcsError> {
        let range = format!("{base}..HEAD");
        let out = self
            .run_ok(&["diff", "--name-status", "--find-renames", &range])
            .await?;
        let diff = parse_name_status(&out);
        debug!(base = %base, changes = diff.change_count(), "diff parsed");
        Ok(diff)
    }
}

/// Parses `git diff --name-status` output.
///
/// Recognized statuses: `A`dded, `M`odified, `D`eleted, `T`ype change
/// (treated as modified), `R<score>` rename (old and new path) and
/// `C<score>` copy (the new path is an addition). Lines that do not fit
/// the format are skipped with a warning rather than failing the diff.
#[must_use]
pub fn parse_name_status(text: &str) -> DiffResult {
    let mut diff = DiffResult::default();

    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split('\t');
        let Some(status) = fields.next() else {
            continue;
        };
        let path = fields.next();
        let second = fields.next();

        match (status.chars().next(), path, second) {
            (Some('A'), Some(p), _) => diff.added.push(p.to_string()),
            (Some('M' | 'T'), Some(p), _) => diff.modified.push(p.to_string()),
            (Some('D'), Some(p), _) => diff.deleted.push(p.to_string()),
            (Some('R'), Some(old), Some(new)) => {
                diff.renamed.push((old.to_string(), new.to_string()));
            }
            (Some('C'), Some(_), Some(new)) => diff.added.push(new.to_string()),
            _ => warn!(line = %line, "Unrecognized diff line, skipping"),
        }
    }

    diff
}
