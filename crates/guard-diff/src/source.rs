use std::path::PathBuf;

use guard_core::Result;
use tracing::debug;

use crate::git::Git;

/// Result of asking for the branch-vs-upstream diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchDiff {
    /// Diff between the upstream and the current branch (may be empty).
    Diff {
        /// Current branch name.
        branch: String,
        /// Upstream ref, e.g. `origin/main`.
        upstream: String,
        /// Zero-context unified diff, trimmed.
        diff: String,
    },
    /// The current branch has no configured upstream.
    NoUpstream {
        /// Current branch name.
        branch: String,
    },
}

impl BranchDiff {
    /// The diff text, empty when there is no upstream.
    pub fn text(&self) -> &str {
        match self {
            BranchDiff::Diff { diff, .. } => diff,
            BranchDiff::NoUpstream { .. } => "",
        }
    }
}

/// Produces the diff text handed to the reviewer.
///
/// Empty output means "nothing to analyze" and is never an error; failing
/// to run git at all is.
///
/// # Examples
///
/// ```no_run
/// use guard_diff::DiffSource;
///
/// let source = DiffSource::new(".");
/// let staged = source.staged().unwrap();
/// if staged.is_empty() {
///     println!("nothing staged");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DiffSource {
    git: Git,
}

impl DiffSource {
    /// Read diffs from the repository containing `repo`.
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self {
            git: Git::new(repo),
        }
    }

    /// Staged-but-uncommitted changes (`git diff --cached`).
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Git`](guard_core::GuardError::Git) if git cannot run or the path is not a repository.
    pub fn staged(&self) -> Result<String> {
        let diff = self.git.run(&["diff", "--cached"])?;
        debug!(bytes = diff.len(), "staged diff collected");
        Ok(diff)
    }

    /// Name of the checked-out branch (`HEAD` when detached).
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Git`](guard_core::GuardError::Git) if git cannot resolve `HEAD`.
    pub fn current_branch(&self) -> Result<String> {
        self.git.run(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    /// Upstream ref configured for `branch`, or `None` if unset.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Git`](guard_core::GuardError::Git) only when git cannot be spawned; a failing
    /// lookup means "no upstream".
    pub fn upstream_of(&self, branch: &str) -> Result<Option<String>> {
        let spec = format!("{branch}@{{upstream}}");
        let out = self.git.output(&[
            "rev-parse",
            "--symbolic-full-name",
            "--abbrev-ref",
            &spec,
        ])?;
        let upstream = out.stdout.trim();
        if !out.success || upstream.is_empty() {
            debug!(branch, stderr = out.stderr.trim(), "no upstream configured");
            return Ok(None);
        }
        Ok(Some(upstream.to_string()))
    }

    /// Accumulated changes of the current branch against its upstream,
    /// with zero lines of context.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Git`](guard_core::GuardError::Git) if the branch cannot be resolved or the
    /// diff command fails.
    pub fn branch(&self) -> Result<BranchDiff> {
        let branch = self.current_branch()?;
        let Some(upstream) = self.upstream_of(&branch)? else {
            return Ok(BranchDiff::NoUpstream { branch });
        };

        let range = format!("{upstream}...{branch}");
        let diff = self.git.run(&["diff", &range, "--unified=0"])?;
        debug!(%branch, %upstream, bytes = diff.len(), "branch diff collected");
        Ok(BranchDiff::Diff {
            branch,
            upstream,
            diff,
        })
    }
}
