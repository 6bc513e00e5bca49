use std::path::{Path, PathBuf};
use std::process::Command;

use guard_core::{GuardError, Result};
use tracing::debug;

/// Captured result of one `git` invocation.
#[derive(Debug, Clone)]
pub struct GitOutput {
    /// Whether git exited with status 0.
    pub success: bool,
    /// Standard output, lossily decoded as UTF-8.
    pub stdout: String,
    /// Standard error, lossily decoded as UTF-8.
    pub stderr: String,
}

/// Runs `git -C <repo> ...` subprocesses for one repository.
///
/// # Examples
///
/// ```
/// use guard_diff::Git;
///
/// let git = Git::new(".");
/// assert_eq!(git.repo().to_str(), Some("."));
/// ```
#[derive(Debug, Clone)]
pub struct Git {
    repo: PathBuf,
}

impl Git {
    /// Create a runner rooted at `repo`.
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self { repo: repo.into() }
    }

    /// Repository path passed to `git -C`.
    pub fn repo(&self) -> &Path {
        &self.repo
    }

    /// Run git and capture its output whatever the exit status.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Git`] only if the process cannot be spawned.
    pub fn output(&self, args: &[&str]) -> Result<GitOutput> {
        debug!(repo = %self.repo.display(), ?args, "running git");
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo)
            .args(args)
            .output()
            .map_err(|e| GuardError::Git(format!("failed to run git {}: {e}", args.join(" "))))?;

        let result = GitOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(success = result.success, stdout_len = result.stdout.len(), "git finished");
        Ok(result)
    }

    /// Run git and return trimmed stdout, treating a non-zero exit as an error.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Git`] with git's stderr if the command fails.
    pub fn run(&self, args: &[&str]) -> Result<String> {
        let out = self.output(args)?;
        if !out.success {
            return Err(GuardError::Git(format!(
                "git {} failed: {}",
                args.join(" "),
                out.stderr.trim()
            )));
        }
        Ok(out.stdout.trim().to_string())
    }

    /// Top-level directory of the working tree containing `repo`.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Git`] when `repo` is not inside a git repository.
    pub fn toplevel(&self) -> Result<PathBuf> {
        self.run(&["rev-parse", "--show-toplevel"]).map(PathBuf::from)
    }
}
