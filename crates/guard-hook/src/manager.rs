use std::fs;
use std::path::{Path, PathBuf};

use guard_core::{GuardError, Result};
use guard_diff::Git;
use serde::Serialize;
use tracing::{debug, info};

/// Marker line identifying a hook written by ai-git-guard.
pub const HOOK_MARKER: &str = "# ai-git-guard pre-push hook";

/// Pre-push hook script. Runs the scan and blocks the push on a non-zero exit.
pub const PRE_PUSH_HOOK: &str = r#"#!/bin/sh
# ai-git-guard pre-push hook
# Installed by 'ai-git-guard install'; remove with 'ai-git-guard uninstall'.

echo "AI Git Guard - Scanning for vulnerabilities..."
ai-git-guard scan
RESULT=$?
if [ $RESULT -ne 0 ]; then
  echo "[BLOCKED] Push blocked due to security risks found by AI."
  exit 1
fi
"#;

/// State of the pre-push hook in a repository.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookStatus {
    /// Path of the pre-push hook file.
    pub path: PathBuf,
    /// A file exists at `path`.
    pub installed: bool,
    /// The file carries the ai-git-guard marker.
    pub managed: bool,
    /// The file has an executable bit set (always `true` off Unix).
    pub executable: bool,
}

/// Manages `<repo>/.git/hooks/pre-push`.
#[derive(Debug, Clone)]
pub struct HookManager {
    hooks_dir: PathBuf,
}

impl HookManager {
    /// Locate the repository containing `path` and its hooks directory.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Git`] when `path` is not inside a git repository.
    pub fn discover(path: &Path) -> Result<Self> {
        let root = Git::new(path).toplevel()?;
        Ok(Self::at_root(&root))
    }

    /// Use `<root>/.git/hooks` without asking git.
    pub fn at_root(root: &Path) -> Self {
        Self {
            hooks_dir: root.join(".git").join("hooks"),
        }
    }

    /// Path of the pre-push hook file.
    pub fn hook_path(&self) -> PathBuf {
        self.hooks_dir.join("pre-push")
    }

    /// Write the pre-push hook and mark it executable.
    ///
    /// Any existing hook at that path is overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Hook`] if the directory, file, or permissions
    /// cannot be written.
    pub fn install(&self) -> Result<PathBuf> {
        let hook_path = self.hook_path();

        if !self.hooks_dir.exists() {
            fs::create_dir_all(&self.hooks_dir).map_err(|e| {
                GuardError::Hook(format!(
                    "failed to create {}: {e}",
                    self.hooks_dir.display()
                ))
            })?;
        }

        if hook_path.exists() {
            debug!(path = %hook_path.display(), "overwriting existing pre-push hook");
        }
        fs::write(&hook_path, PRE_PUSH_HOOK).map_err(|e| {
            GuardError::Hook(format!("failed to write {}: {e}", hook_path.display()))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&hook_path, fs::Permissions::from_mode(0o755)).map_err(|e| {
                GuardError::Hook(format!(
                    "failed to make {} executable: {e}",
                    hook_path.display()
                ))
            })?;
        }

        info!(path = %hook_path.display(), "installed pre-push hook");
        Ok(hook_path)
    }

    /// Remove the pre-push hook. Returns `false` if there was nothing to remove.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Hook`] if the file exists but cannot be deleted.
    pub fn uninstall(&self) -> Result<bool> {
        let hook_path = self.hook_path();
        if !hook_path.exists() {
            debug!(path = %hook_path.display(), "no pre-push hook to remove");
            return Ok(false);
        }

        fs::remove_file(&hook_path).map_err(|e| {
            GuardError::Hook(format!("failed to remove {}: {e}", hook_path.display()))
        })?;
        info!(path = %hook_path.display(), "removed pre-push hook");
        Ok(true)
    }

    /// Inspect the pre-push hook.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Hook`] if an existing hook cannot be read.
    pub fn status(&self) -> Result<HookStatus> {
        let path = self.hook_path();
        if !path.exists() {
            return Ok(HookStatus {
                path,
                installed: false,
                managed: false,
                executable: false,
            });
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| GuardError::Hook(format!("failed to read {}: {e}", path.display())))?;
        let managed = content.lines().any(|l| l.trim() == HOOK_MARKER);
        let executable = is_executable(&path)?;

        Ok(HookStatus {
            path,
            installed: true,
            managed,
            executable,
        })
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> Result<bool> {
    use std::os::unix::fs::PermissionsExt;
    let meta = fs::metadata(path)
        .map_err(|e| GuardError::Hook(format!("failed to stat {}: {e}", path.display())))?;
    Ok(meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> Result<bool> {
    Ok(true)
}
