#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};

pub fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args([
            "-c",
            "user.name=Guard Test",
            "-c",
            "user.email=guard@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Fresh repository on branch `main` with one commit.
pub fn init_repo() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    git(dir.path(), &["init", "-q"]);
    git(dir.path(), &["symbolic-ref", "HEAD", "refs/heads/main"]);
    std::fs::write(dir.path().join("README.md"), "demo\n").unwrap();
    git(dir.path(), &["add", "README.md"]);
    git(dir.path(), &["commit", "-q", "-m", "initial"]);
    dir
}

pub fn stage_injection(repo: &Path) {
    std::fs::write(repo.join("run.py"), "import os\nos.system(user_input)\n").unwrap();
    git(repo, &["add", "run.py"]);
}

/// Point the model at `base_url` via `.ai-git-guard.toml` in `dir`.
pub fn write_config(dir: &Path, base_url: &str) {
    std::fs::write(
        dir.join(".ai-git-guard.toml"),
        format!("[llm]\nbase_url = \"{base_url}\"\ntimeout_secs = 5\n"),
    )
    .unwrap();
}

/// Command for the binary, run in `dir` with a scrubbed environment.
pub fn guard(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ai-git-guard"));
    cmd.current_dir(dir)
        .env_remove("GEMINI_API_KEY")
        .env_remove("RUST_LOG")
        .env_remove("GIT_DIR")
        .env_remove("GIT_WORK_TREE");
    cmd
}

pub fn run(cmd: &mut Command) -> (Output, String, String) {
    let output = cmd.output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    (output, stdout, stderr)
}
