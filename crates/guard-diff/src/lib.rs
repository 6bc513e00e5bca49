//! Diff extraction for ai-git-guard.
//!
//! Wraps the `git` binary as a subprocess and produces the raw unified diff
//! handed to the reviewer: either staged changes or the current branch
//! against its upstream.

pub mod git;
pub mod source;

pub use git::{Git, GitOutput};
pub use source::{BranchDiff, DiffSource};
