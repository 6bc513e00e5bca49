//! Installation of the ai-git-guard pre-push hook.

mod manager;

pub use manager::{HookManager, HookStatus, HOOK_MARKER, PRE_PUSH_HOOK};
