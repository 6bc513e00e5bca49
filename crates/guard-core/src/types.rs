use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Outcome of a scan: allow the push or block it.
///
/// # Examples
///
/// ```
/// use guard_core::Decision;
///
/// assert_eq!(Decision::Allow.exit_code(), 0);
/// assert_eq!(Decision::Block.exit_code(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Nothing to review, or the model reported no issues.
    Allow,
    /// The model flagged issues or could not be reached.
    Block,
}

impl Decision {
    /// Process exit code handed back to git's pre-push gate.
    pub fn exit_code(self) -> i32 {
        match self {
            Decision::Allow => 0,
            Decision::Block => 1,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Allow => write!(f, "allow"),
            Decision::Block => write!(f, "block"),
        }
    }
}

/// Which instruction template wraps the diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// Terse answer: `SAFE TO RELEASE` or `NEEDS REVIEW - ...`.
    Lightweight,
    /// Senior-reviewer report with `SEVERITY:` / `STATUS:` fields.
    Structured,
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateKind::Lightweight => write!(f, "lightweight"),
            TemplateKind::Structured => write!(f, "structured"),
        }
    }
}

/// Where the diff under review comes from.
///
/// # Examples
///
/// ```
/// use guard_core::{DiffMode, TemplateKind};
///
/// assert_eq!(DiffMode::Staged.template(), TemplateKind::Lightweight);
/// assert_eq!(DiffMode::Branch.template(), TemplateKind::Structured);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffMode {
    /// Index vs. HEAD (`git diff --cached`).
    Staged,
    /// Current branch vs. its configured upstream.
    Branch,
}

impl DiffMode {
    /// Template paired with this mode.
    pub fn template(self) -> TemplateKind {
        match self {
            DiffMode::Staged => TemplateKind::Lightweight,
            DiffMode::Branch => TemplateKind::Structured,
        }
    }

    /// Word used in user-facing messages ("staged" / "committed").
    pub fn noun(self) -> &'static str {
        match self {
            DiffMode::Staged => "staged",
            DiffMode::Branch => "committed",
        }
    }
}

impl fmt::Display for DiffMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffMode::Staged => write!(f, "staged"),
            DiffMode::Branch => write!(f, "branch"),
        }
    }
}

/// Output format for CLI subcommands.
///
/// Implements [`FromStr`] so it can be used directly with `clap` argument parsing.
///
/// # Examples
///
/// ```
/// use guard_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable messages.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn output_format_default_is_text() {
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }

    #[test]
    fn decision_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Decision::Block).unwrap(), "\"block\"");
        assert_eq!(serde_json::to_string(&Decision::Allow).unwrap(), "\"allow\"");
    }

    #[test]
    fn diff_mode_nouns() {
        assert_eq!(DiffMode::Staged.noun(), "staged");
        assert_eq!(DiffMode::Branch.noun(), "committed");
        assert_eq!(DiffMode::Branch.to_string(), "branch");
    }
}
