use std::io::Write;

use guard_core::{Decision, DiffMode, Result, TemplateKind};
use guard_diff::{BranchDiff, DiffSource};
use serde::Serialize;
use tracing::debug;

use crate::llm::VerdictBackend;
use crate::prompt::build_prompt;
use crate::verdict::interpret;

/// Record of one scan, printed as JSON with `--format json`.
///
/// # Examples
///
/// ```
/// use guard_core::{Decision, DiffMode, TemplateKind};
/// use guard_review::pipeline::ScanReport;
///
/// let report = ScanReport {
///     mode: DiffMode::Staged,
///     template: TemplateKind::Lightweight,
///     branch: None,
///     upstream: None,
///     no_upstream: false,
///     diff_empty: true,
///     verdict: None,
///     decision: Decision::Allow,
/// };
/// assert_eq!(report.exit_code(), 0);
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    /// Where the diff came from.
    pub mode: DiffMode,
    /// Template the diff was embedded in.
    pub template: TemplateKind,
    /// Current branch (branch mode only).
    pub branch: Option<String>,
    /// Upstream ref (branch mode only, when configured).
    pub upstream: Option<String>,
    /// Branch mode found no upstream to compare against.
    pub no_upstream: bool,
    /// Nothing to analyze; the model was not contacted.
    pub diff_empty: bool,
    /// Raw model reply, or the failure sentinel.
    pub verdict: Option<String>,
    /// Final allow/block outcome.
    pub decision: Decision,
}

impl ScanReport {
    /// Process exit code for this scan.
    pub fn exit_code(&self) -> i32 {
        self.decision.exit_code()
    }
}

/// Diff collected for a scan, before review.
#[derive(Debug, Clone)]
struct Collected {
    diff: String,
    branch: Option<String>,
    upstream: Option<String>,
    no_upstream: bool,
}

/// Scan orchestrator: diff → prompt → verdict → decision.
///
/// Staged and branch scans share this one path; the mode picks the diff
/// source and the template.
pub struct ScanPipeline<B> {
    source: DiffSource,
    backend: B,
}

impl<B: VerdictBackend> ScanPipeline<B> {
    /// Create a pipeline reading from `source` and asking `backend`.
    pub fn new(source: DiffSource, backend: B) -> Self {
        Self { source, backend }
    }

    fn collect(&self, mode: DiffMode, out: &mut dyn Write) -> Result<Collected> {
        match mode {
            DiffMode::Staged => Ok(Collected {
                diff: self.source.staged()?,
                branch: None,
                upstream: None,
                no_upstream: false,
            }),
            DiffMode::Branch => match self.source.branch()? {
                BranchDiff::NoUpstream { branch } => {
                    writeln!(
                        out,
                        "No upstream set for branch '{branch}'. Please set upstream with:"
                    )?;
                    writeln!(out, "   git push --set-upstream origin {branch}")?;
                    Ok(Collected {
                        diff: String::new(),
                        branch: Some(branch),
                        upstream: None,
                        no_upstream: true,
                    })
                }
                BranchDiff::Diff {
                    branch,
                    upstream,
                    diff,
                } => Ok(Collected {
                    diff,
                    branch: Some(branch),
                    upstream: Some(upstream),
                    no_upstream: false,
                }),
            },
        }
    }

    /// Ask the backend about `diff` and interpret the reply.
    pub async fn review(&self, diff: &str, template: TemplateKind) -> (String, Decision) {
        let prompt = build_prompt(diff, template);
        let verdict = self.backend.verdict(&prompt).await;
        let decision = interpret(&verdict);
        debug!(%template, %decision, "verdict interpreted");
        (verdict, decision)
    }

    /// Run a full scan, writing user-facing messages to `out`.
    ///
    /// An empty diff, including a branch without upstream, is allowed
    /// without contacting the backend.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Git`](guard_core::GuardError::Git) when the diff cannot be collected, or
    /// [`GuardError::Io`](guard_core::GuardError::Io) when writing to `out` fails. Backend failures are
    /// never errors; they block.
    pub async fn run(&self, mode: DiffMode, out: &mut dyn Write) -> Result<ScanReport> {
        let template = mode.template();
        let collected = self.collect(mode, out)?;

        let mut report = ScanReport {
            mode,
            template,
            branch: collected.branch,
            upstream: collected.upstream,
            no_upstream: collected.no_upstream,
            diff_empty: collected.diff.is_empty(),
            verdict: None,
            decision: Decision::Allow,
        };

        if collected.diff.is_empty() {
            if !report.no_upstream {
                writeln!(out, "No {} changes to analyze.", mode.noun())?;
            }
            return Ok(report);
        }

        writeln!(out, "Running AI analysis on {} changes...", mode.noun())?;
        out.flush()?;
        let (verdict, decision) = self.review(&collected.diff, template).await;

        writeln!(out, "\nAI Security Analysis Report:\n")?;
        writeln!(out, "{verdict}\n")?;
        match decision {
            Decision::Allow => writeln!(out, "Safe to release. Push allowed.")?,
            Decision::Block => writeln!(out, "Push blocked due to security risks found by AI.")?,
        }

        report.verdict = Some(verdict);
        report.decision = decision;
        Ok(report)
    }
}
