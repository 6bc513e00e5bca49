use guard_core::TemplateKind;

const LIGHTWEIGHT_TEMPLATE: &str = "\
Analyze the following git diff for security risks.

Your job:
- Identify OWASP Top 10 vulnerabilities (e.g. XSS, SQL Injection, etc.)
- Check for hardcoded secrets, API keys, tokens
- Identify risky functions (eval, exec, system, raw SQL)

Git Diff:
{diff}

Respond only with:
- \"SAFE TO RELEASE\"
- OR \"NEEDS REVIEW - Potential issues: [list the problems]\"

Be concise. Explain only if there's an issue.
";

const STRUCTURED_TEMPLATE: &str = "\
You are a senior security code reviewer. A developer is trying to push the following committed code changes:

{diff}

Your job is to:
1. Report only HIGH-RISK security vulnerabilities. Limit findings to:
- Code injection (eval, exec)
- Command injection (os.system, subprocess, shell execution)
- SQL injection (raw queries, string formatting)
- Hardcoded credentials or API keys
- Dangerous file handling or permissions
- Critical insecure deserialization
2. Ignore minor issues, style problems, and best-practice nitpicks.
3. Provide a severity rating (Low, Medium, High)
4. Output a structured result like:

---
SEVERITY: High
STATUS: NEEDS REVIEW - Potential issues: [summary]
DETAILS:
- [explanation]
- [file/line if possible]
SUGGESTIONS:
- [fix or better practice]
---

If no issues found, reply with:
---
SEVERITY: None
STATUS: SAFE TO RELEASE
---
";

/// Embed `diff` into the instruction template for `kind`.
///
/// The diff is spliced in verbatim. A crafted diff can therefore address
/// the model directly; the verdict must be read with that in mind.
///
/// # Examples
///
/// ```
/// use guard_core::TemplateKind;
/// use guard_review::prompt::build_prompt;
///
/// let prompt = build_prompt("+eval(x)", TemplateKind::Lightweight);
/// assert!(prompt.contains("+eval(x)"));
/// assert!(prompt.contains("SAFE TO RELEASE"));
/// ```
pub fn build_prompt(diff: &str, kind: TemplateKind) -> String {
    let template = match kind {
        TemplateKind::Lightweight => LIGHTWEIGHT_TEMPLATE,
        TemplateKind::Structured => STRUCTURED_TEMPLATE,
    };
    template.replacen("{diff}", diff, 1)
}
