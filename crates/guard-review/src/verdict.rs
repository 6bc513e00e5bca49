use guard_core::Decision;

/// Marker the model must emit for a push to be allowed.
pub const SAFE_MARKER: &str = "SAFE TO RELEASE";

/// Verdict substituted for the model's reply when the request fails.
pub const FAILED_VERDICT: &str = "NEEDS REVIEW - AI check failed";

/// Turn free-form model output into an allow/block decision.
///
/// Allow iff the upper-cased text contains [`SAFE_MARKER`] anywhere. The
/// rest of the reply, including any `SEVERITY:` line, is ignored.
///
/// # Examples
///
/// ```
/// use guard_core::Decision;
/// use guard_review::verdict::interpret;
///
/// assert_eq!(interpret("STATUS: safe to release"), Decision::Allow);
/// assert_eq!(interpret("NEEDS REVIEW - eval on user input"), Decision::Block);
/// ```
pub fn interpret(verdict: &str) -> Decision {
    if verdict.to_uppercase().contains(SAFE_MARKER) {
        Decision::Allow
    } else {
        Decision::Block
    }
}
