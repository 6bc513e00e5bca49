/// Errors that can occur across ai-git-guard.
///
/// Each variant wraps a specific error domain. Library crates use this type
/// directly; the binary crate converts to a `miette` report at the boundary.
///
/// Remote model failures never abort a scan: the verdict client reports
/// the [`GuardError::Llm`] on stderr and turns it into a fail-closed verdict.
///
/// # Examples
///
/// ```
/// use guard_core::GuardError;
///
/// let err = GuardError::Config("missing API key".into());
/// assert!(err.to_string().contains("missing API key"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum GuardError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(help("export GEMINI_API_KEY=... (or add it to .env) and check .ai-git-guard.toml"))]
    Config(String),

    /// The `git` binary could not be run or reported a failure.
    #[error("git error: {0}")]
    #[diagnostic(help("run ai-git-guard from inside a git repository, or pass --repo"))]
    Git(String),

    /// Writing, chmod-ing, or removing the pre-push hook failed.
    #[error("hook error: {0}")]
    Hook(String),

    /// Gemini client setup or request failure.
    #[error("Gemini API error: {0}")]
    Llm(String),

    /// TOML deserialization failure. The parser's message is the source.
    #[error("failed to parse configuration file")]
    #[diagnostic(help("check the syntax of .ai-git-guard.toml"))]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: GuardError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn config_error_displays_message() {
        let err = GuardError::Config("bad value".into());
        assert_eq!(err.to_string(), "configuration error: bad value");
    }

    #[test]
    fn git_error_displays_message() {
        let err = GuardError::Git("not a git repository".into());
        assert_eq!(err.to_string(), "git error: not a git repository");
    }

    #[test]
    fn hook_error_displays_message() {
        let err = GuardError::Hook("permission denied".into());
        assert!(err.to_string().starts_with("hook error"));
    }

    #[test]
    fn llm_error_names_the_service_once() {
        let err = GuardError::Llm("HTTP 500 Internal Server Error: boom".into());
        let msg = err.to_string();
        assert_eq!(msg, "Gemini API error: HTTP 500 Internal Server Error: boom");
        assert_eq!(msg.matches("Gemini API error").count(), 1);
    }

    #[test]
    fn toml_error_keeps_parser_detail_in_source_only() {
        use std::error::Error;

        let parse_err = toml::from_str::<toml::Value>("[llm\nmodel = 1").unwrap_err();
        let detail = parse_err.to_string();
        let err: GuardError = parse_err.into();

        assert_eq!(err.to_string(), "failed to parse configuration file");
        let source = err.source().expect("parser error is the source");
        assert_eq!(source.to_string(), detail);
    }
}
