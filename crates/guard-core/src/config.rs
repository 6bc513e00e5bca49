use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GuardError;
use crate::Result;

/// Default configuration file name, looked up at the repository root.
pub const CONFIG_FILE: &str = ".ai-git-guard.toml";

/// Environment variable holding the Gemini API credential.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Top-level configuration loaded from `.ai-git-guard.toml`.
///
/// Resolution order: environment > `.env` > config file > defaults. The
/// `.env` file is folded into the process environment by the binary before
/// the config is built, so this type only sees the environment.
///
/// # Examples
///
/// ```
/// use guard_core::GuardConfig;
///
/// let config = GuardConfig::default();
/// assert_eq!(config.llm.model, "gemini-1.5-flash");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Remote model settings.
    #[serde(default)]
    pub llm: LlmConfig,
}

impl GuardConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Io`] if the file cannot be read, or
    /// [`GuardError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use guard_core::GuardConfig;
    /// use std::path::Path;
    ///
    /// let config = GuardConfig::from_file(Path::new(".ai-git-guard.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use guard_core::GuardConfig;
    ///
    /// let toml = r#"
    /// [llm]
    /// timeout_secs = 15
    /// "#;
    /// let config = GuardConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.llm.timeout_secs, 15);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load the explicit config file if given, else `.ai-git-guard.toml`
    /// from `dir` when present, else defaults.
    ///
    /// # Errors
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file is not.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(GuardError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                Self::from_file(path)
            }
            None => {
                let default_path = dir.join(CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Remote model configuration.
///
/// # Examples
///
/// ```
/// use guard_core::LlmConfig;
///
/// let config = LlmConfig::default();
/// assert_eq!(config.base_url, "https://generativelanguage.googleapis.com");
/// assert_eq!(config.timeout_secs, 60);
/// assert!(config.api_key.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// API key. The `GEMINI_API_KEY` environment variable takes precedence.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL of the generative language API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Upper bound on the single model request, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gemini-1.5-flash".into()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl LlmConfig {
    /// Fill `api_key` from `GEMINI_API_KEY`, then fail if no usable key remains.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Config`] when neither the environment nor the
    /// config file supplies a non-empty key.
    pub fn resolve_api_key(&mut self) -> Result<&str> {
        self.resolve_api_key_with(std::env::var(API_KEY_ENV).ok())
    }

    /// Same as [`LlmConfig::resolve_api_key`] with the environment value
    /// passed in explicitly.
    ///
    /// # Examples
    ///
    /// ```
    /// use guard_core::LlmConfig;
    ///
    /// let mut config = LlmConfig::default();
    /// assert!(config.resolve_api_key_with(None).is_err());
    /// assert_eq!(config.resolve_api_key_with(Some("k".into())).unwrap(), "k");
    /// ```
    pub fn resolve_api_key_with(&mut self, env_value: Option<String>) -> Result<&str> {
        if let Some(key) = env_value.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(GuardError::Config(format!(
                "Gemini API key not found: set {API_KEY_ENV} in the environment or a .env file"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = GuardConfig::default();
        assert_eq!(config.llm.model, "gemini-1.5-flash");
        assert_eq!(config.llm.timeout_secs, 60);
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[llm]
model = "gemini-1.5-pro"
api_key = "from-file"
base_url = "http://localhost:8080"
timeout_secs = 5
"#;
        let config = GuardConfig::from_toml(toml).unwrap();
        assert_eq!(config.llm.model, "gemini-1.5-pro");
        assert_eq!(config.llm.api_key.as_deref(), Some("from-file"));
        assert_eq!(config.llm.base_url, "http://localhost:8080");
        assert_eq!(config.llm.timeout_secs, 5);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = GuardConfig::from_toml("").unwrap();
        assert_eq!(config.llm.model, "gemini-1.5-flash");
    }

    #[test]
    fn invalid_toml_returns_error() {
        assert!(GuardConfig::from_toml("{{invalid}}").is_err());
    }

    #[test]
    fn env_key_overrides_file_key() {
        let mut llm = LlmConfig {
            api_key: Some("from-file".into()),
            ..LlmConfig::default()
        };
        let key = llm.resolve_api_key_with(Some("from-env".into())).unwrap();
        assert_eq!(key, "from-env");
    }

    #[test]
    fn file_key_used_when_env_missing() {
        let mut llm = LlmConfig {
            api_key: Some("from-file".into()),
            ..LlmConfig::default()
        };
        assert_eq!(llm.resolve_api_key_with(None).unwrap(), "from-file");
    }

    #[test]
    fn blank_keys_count_as_missing() {
        let mut llm = LlmConfig {
            api_key: Some("  ".into()),
            ..LlmConfig::default()
        };
        let err = llm.resolve_api_key_with(Some(String::new())).unwrap_err();
        assert!(matches!(err, GuardError::Config(_)));
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn load_falls_back_to_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = GuardConfig::load(None, dir.path()).unwrap();
        assert_eq!(config.llm.model, "gemini-1.5-flash");
    }

    #[test]
    fn load_reads_default_file_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[llm]\ntimeout_secs = 9\n").unwrap();
        let config = GuardConfig::load(None, dir.path()).unwrap();
        assert_eq!(config.llm.timeout_secs, 9);
    }

    #[test]
    fn load_rejects_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(GuardConfig::load(Some(&missing), dir.path()).is_err());
    }
}
