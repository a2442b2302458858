//! docquery configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::documents::FailurePolicy;

/// Main docquery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Directory walked for documents
    #[serde(rename = "data-dir")]
    pub data_dir: PathBuf,

    /// JSON rules file holding the instructions
    #[serde(rename = "instructions-path")]
    pub instructions_path: PathBuf,

    /// Document loading behaviour
    pub documents: DocumentsConfig,

    /// LLM provider configuration
    pub llm: LlmConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: None,
            data_dir: PathBuf::from("data"),
            instructions_path: PathBuf::from("instructions.json"),
            documents: DocumentsConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration before starting a chat session
    ///
    /// Fails fast when the API key variable is not set.
    pub fn validate(&self) -> Result<()> {
        if std::env::var(&self.llm.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.llm.api_key_env
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        for candidate in Self::search_paths() {
            if candidate.exists() {
                match Self::load_from_file(&candidate) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", candidate.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is initialized
    ///
    /// Errors are swallowed here; the full load reports them later.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates = match config_path {
            Some(path) => vec![path.clone()],
            None => Self::search_paths(),
        };

        candidates
            .iter()
            .filter(|p| p.exists())
            .find_map(|p| Self::load_from_file(p).ok())
            .and_then(|c| c.log_level)
    }

    /// Project-local config first, then the user config
    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".docquery.yml")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("docquery").join("docquery.yml"));
        }
        paths
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        debug!(path = %path.as_ref().display(), "load_from_file: parsed");
        Ok(config)
    }
}

/// Document loading configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentsConfig {
    /// What to do with a document that cannot be read
    #[serde(rename = "on-error")]
    pub on_error: FailurePolicy,

    /// Write the loaded collection to `dump-path` during `chat`
    pub dump: bool,

    /// Destination of the JSON dump
    #[serde(rename = "dump-path")]
    pub dump_path: PathBuf,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            on_error: FailurePolicy::Abort,
            dump: false,
            dump_path: PathBuf::from("docs.json"),
        }
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response; left to the provider when unset
    #[serde(rename = "max-tokens")]
    pub max_tokens: Option<u32>,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Retries for transient failures (network, 408, 429, 5xx)
    #[serde(rename = "max-retries")]
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: "https://api.openai.com".to_string(),
            max_tokens: None,
            timeout_ms: 300_000,
            max_retries: 3,
        }
    }
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env).map_err(|_| eyre::eyre!("Environment variable {} is not set", self.api_key_env))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.instructions_path, PathBuf::from("instructions.json"));
        assert_eq!(config.documents.on_error, FailurePolicy::Abort);
        assert!(!config.documents.dump);
        assert_eq!(config.documents.dump_path, PathBuf::from("docs.json"));
    }

    #[test]
    fn test_llm_config_defaults() {
        let config = LlmConfig::default();

        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.base_url, "https://api.openai.com");
        assert_eq!(config.max_tokens, None);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
log-level: debug
data-dir: /srv/volumes
instructions-path: rules.json

documents:
  on-error: skip
  dump: true
  dump-path: out/docs.json

llm:
  model: gpt-4o-mini
  api-key-env: MY_API_KEY
  base-url: https://llm.example.com
  max-tokens: 2048
  timeout-ms: 60000
  max-retries: 1
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.data_dir, PathBuf::from("/srv/volumes"));
        assert_eq!(config.instructions_path, PathBuf::from("rules.json"));
        assert_eq!(config.documents.on_error, FailurePolicy::Skip);
        assert!(config.documents.dump);
        assert_eq!(config.documents.dump_path, PathBuf::from("out/docs.json"));
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.api_key_env, "MY_API_KEY");
        assert_eq!(config.llm.max_tokens, Some(2048));
        assert_eq!(config.llm.max_retries, 1);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  model: gpt-4.1
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // Specified value
        assert_eq!(config.llm.model, "gpt-4.1");

        // Defaults for unspecified
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.documents.on_error, FailurePolicy::Abort);
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("dq.yml");
        fs::write(&path, "log-level: WARN\ndata-dir: notes\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("notes"));
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("WARN"));
    }

    #[test]
    fn test_load_explicit_path_missing_is_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("absent.yml");

        assert!(Config::load(Some(&path)).is_err());
        assert_eq!(Config::load_log_level(Some(&path)), None);
    }

    #[test]
    #[serial]
    fn test_validate_requires_api_key() {
        let mut config = Config::default();
        config.llm.api_key_env = "DQ_TEST_VALIDATE_KEY".to_string();

        // SAFETY: serialized with the other env-mutating tests
        unsafe { std::env::remove_var("DQ_TEST_VALIDATE_KEY") };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("DQ_TEST_VALIDATE_KEY"));

        unsafe { std::env::set_var("DQ_TEST_VALIDATE_KEY", "sk-test") };
        assert!(config.validate().is_ok());
        assert_eq!(config.llm.get_api_key().unwrap(), "sk-test");
        unsafe { std::env::remove_var("DQ_TEST_VALIDATE_KEY") };
    }
}
