use crate::error::{Result, TransformError};
use crate::prompt::{load_prompt, DEFAULT_PROMPT};
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransformMode {
    /// OpenAI-compatible chat completions service
    Chat,
    /// Offline echo of the block, for dry runs and tests
    Stub,
}

impl TransformMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Stub => "stub",
        }
    }

    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "chat" => Ok(Self::Chat),
            "stub" => Ok(Self::Stub),
            other => Err(TransformError::config(format!(
                "Unsupported HEADERDOC_TRANSFORM_MODE '{other}' (expected 'chat' or 'stub')"
            ))),
        }
    }
}

/// Everything needed to construct a transformer. Built once per run and passed
/// down explicitly.
#[derive(Clone, Debug)]
pub struct TransformerConfig {
    pub mode: TransformMode,
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub prompt: String,
    /// Per-request timeout; `None` waits as long as the service does
    pub timeout: Option<Duration>,
}

impl Default for TransformerConfig {
    fn default() -> Self {
        Self {
            mode: TransformMode::Chat,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            timeout: None,
        }
    }
}

impl TransformerConfig {
    /// Load from the process environment.
    ///
    /// `HEADERDOC_*` names win over the legacy `MAKE_DOC_*` ones.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |primary: &str, legacy: Option<&str>| {
            lookup(primary)
                .or_else(|| legacy.and_then(|key| lookup(key)))
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();

        if let Some(raw) = var("HEADERDOC_TRANSFORM_MODE", None) {
            config.mode = TransformMode::parse(&raw)?;
        }
        if let Some(url) = var("HEADERDOC_API_URL", Some("MAKE_DOC_API_URL")) {
            config.base_url = url;
        }
        config.api_key = var("HEADERDOC_API_TOKEN", Some("MAKE_DOC_API_TOKEN"));
        if let Some(model) = var("HEADERDOC_MODEL", Some("MAKE_DOC_MODEL")) {
            config.model = model;
        }
        if let Some(path) = var("HEADERDOC_PROMPT_FILE", None) {
            config.prompt = load_prompt(path)?;
        }
        if let Some(raw) = var("HEADERDOC_TIMEOUT_SECS", None) {
            let secs = raw.parse::<u64>().map_err(|_| {
                TransformError::config(format!(
                    "HEADERDOC_TIMEOUT_SECS must be an integer, got '{raw}'"
                ))
            })?;
            config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.mode == TransformMode::Stub {
            return Ok(());
        }

        if self.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(TransformError::config(
                "chat mode needs an API token (HEADERDOC_API_TOKEN or MAKE_DOC_API_TOKEN)",
            ));
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(TransformError::config(format!(
                "API URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }

        if self.model.trim().is_empty() {
            return Err(TransformError::config("model must not be empty"));
        }

        Ok(())
    }
}
