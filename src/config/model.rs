// src/config/model.rs
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

use crate::error::AnalysisError;

pub const DEFAULT_MODEL_CONFIG_PATH: &str = "config/model.json";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_api_key() -> String {
    "ENV".to_string()
}
fn default_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// "gemini" | "mock" (case-insensitive)
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// "ENV" means: read from GEMINI_API_KEY
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key: default_api_key(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ModelConfig {
    /// Read the file if present; a missing file means defaults (key from env).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let mut cfg: ModelConfig = if path.exists() {
            let data = fs::read_to_string(path)?;
            serde_json::from_str(&data)?
        } else {
            ModelConfig::default()
        };

        cfg.provider = cfg.provider.trim().to_lowercase();
        if cfg.timeout_secs == 0 {
            cfg.timeout_secs = default_timeout_secs();
        }
        Ok(cfg)
    }

    /// Resolve the credential. Fails before any network call when it is
    /// missing or obviously malformed.
    pub fn resolve_api_key(&self) -> Result<String, AnalysisError> {
        let raw = if self.api_key.trim().eq_ignore_ascii_case("env") {
            env::var(ENV_GEMINI_API_KEY).unwrap_or_default()
        } else {
            self.api_key.clone()
        };
        let key = raw.trim();
        let malformed = key.is_empty() || key.chars().any(char::is_whitespace) || key.len() < 8;
        if malformed {
            return Err(AnalysisError::Configuration {
                missing: ENV_GEMINI_API_KEY.to_string(),
            });
        }
        Ok(key.to_string())
    }
}
