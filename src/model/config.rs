use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::model::request::{MAX_OUTPUT_TOKENS_MAX, MAX_OUTPUT_TOKENS_MIN};

const ENV_CONFIG_PATH: &str = "CVE_SUMMARIZER_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Credential for the generation API. Read once at startup and never refreshed.
pub const ENV_API_KEY: &str = "GOOGLE_API_KEY";
const ENV_GEMINI_MODEL: &str = "GEMINI_MODEL";
const ENV_GEMINI_BASE_URL: &str = "GEMINI_BASE_URL";

pub const DEFAULT_MODEL: &str = "models/gemini-2.5-pro";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1500;

/// Generation endpoint settings
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
        }
    }
}

/// Form defaults
#[derive(Debug, Clone, Deserialize)]
pub struct FormConfig {
    /// Initial slider position
    #[serde(default = "default_max_output_tokens")]
    pub default_max_output_tokens: u32,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            default_max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_max_output_tokens() -> u32 {
    DEFAULT_MAX_OUTPUT_TOKENS
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub form: FormConfig,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,
    /// `None` when the variable is unset or empty
    pub api_key: Option<String>,
    pub gemini: GeminiConfig,
    pub form: FormConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            api_key: None,
            gemini: GeminiConfig::default(),
            form: FormConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let api_key = std::env::var(ENV_API_KEY)
            .ok()
            .filter(|key| !key.trim().is_empty());

        let config_path = std::env::var(ENV_CONFIG_PATH)
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let file = Self::load_config_file(&config_path).unwrap_or_default();

        let mut gemini = file.gemini;
        if let Ok(model) = std::env::var(ENV_GEMINI_MODEL) {
            gemini.model = model;
        }
        if let Ok(base_url) = std::env::var(ENV_GEMINI_BASE_URL) {
            gemini.base_url = base_url;
        }

        let mut form = file.form;
        form.default_max_output_tokens = form
            .default_max_output_tokens
            .clamp(MAX_OUTPUT_TOKENS_MIN, MAX_OUTPUT_TOKENS_MAX);

        Self {
            port,
            host,
            api_key,
            gemini,
            form,
        }
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => Self::parse_config(path, &contents),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }

    fn parse_config(path: &Path, contents: &str) -> Option<ConfigFile> {
        let contents = contents.trim();
        if contents.is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Some(ConfigFile::default());
        }

        match serde_yaml::from_str(contents) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "Loaded configuration from file");
                Some(config)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                None
            }
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}
