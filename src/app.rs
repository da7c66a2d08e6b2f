//! Application state and service initialization
//!
//! This module centralizes service initialization so handlers and tests can
//! share the same wiring.

use std::sync::Arc;

use crate::model::Config;
use crate::service::{AnalysisService, GeminiClient, TextGenerator};

/// Application state shared with Actix-web handlers
pub struct AppState {
    /// Analysis flow (unconfigured when the credential is missing)
    pub analysis_service: AnalysisService,
    /// Initial slider position for the form
    pub default_max_output_tokens: u32,
}

impl AppState {
    /// Build application state from configuration
    ///
    /// A missing credential is not a startup failure: the app still serves the
    /// form and reports the configuration error on each submission.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let generator: Option<Arc<dyn TextGenerator>> = match config.api_key.as_deref() {
            Some(api_key) => {
                let client = GeminiClient::new(api_key, &config.gemini)
                    .map_err(|e| AppError::HttpClientInit(e.to_string()))?;
                tracing::info!(model = %config.gemini.model, "Gemini client initialized");
                Some(Arc::new(client))
            }
            None => {
                tracing::warn!(
                    "{} is not set; analyses will report a configuration error",
                    crate::model::config::ENV_API_KEY
                );
                None
            }
        };

        Ok(Self::with_generator(
            generator,
            config.form.default_max_output_tokens,
        ))
    }

    /// Build application state around an existing generator
    pub fn with_generator(
        generator: Option<Arc<dyn TextGenerator>>,
        default_max_output_tokens: u32,
    ) -> Self {
        Self {
            analysis_service: AnalysisService::new(generator),
            default_max_output_tokens,
        }
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// HTTP client could not be built
    #[error("HTTP client initialization failed: {0}")]
    HttpClientInit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_still_starts() {
        let state = AppState::new(&Config::default()).unwrap();
        assert!(!state.analysis_service.is_configured());
        assert_eq!(state.default_max_output_tokens, 1500);
    }

    #[test]
    fn test_credential_configures_gemini() {
        let config = Config {
            api_key: Some("test-key".to_string()),
            ..Config::default()
        };
        let state = AppState::new(&config).unwrap();
        assert_eq!(
            state.analysis_service.model(),
            Some("models/gemini-2.5-pro")
        );
    }
}
