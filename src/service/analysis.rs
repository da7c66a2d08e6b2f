//! CVE analysis flow
//!
//! One call to `analyze` is one form submission: validate input, check the
//! credential, build the prompt, make a single model call and interpret the
//! answer. There is no retry at any step.

use std::sync::Arc;

use crate::model::{AnalysisOutcome, AnalysisRequest};
use crate::service::interpreter::interpret;
use crate::service::llm::{GenerationConfig, TextGenerator};
use crate::service::prompts::build_analysis_prompt;

/// Service running CVE analyses against a text generator
#[derive(Clone)]
pub struct AnalysisService {
    /// `None` when no credential was configured at startup
    generator: Option<Arc<dyn TextGenerator>>,
}

impl AnalysisService {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    /// Model used for analyses, if configured
    pub fn model(&self) -> Option<&str> {
        self.generator.as_deref().map(|g| g.model())
    }

    /// Run one analysis
    ///
    /// Input problems and a missing credential are reported without touching
    /// the network.
    pub async fn analyze(&self, identifier: &str, max_output_tokens: u32) -> AnalysisOutcome {
        let request = match AnalysisRequest::new(identifier, max_output_tokens) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(error = %e, "Rejected analysis request");
                return AnalysisOutcome::invalid_request(&e);
            }
        };

        let Some(generator) = self.generator.as_ref() else {
            tracing::warn!(cve = %request.identifier(), "Analysis requested without a configured credential");
            return AnalysisOutcome::missing_credential();
        };

        tracing::info!(
            cve = %request.identifier(),
            model = %generator.model(),
            max_output_tokens = request.max_output_tokens().get(),
            "Analyzing CVE"
        );

        let prompt = build_analysis_prompt(request.identifier());
        let config = GenerationConfig::deterministic(request.max_output_tokens());

        let outcome = match generator.generate(&prompt, &config).await {
            Ok(response) => interpret(response),
            Err(e) => {
                tracing::error!(cve = %request.identifier(), error = %e, "Model call failed");
                AnalysisOutcome::api_error(e)
            }
        };

        tracing::info!(
            cve = %request.identifier(),
            status = outcome.status(),
            "Analysis complete"
        );

        outcome
    }
}
