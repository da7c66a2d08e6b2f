//! Terminal states of one form submission

use serde::Serialize;
use utoipa::ToSchema;

use crate::model::config::ENV_API_KEY;
use crate::model::{FinishReason, RequestError, VulnerabilityReport};

/// Why no parse was attempted on the model output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockReason {
    /// Copyright/originality filter
    Recitation,
    /// Content-policy filter with the provider's code
    Safety { code: String },
    /// Generation stopped without completing (token cap, unspecified, ...)
    Incomplete { code: String },
}

impl BlockReason {
    /// `None` for a normal completion
    pub fn from_finish_reason(reason: &FinishReason) -> Option<Self> {
        match reason {
            FinishReason::Stop => None,
            FinishReason::Recitation => Some(BlockReason::Recitation),
            FinishReason::Safety(code) => Some(BlockReason::Safety { code: code.clone() }),
            FinishReason::Other(code) => Some(BlockReason::Incomplete { code: code.clone() }),
        }
    }

    pub fn message(&self) -> String {
        match self {
            BlockReason::Recitation => "Error: the model's response was blocked for copyright (recitation) reasons. Try a different CVE.".to_string(),
            BlockReason::Safety { code } => {
                format!("Error: the model's response was blocked for safety reasons ({code}).")
            }
            BlockReason::Incomplete { code } => {
                format!("Error: the model stopped before completing its response ({code}).")
            }
        }
    }
}

/// Result of a submission; every variant is terminal
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// Input rejected before anything else happened
    InvalidRequest { message: String },
    /// No credential configured; no call attempted
    ConfigError { message: String },
    /// Transport or API failure during the call
    ApiError { message: String, detail: String },
    /// Model output withheld or cut short
    Blocked { reason: BlockReason, message: String },
    /// Normal completion without any text
    EmptyResponse { message: String, detail: String },
    /// Cleaned text is not a usable report
    ParseError {
        raw_text: String,
        message: String,
        detail: String,
    },
    Displayed {
        raw_text: String,
        report: VulnerabilityReport,
    },
}

impl AnalysisOutcome {
    pub fn invalid_request(err: &RequestError) -> Self {
        AnalysisOutcome::InvalidRequest {
            message: err.to_string(),
        }
    }

    pub fn missing_credential() -> Self {
        AnalysisOutcome::ConfigError {
            message: format!(
                "The {ENV_API_KEY} environment variable is not set. Set the API key before starting the app."
            ),
        }
    }

    pub fn api_error(detail: impl ToString) -> Self {
        let detail = detail.to_string();
        AnalysisOutcome::ApiError {
            message: format!("An error occurred while calling the API: {detail}"),
            detail,
        }
    }

    pub fn blocked(reason: BlockReason) -> Self {
        AnalysisOutcome::Blocked {
            message: reason.message(),
            reason,
        }
    }

    pub fn empty_response(detail: impl ToString) -> Self {
        let detail = detail.to_string();
        AnalysisOutcome::EmptyResponse {
            message: format!(
                "An error occurred while processing the model response. The response may be empty. (error: {detail})"
            ),
            detail,
        }
    }

    pub fn invalid_json(raw_text: String, detail: impl ToString) -> Self {
        AnalysisOutcome::ParseError {
            raw_text,
            message: "The model did not return valid JSON. Check the raw response.".to_string(),
            detail: detail.to_string(),
        }
    }

    pub fn unexpected_shape(raw_text: String, detail: impl ToString) -> Self {
        let detail = detail.to_string();
        AnalysisOutcome::ParseError {
            raw_text,
            message: format!("Error while parsing the result: {detail}"),
            detail,
        }
    }

    /// Short status name used in logs
    pub fn status(&self) -> &'static str {
        match self {
            AnalysisOutcome::InvalidRequest { .. } => "invalid_request",
            AnalysisOutcome::ConfigError { .. } => "config_error",
            AnalysisOutcome::ApiError { .. } => "api_error",
            AnalysisOutcome::Blocked { .. } => "blocked",
            AnalysisOutcome::EmptyResponse { .. } => "empty_response",
            AnalysisOutcome::ParseError { .. } => "parse_error",
            AnalysisOutcome::Displayed { .. } => "displayed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recitation_message_is_specific() {
        let msg = BlockReason::Recitation.message();
        assert!(msg.contains("copyright"));
        assert!(!msg.contains("safety"));
    }

    #[test]
    fn test_safety_message_embeds_code() {
        let reason = BlockReason::from_finish_reason(&FinishReason::from_code("BLOCKLIST")).unwrap();
        assert_eq!(
            reason.message(),
            "Error: the model's response was blocked for safety reasons (BLOCKLIST)."
        );
    }

    #[test]
    fn test_stop_is_not_blocked() {
        assert_eq!(BlockReason::from_finish_reason(&FinishReason::Stop), None);
    }

    #[test]
    fn test_serialized_status_tag() {
        let value = serde_json::to_value(AnalysisOutcome::missing_credential()).unwrap();
        assert_eq!(value["status"], "config_error");
        assert!(value["message"].as_str().unwrap().contains("GOOGLE_API_KEY"));

        let value =
            serde_json::to_value(AnalysisOutcome::blocked(BlockReason::Recitation)).unwrap();
        assert_eq!(value["status"], "blocked");
        assert_eq!(value["reason"]["kind"], "recitation");
    }
}
