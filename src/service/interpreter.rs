//! Turns a raw model response into a terminal outcome
//!
//! Order of checks:
//! 1. a non-normal finish (or a rejected prompt) is reported and nothing is parsed
//! 2. a response without text is reported as empty
//! 3. the text is unwrapped from an optional "```json" fence and parsed as JSON
//! 4. the JSON must be an object; its keys populate the report

use crate::model::{AnalysisOutcome, BlockReason, FinishReason, ModelResponse, VulnerabilityReport};

/// Literal opening fence stripped from model output
pub const FENCE_OPEN: &str = "```json";
/// Literal closing fence stripped from model output
pub const FENCE_CLOSE: &str = "```";

/// Trim whitespace and a literal "```json" ... "```" wrapper
///
/// Only the exact markers are removed. A fence with another language tag, or
/// text outside the fence, is left in place and will fail to parse.
pub fn clean_model_text(raw: &str) -> &str {
    let text = raw.trim();
    let text = text.strip_prefix(FENCE_OPEN).unwrap_or(text);
    let text = text.strip_suffix(FENCE_CLOSE).unwrap_or(text);
    text.trim()
}

pub fn interpret(response: ModelResponse) -> AnalysisOutcome {
    let finish_reason = match response.finish_reason {
        Some(reason) => reason,
        None => {
            return match response.prompt_block_reason {
                Some(code) => AnalysisOutcome::blocked(BlockReason::Safety { code }),
                None => AnalysisOutcome::empty_response("the model returned no candidates"),
            };
        }
    };

    if let Some(reason) = BlockReason::from_finish_reason(&finish_reason) {
        tracing::warn!(finish_reason = %finish_reason.code(), "Model response blocked");
        return AnalysisOutcome::blocked(reason);
    }
    debug_assert_eq!(finish_reason, FinishReason::Stop);

    let Some(raw) = response.text else {
        tracing::warn!("Model completed without text");
        return AnalysisOutcome::empty_response("the candidate contains no text parts");
    };

    let cleaned = clean_model_text(&raw).to_string();

    let value: serde_json::Value = match serde_json::from_str(&cleaned) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, text_len = cleaned.len(), "Model output is not valid JSON");
            return AnalysisOutcome::invalid_json(cleaned, e);
        }
    };

    match VulnerabilityReport::try_from(value) {
        Ok(report) => AnalysisOutcome::Displayed {
            raw_text: cleaned,
            report,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Model JSON has an unexpected shape");
            AnalysisOutcome::unexpected_shape(cleaned, e)
        }
    }
}
