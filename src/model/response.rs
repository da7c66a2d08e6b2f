//! Provider-neutral view of a generation response

/// Why the model stopped producing output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    /// Normal completion
    Stop,
    /// Output matched existing material too closely (copyright/originality filter)
    Recitation,
    /// Content-policy block; carries the provider's reason code
    Safety(String),
    /// Any other non-completion (token cap, unspecified, unknown codes)
    Other(String),
}

/// Reason codes treated as safety blocks
const SAFETY_CODES: &[&str] = &[
    "SAFETY",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
    "IMAGE_SAFETY",
];

impl FinishReason {
    pub fn from_code(code: &str) -> Self {
        match code {
            "STOP" => FinishReason::Stop,
            "RECITATION" => FinishReason::Recitation,
            c if SAFETY_CODES.contains(&c) => FinishReason::Safety(c.to_string()),
            c => FinishReason::Other(c.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            FinishReason::Stop => "STOP",
            FinishReason::Recitation => "RECITATION",
            FinishReason::Safety(code) | FinishReason::Other(code) => code,
        }
    }
}

/// Response returned by a `TextGenerator`
#[derive(Debug, Clone, Default)]
pub struct ModelResponse {
    /// Finish reason of the first candidate; `None` when no candidate came back
    pub finish_reason: Option<FinishReason>,
    /// Concatenated text of the first candidate
    pub text: Option<String>,
    /// Set when the prompt itself was rejected before generation
    pub prompt_block_reason: Option<String>,
}

#[cfg(test)]
impl ModelResponse {
    /// A normally completed response carrying `text`
    pub fn completed(text: impl Into<String>) -> Self {
        Self {
            finish_reason: Some(FinishReason::Stop),
            text: Some(text.into()),
            prompt_block_reason: None,
        }
    }

    /// A response whose candidate stopped for `code`
    pub fn stopped(code: &str) -> Self {
        Self {
            finish_reason: Some(FinishReason::from_code(code)),
            text: None,
            prompt_block_reason: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(FinishReason::from_code("STOP"), FinishReason::Stop);
        assert_eq!(FinishReason::from_code("RECITATION"), FinishReason::Recitation);
        assert_eq!(
            FinishReason::from_code("PROHIBITED_CONTENT"),
            FinishReason::Safety("PROHIBITED_CONTENT".to_string())
        );
        assert_eq!(
            FinishReason::from_code("MAX_TOKENS"),
            FinishReason::Other("MAX_TOKENS".to_string())
        );
    }

    #[test]
    fn test_code_roundtrips_name() {
        for code in ["STOP", "RECITATION", "SAFETY", "OTHER", "MAX_TOKENS"] {
            assert_eq!(FinishReason::from_code(code).code(), code);
        }
    }
}
