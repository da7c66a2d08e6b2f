//! Validated analysis request

pub const MAX_OUTPUT_TOKENS_MIN: u32 = 200;
pub const MAX_OUTPUT_TOKENS_MAX: u32 = 4096;
/// Slider granularity on the form
pub const MAX_OUTPUT_TOKENS_STEP: u32 = 50;

/// Error type for request validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("Enter a CVE ID first.")]
    EmptyIdentifier,

    #[error(
        "Maximum response tokens must be between {MAX_OUTPUT_TOKENS_MIN} and {MAX_OUTPUT_TOKENS_MAX} (got {0})."
    )]
    TokensOutOfRange(u32),

    #[error("Maximum response tokens must be a whole number (got \"{0}\").")]
    TokensNotANumber(String),
}

/// Token cap as submitted by a form field; blank means `default`
///
/// Only the number format is checked here, the range is checked by `AnalysisRequest::new`.
pub fn parse_max_output_tokens(raw: Option<&str>, default: u32) -> Result<u32, RequestError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| RequestError::TokensNotANumber(value.to_string())),
    }
}

/// Output token cap, always within [200, 4096]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxOutputTokens(u32);

impl MaxOutputTokens {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for MaxOutputTokens {
    type Error = RequestError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if (MAX_OUTPUT_TOKENS_MIN..=MAX_OUTPUT_TOKENS_MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RequestError::TokensOutOfRange(value))
        }
    }
}

/// One submission of the form
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    identifier: String,
    max_output_tokens: MaxOutputTokens,
}

impl AnalysisRequest {
    /// The identifier is trimmed; its format is not checked.
    pub fn new(identifier: &str, max_output_tokens: u32) -> Result<Self, RequestError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(RequestError::EmptyIdentifier);
        }

        Ok(Self {
            identifier: identifier.to_string(),
            max_output_tokens: MaxOutputTokens::try_from(max_output_tokens)?,
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn max_output_tokens(&self) -> MaxOutputTokens {
        self.max_output_tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_identifier_rejected() {
        assert_eq!(
            AnalysisRequest::new("", 1500).unwrap_err(),
            RequestError::EmptyIdentifier
        );
        assert_eq!(
            AnalysisRequest::new("  \t\n", 1500).unwrap_err(),
            RequestError::EmptyIdentifier
        );
    }

    #[test]
    fn test_identifier_not_format_checked() {
        let request = AnalysisRequest::new("  log4shell please ", 1500).unwrap();
        assert_eq!(request.identifier(), "log4shell please");
    }

    #[test]
    fn test_token_bounds() {
        assert_eq!(MaxOutputTokens::try_from(200).unwrap().get(), 200);
        assert_eq!(MaxOutputTokens::try_from(4096).unwrap().get(), 4096);
        assert_eq!(
            MaxOutputTokens::try_from(199).unwrap_err(),
            RequestError::TokensOutOfRange(199)
        );
        assert_eq!(
            MaxOutputTokens::try_from(4097).unwrap_err(),
            RequestError::TokensOutOfRange(4097)
        );
    }

    #[test]
    fn test_parse_form_tokens() {
        assert_eq!(parse_max_output_tokens(None, 1500), Ok(1500));
        assert_eq!(parse_max_output_tokens(Some(" "), 1500), Ok(1500));
        assert_eq!(parse_max_output_tokens(Some("4096"), 1500), Ok(4096));
        assert_eq!(
            parse_max_output_tokens(Some("lots"), 1500),
            Err(RequestError::TokensNotANumber("lots".to_string()))
        );
        assert_eq!(
            parse_max_output_tokens(Some("-5"), 1500),
            Err(RequestError::TokensNotANumber("-5".to_string()))
        );
    }

    #[test]
    fn test_empty_identifier_checked_before_tokens() {
        assert_eq!(
            AnalysisRequest::new(" ", 0).unwrap_err(),
            RequestError::EmptyIdentifier
        );
    }
}
