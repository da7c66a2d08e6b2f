//! Gemini `generateContent` client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::model::config::GeminiConfig;
use crate::model::{FinishReason, ModelResponse};
use crate::service::llm::{GenerationConfig, LlmError, TextGenerator};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for the Gemini REST API
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, config: &GeminiConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .user_agent(concat!("cve-summarizer/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: WireGenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    temperature: f32,
    candidate_count: u32,
    max_output_tokens: u32,
}

impl<'a> GenerateContentRequest<'a> {
    fn new(prompt: &'a str, config: &GenerationConfig) -> Self {
        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: WireGenerationConfig {
                temperature: config.temperature,
                candidate_count: config.candidate_count,
                max_output_tokens: config.max_output_tokens.get(),
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Message from a Gemini error envelope, or the raw body when it is not one
fn error_message(body: String) -> String {
    serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

impl From<GenerateContentResponse> for ModelResponse {
    fn from(resp: GenerateContentResponse) -> Self {
        let prompt_block_reason = resp.prompt_feedback.and_then(|f| f.block_reason);

        let Some(candidate) = resp.candidates.into_iter().next() else {
            return ModelResponse {
                finish_reason: None,
                text: None,
                prompt_block_reason,
            };
        };

        let text: Option<String> = candidate.content.and_then(|content| {
            let texts: Vec<String> = content
                .parts
                .into_iter()
                .filter(|part| !part.thought)
                .filter_map(|part| part.text)
                .collect();
            (!texts.is_empty()).then(|| texts.concat())
        });

        ModelResponse {
            // Non-streamed responses omit the reason only on normal completion
            finish_reason: Some(
                candidate
                    .finish_reason
                    .as_deref()
                    .map(FinishReason::from_code)
                    .unwrap_or(FinishReason::Stop),
            ),
            text,
            prompt_block_reason,
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<ModelResponse, LlmError> {
        let url = self.endpoint();

        tracing::debug!(
            model = %self.model,
            max_output_tokens = config.max_output_tokens.get(),
            prompt_len = prompt.len(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&GenerateContentRequest::new(prompt, config))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = match response.text().await {
                Ok(body) => error_message(body),
                Err(e) => format!("failed to read error body: {}", e),
            };
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            LlmError::ParseError(format!("Failed to deserialize generateContent response: {}", e))
        })?;

        let model_response = ModelResponse::from(body);

        tracing::debug!(
            finish_reason = ?model_response.finish_reason,
            text_len = model_response.text.as_ref().map(String::len),
            "Received generateContent response"
        );

        Ok(model_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MaxOutputTokens;
    use serde_json::json;

    fn decode(value: serde_json::Value) -> ModelResponse {
        serde_json::from_value::<GenerateContentResponse>(value)
            .unwrap()
            .into()
    }

    #[test]
    fn test_request_body_shape() {
        let config = GenerationConfig::deterministic(MaxOutputTokens::try_from(4096).unwrap());
        let body = serde_json::to_value(GenerateContentRequest::new("hello", &config)).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{"role": "user", "parts": [{"text": "hello"}]}],
                "generationConfig": {
                    "temperature": 0.0,
                    "candidateCount": 1,
                    "maxOutputTokens": 4096
                }
            })
        );
    }

    #[test]
    fn test_endpoint_joins_model() {
        let config = GeminiConfig {
            model: "models/gemini-2.5-pro".to_string(),
            base_url: "https://example.test/v1beta/".to_string(),
        };
        let client = GeminiClient::new("key", &config).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-2.5-pro:generateContent"
        );
        assert_eq!(client.model(), "models/gemini-2.5-pro");
    }

    #[test]
    fn test_decode_completed_skips_thoughts() {
        let resp = decode(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "planning...", "thought": true},
                    {"text": "```json\n{"},
                    {"text": "}\n```"}
                ]},
                "finishReason": "STOP"
            }]
        }));
        assert_eq!(resp.finish_reason, Some(FinishReason::Stop));
        assert_eq!(resp.text.as_deref(), Some("```json\n{}\n```"));
    }

    #[test]
    fn test_decode_recitation_without_content() {
        let resp = decode(json!({
            "candidates": [{"finishReason": "RECITATION"}]
        }));
        assert_eq!(resp.finish_reason, Some(FinishReason::Recitation));
        assert_eq!(resp.text, None);
    }

    #[test]
    fn test_decode_prompt_blocked() {
        let resp = decode(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }));
        assert_eq!(resp.finish_reason, None);
        assert_eq!(resp.prompt_block_reason.as_deref(), Some("SAFETY"));
    }

    #[test]
    fn test_decode_candidate_without_parts() {
        let resp = decode(json!({
            "candidates": [{"content": {"role": "model"}, "finishReason": "STOP"}]
        }));
        assert_eq!(resp.finish_reason, Some(FinishReason::Stop));
        assert_eq!(resp.text, None);
    }

    #[test]
    fn test_error_message_from_envelope() {
        let body = json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }
        })
        .to_string();
        assert_eq!(
            error_message(body),
            "API key not valid. Please pass a valid API key."
        );
    }

    #[test]
    fn test_error_message_falls_back_to_body() {
        assert_eq!(
            error_message("<html>502 Bad Gateway</html>".to_string()),
            "<html>502 Bad Gateway</html>"
        );
        assert_eq!(error_message(String::new()), "");
    }

    #[tokio::test]
    #[ignore] // Requires network access and GOOGLE_API_KEY
    async fn test_generate_live() {
        let api_key = std::env::var("GOOGLE_API_KEY").unwrap();
        let client = GeminiClient::new(&api_key, &GeminiConfig::default()).unwrap();
        let config = GenerationConfig::deterministic(MaxOutputTokens::try_from(200).unwrap());
        let resp = client.generate("Reply with {}", &config).await.unwrap();
        assert!(resp.finish_reason.is_some());
    }
}
