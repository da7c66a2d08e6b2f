//! REST API endpoint for CVE analysis

use actix_web::{HttpResponse, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::api::error::{ApiError, ErrorResponse};
use crate::app::AppState;
use crate::model::{AnalysisOutcome, BlockReason, Reference, VulnerabilityReport};
use crate::service::render::{Block, render_outcome};

/// Analysis request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    /// CVE identifier, e.g. CVE-2023-4863 (format is not checked)
    pub cve_id: String,
    /// Output token cap in [200, 4096]; defaults to the form default
    pub max_output_tokens: Option<u32>,
}

/// Analysis result
#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyzeResponse {
    pub model: Option<String>,
    pub analyzed_at: DateTime<Utc>,
    pub outcome: AnalysisOutcome,
    /// The outcome as display blocks, in page order
    pub blocks: Vec<Block>,
}

/// Analyze a CVE with the configured model
///
/// Blocked and unparsable model answers are successful calls; their status is
/// carried in `outcome.status`.
#[utoipa::path(
    post,
    path = "/v1/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Analysis finished (displayed, blocked, empty or parse error)", body = AnalyzeResponse),
        (status = 400, description = "Empty identifier or token cap out of range", body = ErrorResponse),
        (status = 502, description = "Model call failed", body = ErrorResponse),
        (status = 503, description = "GOOGLE_API_KEY not configured", body = ErrorResponse)
    ),
    tag = "analysis"
)]
#[post("/v1/analyze")]
pub async fn analyze(
    state: web::Data<AppState>,
    body: web::Json<AnalyzeRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let max_output_tokens = body
        .max_output_tokens
        .unwrap_or(state.default_max_output_tokens);

    let service = &state.analysis_service;
    let outcome = service.analyze(&body.cve_id, max_output_tokens).await;

    if let Some(err) = ApiError::from_outcome(&outcome) {
        return Err(err);
    }

    Ok(HttpResponse::Ok().json(AnalyzeResponse {
        model: service.model().map(str::to_string),
        analyzed_at: Utc::now(),
        blocks: render_outcome(&outcome),
        outcome,
    }))
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        analyze,
        crate::api::health::liveness,
        crate::api::health::readiness
    ),
    components(schemas(
        AnalyzeRequest,
        AnalyzeResponse,
        AnalysisOutcome,
        BlockReason,
        VulnerabilityReport,
        Reference,
        Block,
        ErrorResponse,
        crate::api::health::HealthStatus,
        crate::api::health::ReadinessStatus,
        crate::api::health::DependencyHealth
    )),
    tags(
        (name = "analysis", description = "CVE analysis backed by Gemini"),
        (name = "health", description = "Liveness and readiness checks")
    )
)]
pub struct ApiDoc;

/// Configure analysis routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(analyze);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelResponse;
    use crate::service::TextGenerator;
    use crate::service::analysis::tests::StubGenerator;
    use crate::service::llm::LlmError;
    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn state(stub: Option<Arc<StubGenerator>>) -> web::Data<AppState> {
        let generator = stub.map(|s| s as Arc<dyn TextGenerator>);
        web::Data::new(AppState::with_generator(generator, 1500))
    }

    #[actix_web::test]
    async fn test_analyze_displayed() {
        let stub = StubGenerator::replying(
            "```json\n{\"summary\":\"x\",\"references\":[{\"title\":\"t\",\"url\":\"u\"}]}\n```",
        );
        let app = test::init_service(
            App::new()
                .app_data(state(Some(stub.clone())))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/v1/analyze")
            .set_json(json!({"cve_id": "CVE-2023-4863"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["model"], "models/stub");
        assert_eq!(body["outcome"]["status"], "displayed");
        assert_eq!(body["outcome"]["report"]["summary"], "x");
        assert_eq!(body["outcome"]["report"]["impact"], Value::Null);
        assert!(
            body["blocks"]
                .as_array()
                .unwrap()
                .contains(&json!({"type": "link", "title": "t", "url": "u"}))
        );

        let calls = stub.calls.lock().unwrap();
        assert_eq!(calls[0].1.max_output_tokens.get(), 1500);
    }

    #[actix_web::test]
    async fn test_analyze_blank_identifier_is_bad_request() {
        let stub = StubGenerator::replying("{}");
        let app = test::init_service(
            App::new()
                .app_data(state(Some(stub.clone())))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/v1/analyze")
            .set_json(json!({"cve_id": "  ", "max_output_tokens": 4096}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(stub.call_count(), 0);
    }

    #[actix_web::test]
    async fn test_analyze_without_credential() {
        let app =
            test::init_service(App::new().app_data(state(None)).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/v1/analyze")
            .set_json(json!({"cve_id": "CVE-2023-4863"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "not_configured");
        assert!(body["message"].as_str().unwrap().contains("GOOGLE_API_KEY"));
    }

    #[actix_web::test]
    async fn test_analyze_upstream_failure() {
        let stub = StubGenerator::with(|| Err(LlmError::ParseError("truncated body".to_string())));
        let app = test::init_service(
            App::new()
                .app_data(state(Some(stub)))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/v1/analyze")
            .set_json(json!({"cve_id": "CVE-2023-4863"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[actix_web::test]
    async fn test_analyze_recitation_is_ok_with_status() {
        let stub = StubGenerator::with(|| Ok(ModelResponse::stopped("RECITATION")));
        let app = test::init_service(
            App::new()
                .app_data(state(Some(stub)))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/v1/analyze")
            .set_json(json!({"cve_id": "CVE-2023-4863"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["outcome"]["status"], "blocked");
        assert_eq!(body["outcome"]["reason"]["kind"], "recitation");
    }
}
