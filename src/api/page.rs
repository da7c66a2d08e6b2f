//! Single-page HTML form
//!
//! `GET /` shows the form; `POST /` runs one analysis and shows the form again
//! (with the submitted values) followed by the result blocks.

use std::fmt::{self, Write};

use actix_web::{HttpResponse, Responder, get, post, web};
use serde::Deserialize;
use url::Url;

use crate::app::AppState;
use crate::model::AnalysisOutcome;
use crate::model::request::{
    MAX_OUTPUT_TOKENS_MAX, MAX_OUTPUT_TOKENS_MIN, MAX_OUTPUT_TOKENS_STEP, parse_max_output_tokens,
};
use crate::service::render::{Block, render_outcome};

const PAGE_TITLE: &str = "Simple CVE Summarizer";
const HEADING: &str = "📝 Gemini-based CVE summarizer";
const CAPTION: &str =
    "Enter a CVE ID and Gemini will look up and summarize information about the vulnerability.";

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 46rem; margin: 2rem auto; padding: 0 1rem; color: #1f2328; }
.caption { color: #656d76; }
form { display: grid; gap: 0.6rem; margin-bottom: 1.5rem; }
input[type=text] { padding: 0.45rem; font-size: 1rem; }
button { width: fit-content; padding: 0.45rem 1rem; font-size: 1rem; }
.busy { color: #0969da; }
.warning { background: #fff8c5; padding: 0.6rem 0.8rem; border-radius: 6px; }
.error { background: #ffebe9; padding: 0.6rem 0.8rem; border-radius: 6px; white-space: pre-wrap; }
pre { background: #f6f8fa; padding: 0.8rem; overflow-x: auto; border-radius: 6px; }
.field { white-space: pre-wrap; }
"#;

const SCRIPT: &str = r#"
const form = document.getElementById('analyze-form');
const slider = document.getElementById('max_output_tokens');
slider.addEventListener('input', () => {
  document.getElementById('tokens-value').textContent = slider.value;
});
form.addEventListener('submit', () => {
  const id = document.getElementById('cve_id').value.trim();
  if (!id) { return; }
  const busy = document.getElementById('busy');
  busy.textContent = `Analyzing ${id} with Gemini...`;
  busy.hidden = false;
  document.getElementById('submit').disabled = true;
});
"#;

/// Form fields
///
/// The token cap is taken as text so a malformed value is reported on the page.
#[derive(Debug, Deserialize)]
pub struct AnalyzeForm {
    #[serde(default)]
    pub cve_id: String,
    pub max_output_tokens: Option<String>,
}

#[get("/")]
pub async fn index(state: web::Data<AppState>) -> impl Responder {
    html_response(render_page("", state.default_max_output_tokens, &[]))
}

#[post("/")]
pub async fn submit(state: web::Data<AppState>, form: web::Form<AnalyzeForm>) -> impl Responder {
    let form = form.into_inner();
    let default = state.default_max_output_tokens;

    let (outcome, slider_value) =
        match parse_max_output_tokens(form.max_output_tokens.as_deref(), default) {
            Ok(max_output_tokens) => {
                let outcome = state
                    .analysis_service
                    .analyze(&form.cve_id, max_output_tokens)
                    .await;
                // Keep the slider inside its range even if the submitted value was not
                let slider_value =
                    max_output_tokens.clamp(MAX_OUTPUT_TOKENS_MIN, MAX_OUTPUT_TOKENS_MAX);
                (outcome, slider_value)
            }
            Err(e) => {
                tracing::debug!(error = %e, "Rejected form submission");
                (AnalysisOutcome::invalid_request(&e), default)
            }
        };

    html_response(render_page(
        &form.cve_id,
        slider_value,
        &render_outcome(&outcome),
    ))
}

fn html_response(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

/// Full page: form, then result blocks
pub fn render_page(cve_id: &str, max_output_tokens: u32, blocks: &[Block]) -> String {
    let mut html = String::with_capacity(4096);
    // Writing into a String never fails
    let _ = write_page(&mut html, cve_id, max_output_tokens, blocks);
    html
}

fn write_page(
    html: &mut String,
    cve_id: &str,
    max_output_tokens: u32,
    blocks: &[Block],
) -> fmt::Result {
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    writeln!(html, "<title>{PAGE_TITLE}</title>")?;
    writeln!(html, "<style>{STYLE}</style>\n</head>\n<body>\n<main>")?;
    writeln!(html, "<h1>{HEADING}</h1>")?;
    writeln!(html, "<p class=\"caption\">{CAPTION}</p>")?;

    html.push_str("<form id=\"analyze-form\" method=\"post\" action=\"/\">\n");
    html.push_str("<label for=\"cve_id\">CVE ID to analyze (e.g. CVE-2023-4863)</label>\n");
    writeln!(
        html,
        "<input type=\"text\" id=\"cve_id\" name=\"cve_id\" value=\"{}\">",
        escape_html(cve_id)
    )?;
    writeln!(
        html,
        "<label for=\"max_output_tokens\">Maximum response tokens: <output id=\"tokens-value\">{max_output_tokens}</output></label>"
    )?;
    writeln!(
        html,
        "<input type=\"range\" id=\"max_output_tokens\" name=\"max_output_tokens\" min=\"{MAX_OUTPUT_TOKENS_MIN}\" max=\"{MAX_OUTPUT_TOKENS_MAX}\" step=\"{MAX_OUTPUT_TOKENS_STEP}\" value=\"{max_output_tokens}\">"
    )?;
    html.push_str("<button type=\"submit\" id=\"submit\">Analyze CVE</button>\n");
    html.push_str("<p id=\"busy\" class=\"busy\" hidden></p>\n</form>\n");

    html.push_str("<section id=\"result\">\n");
    write_blocks(html, blocks)?;
    html.push_str("</section>\n</main>\n");
    writeln!(html, "<script>{SCRIPT}</script>\n</body>\n</html>")
}

/// HTML for result blocks; consecutive links form one list
pub fn render_blocks(blocks: &[Block]) -> String {
    let mut html = String::new();
    let _ = write_blocks(&mut html, blocks);
    html
}

fn write_blocks(html: &mut String, blocks: &[Block]) -> fmt::Result {
    let mut in_list = false;

    for block in blocks {
        let is_link = matches!(block, Block::Link { .. });
        if in_list && !is_link {
            html.push_str("</ul>\n");
            in_list = false;
        }

        match block {
            Block::Subheader { text } => {
                writeln!(html, "<h3>{}</h3>", escape_html(text))?;
            }
            Block::Warning { text } => {
                writeln!(html, "<div class=\"warning\">{}</div>", escape_html(text))?;
            }
            Block::Error { text } => {
                writeln!(html, "<div class=\"error\">{}</div>", escape_html(text))?;
            }
            Block::Code { language, text } => {
                writeln!(
                    html,
                    "<pre><code class=\"language-{}\">{}</code></pre>",
                    escape_html(language),
                    escape_html(text)
                )?;
            }
            Block::Field { label, value } => {
                writeln!(
                    html,
                    "<p class=\"field\"><strong>{}:</strong> {}</p>",
                    escape_html(label),
                    escape_html(value)
                )?;
            }
            Block::Link { title, url } => {
                if !in_list {
                    html.push_str("<ul>\n");
                    in_list = true;
                }
                writeln!(
                    html,
                    "<li><a href=\"{}\" rel=\"noopener noreferrer\" target=\"_blank\">{}</a></li>",
                    escape_html(&safe_href(url)),
                    escape_html(title)
                )?;
            }
            Block::Text { text } => {
                writeln!(html, "<p>{}</p>", escape_html(text))?;
            }
        }
    }

    if in_list {
        html.push_str("</ul>\n");
    }

    Ok(())
}

/// Only absolute http(s) URLs become live links; anything else points to "#"
fn safe_href(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => parsed.to_string(),
        _ => "#".to_string(),
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Configure page routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index).service(submit);
}
