//! Presentation of an analysis outcome as an ordered list of display blocks
//!
//! Both the HTML page and the JSON API use the same blocks, so the two
//! surfaces always show the same thing in the same order.

use serde::Serialize;
use utoipa::ToSchema;

use crate::model::{AnalysisOutcome, ReportField, VulnerabilityReport};

/// Placeholder for a missing value
pub const NOT_AVAILABLE: &str = "N/A";

pub const RESULT_HEADER: &str = "Gemini analysis result";
pub const RAW_HEADER: &str = "Model response (raw JSON)";
pub const STRUCTURED_HEADER: &str = "Structured analysis";
pub const REFERENCES_HEADER: &str = "Key references";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Subheader { text: String },
    Warning { text: String },
    Error { text: String },
    Code { language: String, text: String },
    Field { label: String, value: String },
    Link { title: String, url: String },
    Text { text: String },
}

impl Block {
    fn subheader(text: &str) -> Self {
        Block::Subheader {
            text: text.to_string(),
        }
    }

    fn error(text: &str) -> Self {
        Block::Error {
            text: text.to_string(),
        }
    }

    fn json(text: &str) -> Self {
        Block::Code {
            language: "json".to_string(),
            text: text.to_string(),
        }
    }
}

pub fn render_outcome(outcome: &AnalysisOutcome) -> Vec<Block> {
    match outcome {
        AnalysisOutcome::InvalidRequest { message } => vec![Block::Warning {
            text: message.clone(),
        }],
        AnalysisOutcome::ConfigError { message } | AnalysisOutcome::ApiError { message, .. } => {
            vec![Block::error(message)]
        }
        AnalysisOutcome::Blocked { message, .. }
        | AnalysisOutcome::EmptyResponse { message, .. } => {
            vec![Block::subheader(RESULT_HEADER), Block::error(message)]
        }
        AnalysisOutcome::ParseError {
            raw_text, message, ..
        } => vec![
            Block::subheader(RESULT_HEADER),
            Block::subheader(RAW_HEADER),
            Block::json(raw_text),
            Block::error(message),
        ],
        AnalysisOutcome::Displayed { raw_text, report } => {
            let mut blocks = vec![
                Block::subheader(RESULT_HEADER),
                Block::subheader(RAW_HEADER),
                Block::json(raw_text),
            ];
            blocks.extend(render_report(report));
            blocks
        }
    }
}

/// Field list followed by the reference list
pub fn render_report(report: &VulnerabilityReport) -> Vec<Block> {
    let mut blocks = vec![Block::subheader(STRUCTURED_HEADER)];

    blocks.extend(ReportField::ALL.iter().map(|&field| Block::Field {
        label: field.label().to_string(),
        value: report.field(field).unwrap_or(NOT_AVAILABLE).to_string(),
    }));

    blocks.push(Block::subheader(REFERENCES_HEADER));
    let references = report.reference_list();
    if references.is_empty() {
        blocks.push(Block::Text {
            text: NOT_AVAILABLE.to_string(),
        });
    } else {
        blocks.extend(references.iter().map(|r| Block::Link {
            title: r.title.clone(),
            url: r.url.clone(),
        }));
    }

    blocks
}
