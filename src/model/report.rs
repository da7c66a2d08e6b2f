//! Vulnerability report returned by the model
//!
//! The shape is requested in the prompt but never schema-validated: any JSON
//! object is accepted and keys that are missing (or `null`) are simply absent.

use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Title shown for a reference without one
pub const DEFAULT_REFERENCE_TITLE: &str = "Link";
/// Target used for a reference without a URL
pub const DEFAULT_REFERENCE_URL: &str = "#";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    #[error("expected a JSON object at the top level, found {0}")]
    NotAnObject(&'static str),

    #[error("`references` must be a list, found {0}")]
    ReferencesNotAList(&'static str),

    #[error("reference #{index} must be an object, found {kind}")]
    ReferenceNotAnObject { index: usize, kind: &'static str },
}

/// Scalar fields of the report, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportField {
    CveId,
    Summary,
    VulnType,
    Description,
    HowExploited,
    Severity,
    Impact,
    Recommendation,
}

impl ReportField {
    pub const ALL: [ReportField; 8] = [
        ReportField::CveId,
        ReportField::Summary,
        ReportField::VulnType,
        ReportField::Description,
        ReportField::HowExploited,
        ReportField::Severity,
        ReportField::Impact,
        ReportField::Recommendation,
    ];

    /// JSON key
    pub fn key(self) -> &'static str {
        match self {
            ReportField::CveId => "cve_id",
            ReportField::Summary => "summary",
            ReportField::VulnType => "vuln_type",
            ReportField::Description => "description",
            ReportField::HowExploited => "how_exploited",
            ReportField::Severity => "severity",
            ReportField::Impact => "impact",
            ReportField::Recommendation => "recommendation",
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            ReportField::CveId => "CVE ID",
            ReportField::Summary => "Summary",
            ReportField::VulnType => "Vulnerability type",
            ReportField::Description => "Description",
            ReportField::HowExploited => "Exploitation scenario",
            ReportField::Severity => "Severity",
            ReportField::Impact => "Impact",
            ReportField::Recommendation => "Recommendation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Reference {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct VulnerabilityReport {
    pub cve_id: Option<String>,
    pub summary: Option<String>,
    pub vuln_type: Option<String>,
    pub description: Option<String>,
    pub how_exploited: Option<String>,
    pub severity: Option<String>,
    pub impact: Option<String>,
    pub recommendation: Option<String>,
    /// `None` when the key is missing; an empty list is kept as-is
    pub references: Option<Vec<Reference>>,
}

impl VulnerabilityReport {
    pub fn field(&self, field: ReportField) -> Option<&str> {
        let value = match field {
            ReportField::CveId => &self.cve_id,
            ReportField::Summary => &self.summary,
            ReportField::VulnType => &self.vuln_type,
            ReportField::Description => &self.description,
            ReportField::HowExploited => &self.how_exploited,
            ReportField::Severity => &self.severity,
            ReportField::Impact => &self.impact,
            ReportField::Recommendation => &self.recommendation,
        };
        value.as_deref()
    }

    /// References to display; empty when missing
    pub fn reference_list(&self) -> &[Reference] {
        self.references.as_deref().unwrap_or_default()
    }

    fn set_field(&mut self, field: ReportField, value: Option<String>) {
        let slot = match field {
            ReportField::CveId => &mut self.cve_id,
            ReportField::Summary => &mut self.summary,
            ReportField::VulnType => &mut self.vuln_type,
            ReportField::Description => &mut self.description,
            ReportField::HowExploited => &mut self.how_exploited,
            ReportField::Severity => &mut self.severity,
            ReportField::Impact => &mut self.impact,
            ReportField::Recommendation => &mut self.recommendation,
        };
        *slot = value;
    }
}

impl TryFrom<Value> for VulnerabilityReport {
    type Error = ReportError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(map) = value else {
            return Err(ReportError::NotAnObject(json_kind(&value)));
        };

        let mut report = VulnerabilityReport::default();
        for field in ReportField::ALL {
            report.set_field(field, map.get(field.key()).and_then(display_value));
        }
        report.references = parse_references(&map)?;

        Ok(report)
    }
}

fn parse_references(map: &Map<String, Value>) -> Result<Option<Vec<Reference>>, ReportError> {
    let items = match map.get("references") {
        None => return Ok(None),
        Some(Value::Array(items)) => items,
        Some(value) if is_blank(value) => return Ok(None),
        Some(other) => return Err(ReportError::ReferencesNotAList(json_kind(other))),
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let Value::Object(obj) = item else {
                return Err(ReportError::ReferenceNotAnObject {
                    index,
                    kind: json_kind(item),
                });
            };
            Ok(Reference {
                title: obj
                    .get("title")
                    .and_then(display_value)
                    .unwrap_or_else(|| DEFAULT_REFERENCE_TITLE.to_string()),
                url: obj
                    .get("url")
                    .and_then(display_value)
                    .unwrap_or_else(|| DEFAULT_REFERENCE_URL.to_string()),
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// `null`, `""`, `{}`, `false` and zero stand for "nothing found"
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Object(obj) => obj.is_empty(),
        Value::Array(_) => false,
    }
}

/// Strings are shown verbatim, `null` is absent, anything else as JSON text
fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
