pub mod config;
pub mod outcome;
pub mod report;
pub mod request;
pub mod response;

pub use config::Config;
pub use outcome::{AnalysisOutcome, BlockReason};
pub use report::{Reference, ReportField, VulnerabilityReport};
pub use request::{AnalysisRequest, MaxOutputTokens, RequestError};
pub use response::{FinishReason, ModelResponse};
