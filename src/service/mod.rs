pub mod analysis;
pub mod gemini;
pub mod interpreter;
pub mod llm;
pub mod prompts;
pub mod render;

pub use analysis::AnalysisService;
pub use gemini::GeminiClient;
pub use llm::TextGenerator;
