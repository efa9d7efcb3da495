pub mod exporter;
pub mod llm_service;
pub mod prompt;
pub mod response_parser;
pub mod segmenter;

pub use llm_service::{build_generator, GeminiService, OpenAiService, QuestionGenerator};
