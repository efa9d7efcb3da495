pub mod document;
pub mod processing_state;
pub mod question;
pub mod quiz_state;

pub use document::{GenerationRequest, PageText, Segment, PAGE_SEPARATOR};
pub use processing_state::ProcessingState;
pub use question::{QuestionDefect, QuizQuestion, OPTIONS_PER_QUESTION};
pub use quiz_state::QuizState;
