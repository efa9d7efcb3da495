//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责分配题目配额和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `pipeline` - 完整流水线
//! - 持有提取器和生成器
//! - 检查页数、提取、分段
//! - 维护 `ProcessingState`
//!
//! ### `quiz_generator` - 题目生成编排器
//! - 把目标题数分配到段落和批次
//! - 创建并复用 BatchFlow
//! - 汇总题目和批次错误
//!
//! ## 层次关系
//!
//! ```text
//! pipeline (处理整个 PDF)
//!     ↓
//! quiz_generator (处理 Vec<Segment>)
//!     ↓
//! workflow::BatchFlow (处理单个批次)
//!     ↓
//! services (能力层：segmenter / llm / parser / exporter)
//!     ↓
//! infrastructure (基础设施：pdf_extractor)
//! ```

pub mod pipeline;
pub mod quiz_generator;

// 重新导出主要类型
pub use pipeline::QuizPipeline;
pub use quiz_generator::{GenerationReport, QuizGenerator};
