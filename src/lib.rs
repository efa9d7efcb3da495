//! # PDF Quiz Generator
//!
//! 从 PDF 文档生成选择题测验的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有外部资源，只暴露能力
//! - `TextExtractor` - PDF 字节 → 按页文本（文本层 / OCR / 自动）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心调度
//! - `segmenter` - 页面分段
//! - `QuestionGenerator` - 调用 LLM 生成题目（Gemini / OpenAI 兼容）
//! - `response_parser` - 从回答中定位并校验 JSON
//! - `exporter` - 导出 JSON / PDF
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个批次"的完整处理流程
//! - `BatchCtx` - 上下文封装（段落序号 + 批次序号）
//! - `BatchFlow` - 流程编排（调用 → 超时/取消 → 解析）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/quiz_generator` - 把题目配额分配到段落和批次
//! - `orchestrator/pipeline` - 页数检查 → 提取 → 分段 → 生成
//!
//! ### ⑤ 展示层（Presentation）
//! - `presentation/terminal` - 终端作答、结果与导出选项
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod presentation;
pub mod services;
pub mod utils;
pub mod workflow;

#[cfg(test)]
mod test_support;

// 重新导出常用类型
pub use config::{Config, ExtractionMode, LlmProvider};
pub use error::QuizError;
pub use models::{QuizQuestion, QuizState};
pub use orchestrator::{GenerationReport, QuizGenerator, QuizPipeline};
pub use services::QuestionGenerator;
pub use utils::CancelSignal;
pub use workflow::{BatchCtx, BatchFlow, BatchOutcome};
