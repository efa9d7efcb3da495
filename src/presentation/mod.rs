//! 展示层
//!
//! 终端交互；导出文件由 `services::exporter` 负责

pub mod terminal;

pub use terminal::{ExportChoice, TerminalQuiz};
