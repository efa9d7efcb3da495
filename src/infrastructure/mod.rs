//! 基础设施层
//!
//! 持有外部资源（PDF 解析库、OCR 进程），只暴露能力

pub mod pdf_extractor;

pub use pdf_extractor::{
    build_extractor, count_pages, AutoExtractor, OcrExtractor, PageProgress, TextExtractor,
    TextLayerExtractor,
};
