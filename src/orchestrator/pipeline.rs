//! 完整处理流水线 - 编排层
//!
//! ## 职责
//!
//! 从 PDF 文件一路走到可作答的测验：
//!
//! ```text
//! 读取文件 → 检查页数 → 提取文本 → 分段 → 生成题目 → QuizState
//! ```
//!
//! - 持有提取器与生成器（唯一的资源所有者）
//! - 维护 `ProcessingState`，供展示层读取进度与部分错误
//! - 任何致命错误都写入 `ProcessingState::error` 后返回

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{ExtractionError, QuizError};
use crate::infrastructure::{build_extractor, count_pages, TextExtractor};
use crate::models::{ProcessingState, QuizState, Segment};
use crate::orchestrator::quiz_generator::{GenerationReport, QuizGenerator};
use crate::services::segmenter::segment;
use crate::services::{build_generator, QuestionGenerator};
use crate::utils::CancelSignal;

/// 流水线主结构
pub struct QuizPipeline {
    config: Config,
    extractor: Arc<dyn TextExtractor>,
    generator: QuizGenerator,
    model_name: String,
    state: ProcessingState,
}

impl QuizPipeline {
    /// 按配置初始化（校验配置并创建提取器、生成器）
    pub fn initialize(config: Config) -> Result<Self, QuizError> {
        config.validate()?;
        let extractor = build_extractor(&config);
        let generator = build_generator(&config)?;
        Ok(Self::with_components(config, extractor, generator))
    }

    /// 使用给定组件创建（测试中注入模拟实现）
    pub fn with_components(
        config: Config,
        extractor: Arc<dyn TextExtractor>,
        generator: Arc<dyn QuestionGenerator>,
    ) -> Self {
        let model_name = generator.model_name().to_string();
        let generator = QuizGenerator::from_config(generator, &config);
        Self {
            config,
            extractor,
            generator,
            model_name,
            state: ProcessingState::default(),
        }
    }

    pub fn processing_state(&self) -> &ProcessingState {
        &self.state
    }

    /// 处理 PDF 文件
    ///
    /// # 参数
    /// - `pdf_path`: PDF 路径
    /// - `question_count`: 目标题数
    /// - `cancel`: 取消信号
    ///
    /// # 返回
    /// 成功返回已加载题目的 `QuizState`；部分批次错误见 `processing_state().partial_errors`
    pub async fn run(
        &mut self,
        pdf_path: &Path,
        question_count: usize,
        cancel: &CancelSignal,
    ) -> Result<QuizState, QuizError> {
        self.state.begin("Iniciando procesamiento de PDF...");
        log_startup(&self.config, &self.model_name, pdf_path, question_count);

        let result = match tokio::fs::read(pdf_path).await {
            Ok(bytes) => self.process(&bytes, question_count, cancel).await,
            Err(e) => Err(QuizError::io(pdf_path.display().to_string(), e)),
        };
        self.settle(result)
    }

    /// 处理内存中的 PDF 字节
    pub async fn run_bytes(
        &mut self,
        pdf_bytes: &[u8],
        question_count: usize,
        cancel: &CancelSignal,
    ) -> Result<QuizState, QuizError> {
        self.state.begin("Iniciando procesamiento de PDF...");
        let result = self.process(pdf_bytes, question_count, cancel).await;
        self.settle(result)
    }

    async fn process(
        &mut self,
        pdf_bytes: &[u8],
        question_count: usize,
        cancel: &CancelSignal,
    ) -> Result<QuizState, QuizError> {
        let segments = self.prepare_segments(pdf_bytes, cancel).await?;

        self.state
            .set_status(format!("Generando {} preguntas...", question_count));
        let GenerationReport {
            questions,
            batch_errors,
        } = self
            .generator
            .generate(&segments, question_count, cancel)
            .await?;

        self.state.add_partial_errors(batch_errors.iter().cloned());

        if questions.is_empty() {
            return Err(QuizError::NoQuestions { batch_errors });
        }

        let mut quiz = QuizState::new();
        quiz.load(questions);
        Ok(quiz)
    }

    /// 检查页数、提取文本并分段
    async fn prepare_segments(
        &mut self,
        pdf_bytes: &[u8],
        cancel: &CancelSignal,
    ) -> Result<Vec<Segment>, QuizError> {
        let timeout = Duration::from_secs(self.config.extraction_timeout_secs);
        let page_count = count_pages(pdf_bytes, timeout).await?;
        if page_count > self.config.max_pdf_pages {
            return Err(QuizError::PageLimitExceeded {
                pages: page_count,
                max: self.config.max_pdf_pages,
            });
        }

        self.state
            .set_status(format!("Extrayendo texto de {} páginas...", page_count));
        let state = &mut self.state;
        let mut report_page = |page: usize, total: usize| {
            state.set_status(format!("Realizando OCR en página {} de {}...", page, total));
        };
        let pages = self
            .extractor
            .extract(pdf_bytes, cancel, &mut report_page)
            .await
            .map_err(|e| match e {
                ExtractionError::Cancelled => QuizError::Cancelled,
                other => QuizError::Extraction(other),
            })?;

        let segments = segment(
            &pages,
            self.config.max_pages_per_segment,
            self.config.max_chars_per_segment,
        );
        if segments.is_empty() {
            return Err(QuizError::NoSegments);
        }

        self.state
            .set_status(format!("PDF procesado en {} segmentos.", segments.len()));
        Ok(segments)
    }

    /// 根据结果更新处理状态
    fn settle(&mut self, result: Result<QuizState, QuizError>) -> Result<QuizState, QuizError> {
        match &result {
            Ok(quiz) => {
                let generated = quiz.questions().map_or(0, |q| q.len());
                self.state
                    .finish(format!("Cuestionario generado con {} preguntas.", generated));
                log_final_stats(quiz, &self.state);
            }
            Err(e) => {
                warn!("❌ {}", e);
                self.state.fail(e.to_string());
            }
        }
        result
    }
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config, model_name: &str, pdf_path: &Path, question_count: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 Generador de cuestionarios PDF");
    info!("📄 Archivo: {}", pdf_path.display());
    info!("🤖 Modelo: {}", model_name);
    info!("🎯 Preguntas solicitadas: {}", question_count);
    info!(
        "📦 Límites: {} preguntas/llamada, {} páginas/segmento, {} caracteres/segmento",
        config.questions_per_api_call, config.max_pages_per_segment, config.max_chars_per_segment
    );
    info!("{}", "=".repeat(60));
}

fn log_final_stats(quiz: &QuizState, state: &ProcessingState) {
    let generated = quiz.questions().map_or(0, |q| q.len());
    info!("\n{}", "=".repeat(60));
    info!("📊 Procesamiento completado");
    info!(
        "Hora de finalización: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("✅ Preguntas generadas: {}", generated);
    info!("❌ Lotes con errores: {}", state.partial_errors.len());
    info!("{}", "=".repeat(60));
}
