//! 题目生成编排器 - 编排层
//!
//! ## 职责
//!
//! 把"要生成 N 道题"分配到各个段落和批次上，逐个调用 `BatchFlow`。
//!
//! ## 分配规则
//!
//! 1. 每个段落分到 `ceil(剩余题数 / 剩余段落数)` 道题（空白段落跳过，但仍计入剩余段落数）
//! 2. 段落内按每次调用的上限拆成若干批次，文本按字符平均切块
//! 3. 单个批次失败只记录错误，继续下一个
//! 4. 达到目标题数后立即停止，结果截断到目标数

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::QuizError;
use crate::models::{QuizQuestion, Segment};
use crate::services::QuestionGenerator;
use crate::utils::CancelSignal;
use crate::workflow::{BatchCtx, BatchFlow, BatchOutcome};

/// 生成结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationReport {
    pub questions: Vec<QuizQuestion>,
    /// 失败批次的错误信息，按发生顺序
    pub batch_errors: Vec<String>,
}

/// 题目生成编排器
pub struct QuizGenerator {
    flow: BatchFlow,
    questions_per_call: usize,
}

impl QuizGenerator {
    pub fn new(flow: BatchFlow, questions_per_call: usize) -> Self {
        Self {
            flow,
            questions_per_call: questions_per_call.max(1),
        }
    }

    /// 按配置创建（超时与每批题数取自配置）
    pub fn from_config(generator: Arc<dyn QuestionGenerator>, config: &Config) -> Self {
        let flow = BatchFlow::new(generator, Duration::from_secs(config.request_timeout_secs));
        Self::new(flow, config.questions_per_api_call)
    }

    /// 生成题目
    ///
    /// # 参数
    /// - `segments`: 分段结果
    /// - `total`: 目标题数
    /// - `cancel`: 取消信号
    ///
    /// # 返回
    /// 成功返回生成结果（题目可能为空，由调用方判断）；取消时返回 `QuizError::Cancelled`
    pub async fn generate(
        &self,
        segments: &[Segment],
        total: usize,
        cancel: &CancelSignal,
    ) -> Result<GenerationReport, QuizError> {
        let mut report = GenerationReport::default();

        for (position, segment) in segments.iter().enumerate() {
            if report.questions.len() >= total {
                break;
            }
            if cancel.is_cancelled() {
                return Err(QuizError::Cancelled);
            }
            if segment.is_blank() {
                info!("⏭️ {} sin texto, se omite", segment);
                continue;
            }

            let remaining = total - report.questions.len();
            let segments_left = segments.len() - position;
            let for_segment = remaining.div_ceil(segments_left);

            log_segment_start(segment, position + 1, segments.len(), for_segment);

            self.generate_for_segment(segment, position + 1, for_segment, total, cancel, &mut report)
                .await?;
        }

        report.questions.truncate(total);
        log_generation_complete(&report, total);

        Ok(report)
    }

    async fn generate_for_segment(
        &self,
        segment: &Segment,
        segment_number: usize,
        for_segment: usize,
        total: usize,
        cancel: &CancelSignal,
        report: &mut GenerationReport,
    ) -> Result<(), QuizError> {
        let per_call = self.questions_per_call;
        let num_batches = for_segment.div_ceil(per_call);
        let chunk_len = segment.char_len().div_ceil(num_batches);

        for batch in 0..num_batches {
            if cancel.is_cancelled() {
                return Err(QuizError::Cancelled);
            }

            let for_batch = per_call
                .min(for_segment.saturating_sub(batch * per_call))
                .min(total.saturating_sub(report.questions.len()));
            if for_batch == 0 {
                continue;
            }

            let chunk = segment.char_slice(batch * chunk_len, (batch + 1) * chunk_len);
            if chunk.trim().is_empty() {
                continue;
            }

            let ctx = BatchCtx::new(segment_number, batch + 1, for_batch);
            match self.flow.run(&ctx, &chunk, cancel).await {
                BatchOutcome::Generated(questions) => report.questions.extend(questions),
                BatchOutcome::Failed(message) => report.batch_errors.push(message),
                BatchOutcome::Cancelled => return Err(QuizError::Cancelled),
            }
        }

        Ok(())
    }
}

// ========== 日志辅助函数 ==========

fn log_segment_start(segment: &Segment, number: usize, total_segments: usize, for_segment: usize) {
    info!("\n{}", "─".repeat(40));
    info!("📚 Procesando {} ({}/{})", segment, number, total_segments);
    info!("🎯 Preguntas asignadas: {}", for_segment);
}

fn log_generation_complete(report: &GenerationReport, total: usize) {
    info!("\n{}", "=".repeat(40));
    info!("✅ Preguntas generadas: {}/{}", report.questions.len(), total);
    if !report.batch_errors.is_empty() {
        warn!("❌ Lotes con errores: {}", report.batch_errors.len());
    }
    info!("{}", "=".repeat(40));
}
