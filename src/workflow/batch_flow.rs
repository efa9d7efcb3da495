//! 批次处理流程 - 流程层
//!
//! 核心职责：定义"一个批次"的完整处理流程
//!
//! 流程顺序：
//! 1. 调用生成服务（带超时，可取消）
//! 2. 解析并校验返回的题目
//! 3. 任一步失败都转成 `BatchOutcome::Failed`，不向上抛出

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::LlmError;
use crate::models::{GenerationRequest, QuizQuestion};
use crate::services::response_parser::parse_questions;
use crate::services::QuestionGenerator;
use crate::utils::{truncate_text, CancelSignal};
use crate::workflow::batch_ctx::BatchCtx;

/// 批次处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// 得到题目（数量可能与请求不同）
    Generated(Vec<QuizQuestion>),
    /// 失败，附带完整的错误信息
    Failed(String),
    /// 被取消
    Cancelled,
}

/// 批次处理流程
///
/// - 不关心分段和配额
/// - 不持有任何状态
pub struct BatchFlow {
    generator: Arc<dyn QuestionGenerator>,
    timeout: Duration,
}

impl BatchFlow {
    pub fn new(generator: Arc<dyn QuestionGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    pub async fn run(
        &self,
        ctx: &BatchCtx,
        text_chunk: &str,
        cancel: &CancelSignal,
    ) -> BatchOutcome {
        let request = GenerationRequest {
            text_chunk: text_chunk.to_string(),
            question_count: ctx.question_count,
        };

        info!(
            "{} 🤖 Solicitando {} preguntas ({} caracteres)...",
            ctx,
            ctx.question_count,
            text_chunk.chars().count()
        );

        match self.generate(&request, cancel).await {
            Ok(questions) => {
                info!("{} ✓ {} preguntas recibidas", ctx, questions.len());
                BatchOutcome::Generated(questions)
            }
            Err(LlmError::Cancelled) => BatchOutcome::Cancelled,
            Err(e) => {
                let message = ctx.failure_message(&e);
                warn!("{} ❌ {}", ctx, message);
                BatchOutcome::Failed(message)
            }
        }
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &CancelSignal,
    ) -> Result<Vec<QuizQuestion>, LlmError> {
        let call = tokio::time::timeout(self.timeout, self.generator.generate(request));

        let raw = tokio::select! {
            _ = cancel.cancelled() => return Err(LlmError::Cancelled),
            result = call => result.map_err(|_| LlmError::Timeout {
                secs: self.timeout.as_secs(),
            })??,
        };

        debug!("原始回答 ({} 字符): {}", raw.chars().count(), truncate_text(&raw, 200));
        parse_questions(&raw)
    }
}
