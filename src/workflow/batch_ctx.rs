//! 批次上下文
//!
//! 封装"我正在处理第几个段落的第几个批次"这一信息

use std::fmt::Display;

/// 批次上下文（序号都从1开始，只用于日志和错误信息）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchCtx {
    /// 段落序号
    pub segment: usize,
    /// 段落内的批次序号
    pub batch: usize,
    /// 本批次请求的题目数
    pub question_count: usize,
}

impl BatchCtx {
    pub fn new(segment: usize, batch: usize, question_count: usize) -> Self {
        Self {
            segment,
            batch,
            question_count,
        }
    }

    /// 批次失败信息
    pub fn failure_message(&self, reason: impl Display) -> String {
        format!(
            "Error procesando segmento {}, lote {}: {}",
            self.segment, self.batch, reason
        )
    }
}

impl Display for BatchCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[segmento {} lote {}]", self.segment, self.batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message_format() {
        let ctx = BatchCtx::new(2, 3, 5);
        assert_eq!(
            ctx.failure_message("Error API Gemini: Bad Request"),
            "Error procesando segmento 2, lote 3: Error API Gemini: Bad Request"
        );
        assert_eq!(ctx.to_string(), "[segmento 2 lote 3]");
    }
}
