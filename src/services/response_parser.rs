//! 响应解析服务 - 业务能力层
//!
//! 从模型返回的文本中定位 JSON 并解析成题目：
//! 1. 去掉 markdown 代码块包裹
//! 2. 截取第一个 `[`/`{` 到最后一个 `]`/`}` 之间的内容
//! 3. 逐条校验题目结构，不合格的丢弃

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::models::QuizQuestion;

/// 解析错误中保留的原文长度
const PARSE_SNIPPET_CHARS: usize = 100;

/// 整个回答就是一个代码块（前后可以有不含反引号的说明文字）
fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)^(?:[^`]*?\n)?[ \t]*```[A-Za-z0-9_-]*[ \t]*\r?\n(.*)```[^`]*$")
            .expect("fence regex is valid")
    })
}

/// 去掉代码块包裹，没有代码块时原样返回
///
/// 只识别包住整个回答的代码块，字符串值里的反引号不受影响。
/// 缺少结尾标记时只去掉开头那一行。
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    if let Some(inner) = fence_regex().captures(trimmed).and_then(|c| c.get(1)) {
        return inner.as_str().trim();
    }
    match trimmed.strip_prefix("```") {
        Some(rest) => rest.split_once('\n').map_or("", |(_, body)| body.trim()),
        None => trimmed,
    }
}

/// 截取 JSON 主体
///
/// 找不到合法的起止位置时返回原文本，交给 JSON 解析报错
pub fn isolate_json(text: &str) -> &str {
    let start = [text.find('['), text.find('{')].into_iter().flatten().min();
    let end = [text.rfind(']'), text.rfind('}')].into_iter().flatten().max();

    match (start, end) {
        (Some(start), Some(end)) if end >= start => &text[start..=end],
        _ => text,
    }
}

/// 解析模型响应
pub fn parse_questions(raw: &str) -> Result<Vec<QuizQuestion>, LlmError> {
    let payload = isolate_json(strip_code_fence(raw));

    let value: JsonValue = serde_json::from_str(payload).map_err(|e| {
        debug!("JSON 解析失败: {}", e);
        LlmError::Parse {
            snippet: payload.chars().take(PARSE_SNIPPET_CHARS).collect(),
        }
    })?;

    let entries = match value {
        JsonValue::Array(items) => items,
        JsonValue::Object(mut map) => match map.remove("questions") {
            Some(JsonValue::Array(items)) => items,
            Some(other) => {
                map.insert("questions".to_string(), other);
                vec![JsonValue::Object(map)]
            }
            None => vec![JsonValue::Object(map)],
        },
        _ => {
            return Err(LlmError::Parse {
                snippet: payload.chars().take(PARSE_SNIPPET_CHARS).collect(),
            })
        }
    };

    let received = entries.len();
    let questions: Vec<QuizQuestion> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(i, entry)| match serde_json::from_value::<QuizQuestion>(entry) {
            Ok(question) => match question.validate() {
                Ok(()) => Some(question),
                Err(defect) => {
                    warn!("⚠️ Pregunta {} descartada: {}", i + 1, defect);
                    None
                }
            },
            Err(e) => {
                warn!("⚠️ Pregunta {} descartada: {}", i + 1, e);
                None
            }
        })
        .collect();

    if received > 0 && questions.is_empty() {
        return Err(LlmError::NoValidQuestions { received });
    }

    debug!("解析得到 {}/{} 道有效题目", questions.len(), received);

    Ok(questions)
}
