//! 文档数据：单页文本与段落

use std::fmt;

/// 段落内每页文本之后追加的分隔符
pub const PAGE_SEPARATOR: &str = "\n\n";

/// 单页提取结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// 页码（从1开始）
    pub position: usize,
    pub text: String,
}

impl PageText {
    pub fn new(position: usize, text: impl Into<String>) -> Self {
        Self {
            position,
            text: text.into(),
        }
    }

    /// 字符数（按 Unicode 标量计）
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// 由连续若干页拼接而成的段落
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// 段落序号（从0开始）
    pub index: usize,
    /// 来源页码，按顺序
    pub pages: Vec<usize>,
    pub text: String,
}

impl Segment {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// 按字符偏移截取 `[start, end)`，越界部分忽略
    pub fn char_slice(&self, start: usize, end: usize) -> String {
        if end <= start {
            return String::new();
        }
        self.text.chars().skip(start).take(end - start).collect()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.pages.first(), self.pages.last()) {
            (Some(first), Some(last)) => write!(
                f,
                "segmento {} (páginas {}-{}, {} caracteres)",
                self.index + 1,
                first,
                last,
                self.char_len()
            ),
            _ => write!(f, "segmento {} (vacío)", self.index + 1),
        }
    }
}

/// 一次外部生成调用的请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub text_chunk: String,
    pub question_count: usize,
}
