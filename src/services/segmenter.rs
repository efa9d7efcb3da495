//! 分段服务 - 业务能力层
//!
//! 把按页提取的文本合并成有上限的段落：
//! - 每段最多 `max_pages` 页
//! - 每段最多 `max_chars` 个字符（含页分隔符）
//! - 单页超过字符上限时单独成段，不在页内切分

use crate::models::{PageText, Segment, PAGE_SEPARATOR};

/// 将页面文本分段
pub fn segment(pages: &[PageText], max_pages: usize, max_chars: usize) -> Vec<Segment> {
    let separator_len = PAGE_SEPARATOR.chars().count();
    let mut segments = Vec::new();
    let mut buffer = SegmentBuffer::default();

    for page in pages {
        let page_len = page.char_len() + separator_len;

        if !buffer.is_empty()
            && (buffer.char_len + page_len > max_chars || buffer.pages.len() >= max_pages)
        {
            segments.push(buffer.close(segments.len()));
        }

        buffer.push(page, page_len);
    }

    // 末尾全是空白时丢弃
    if !buffer.text.trim().is_empty() {
        segments.push(buffer.close(segments.len()));
    }

    segments
}

#[derive(Default)]
struct SegmentBuffer {
    pages: Vec<usize>,
    text: String,
    char_len: usize,
}

impl SegmentBuffer {
    fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    fn push(&mut self, page: &PageText, page_len: usize) {
        self.pages.push(page.position);
        self.text.push_str(&page.text);
        self.text.push_str(PAGE_SEPARATOR);
        self.char_len += page_len;
    }

    fn close(&mut self, index: usize) -> Segment {
        let buffer = std::mem::take(self);
        Segment {
            index,
            pages: buffer.pages,
            text: buffer.text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(texts: &[&str]) -> Vec<PageText> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| PageText::new(i + 1, *t))
            .collect()
    }

    fn assert_bounded(segments: &[Segment], source: &[PageText], max_pages: usize, max_chars: usize) {
        for segment in segments {
            assert!(segment.page_count() <= max_pages, "{}", segment);
            if segment.char_len() > max_chars {
                assert_eq!(segment.page_count(), 1, "solo una página puede exceder: {}", segment);
                let page = &source[segment.pages[0] - 1];
                assert!(page.char_len() + 2 > max_chars);
            }
        }
    }

    #[test]
    fn test_page_limit_closes_segment() {
        let source = pages(&["uno", "dos", "tres", "cuatro", "cinco"]);
        let segments = segment(&source, 2, 1000);

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].pages, vec![1, 2]);
        assert_eq!(segments[1].pages, vec![3, 4]);
        assert_eq!(segments[2].pages, vec![5]);
        assert_eq!(segments[0].text, "uno\n\ndos\n\n");
        assert_bounded(&segments, &source, 2, 1000);
    }

    #[test]
    fn test_char_limit_closes_segment() {
        // 每页 8 + 2 个字符
        let source = pages(&["aaaaaaaa", "bbbbbbbb", "cccccccc"]);
        let segments = segment(&source, 10, 25);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].pages, vec![1, 2]);
        assert_eq!(segments[0].char_len(), 20);
        assert_eq!(segments[1].pages, vec![3]);
        assert_bounded(&segments, &source, 10, 25);
    }

    #[test]
    fn test_oversized_page_stands_alone() {
        let long = "x".repeat(50);
        let source = pages(&["corto", &long, "fin"]);
        let segments = segment(&source, 10, 20);

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1].pages, vec![2]);
        assert!(segments[1].char_len() > 20);
        assert_bounded(&segments, &source, 10, 20);
    }

    #[test]
    fn test_completeness_preserves_order() {
        let texts: Vec<String> = (1..=23).map(|i| format!("página {} {}", i, "z".repeat(i * 3))).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let source = pages(&refs);
        let segments = segment(&source, 4, 120);

        let flattened: Vec<usize> = segments.iter().flat_map(|s| s.pages.clone()).collect();
        let expected: Vec<usize> = (1..=23).collect();
        assert_eq!(flattened, expected);

        for (i, s) in segments.iter().enumerate() {
            assert_eq!(s.index, i);
        }
        assert_bounded(&segments, &source, 4, 120);
    }

    #[test]
    fn test_trailing_blank_buffer_is_dropped() {
        let source = pages(&["texto", "otro", "   ", "\n"]);
        let segments = segment(&source, 2, 1000);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].pages, vec![1, 2]);
    }

    #[test]
    fn test_blank_pages_still_count_toward_limits() {
        let source = pages(&[" ", " ", "texto"]);
        let segments = segment(&source, 2, 1000);

        // 中间的空白段落照常输出，由编排层跳过
        assert_eq!(segments.len(), 2);
        assert!(segments[0].is_blank());
        assert_eq!(segments[1].pages, vec![3]);
    }

    #[test]
    fn test_no_pages_no_segments() {
        assert!(segment(&[], 5, 100).is_empty());
    }
}
