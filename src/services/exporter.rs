//! 导出服务 - 业务能力层
//!
//! 两种格式：
//! - JSON：`{questions, score, exportDate}`
//! - PDF：标题、题目、a-d 选项、正确答案与解释，按纵向位置分页，有得分时追加得分页

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use serde::Serialize;
use tracing::info;

use crate::error::ExportError;
use crate::models::QuizQuestion;

pub const DEFAULT_JSON_FILE: &str = "cuestionario.json";
pub const DEFAULT_PDF_FILE: &str = "cuestionario.pdf";

#[derive(Serialize)]
struct ExportData<'a> {
    questions: &'a [QuizQuestion],
    score: Option<f64>,
    #[serde(rename = "exportDate")]
    export_date: String,
}

/// 生成 JSON 文本
pub fn quiz_to_json(
    questions: &[QuizQuestion],
    score: Option<f64>,
    exported_at: DateTime<Utc>,
) -> Result<String, ExportError> {
    let data = ExportData {
        questions,
        score,
        export_date: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    Ok(serde_json::to_string_pretty(&data)?)
}

/// 写出 JSON 文件
pub async fn write_json(
    path: &Path,
    questions: &[QuizQuestion],
    score: Option<f64>,
) -> Result<(), ExportError> {
    let json = quiz_to_json(questions, score, Utc::now())?;
    write_file(path, json.as_bytes()).await?;
    info!("💾 Cuestionario exportado a {}", path.display());
    Ok(())
}

/// 写出 PDF 文件
pub async fn write_pdf(
    path: &Path,
    questions: &[QuizQuestion],
    score: Option<f64>,
) -> Result<(), ExportError> {
    let bytes = quiz_to_pdf(questions, score)?;
    write_file(path, &bytes).await?;
    info!("💾 Cuestionario exportado a {}", path.display());
    Ok(())
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| ExportError::Io {
            path: path.display().to_string(),
            source,
        })
}

// ========== PDF 版面 ==========

// 坐标单位为毫米，原点在页面左上角（A4）
const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_X: f32 = 20.0;
const OPTION_X: f32 = 30.0;
const TOP_Y: f32 = 20.0;
const PAGE_BREAK_Y: f32 = 250.0;
const WRAP_CHARS: usize = 80;
const WRAP_LINE_HEIGHT: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Normal,
    Bold,
    Italic,
}

impl FontStyle {
    fn resource_name(self) -> &'static str {
        match self {
            FontStyle::Normal => "F1",
            FontStyle::Bold => "F2",
            FontStyle::Italic => "F3",
        }
    }
}

/// 一行文字
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub style: FontStyle,
    pub text: String,
}

/// 排版结果：每页若干行
#[derive(Debug, Default)]
pub struct QuizLayout {
    pub pages: Vec<Vec<TextLine>>,
}

struct LayoutCursor {
    pages: Vec<Vec<TextLine>>,
    y: f32,
    size: f32,
    style: FontStyle,
    break_pending: bool,
}

impl LayoutCursor {
    fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            y: TOP_Y,
            size: 12.0,
            style: FontStyle::Normal,
            break_pending: false,
        }
    }

    /// 写一行，过长时折行；每个续行下移 `WRAP_LINE_HEIGHT`
    fn text(&mut self, text: &str, x: f32) {
        if self.break_pending {
            self.new_page();
        }
        for (i, line) in wrap(text, WRAP_CHARS).into_iter().enumerate() {
            if i > 0 {
                self.y += WRAP_LINE_HEIGHT;
            }
            let (size, style, y) = (self.size, self.style, self.y);
            if let Some(page) = self.pages.last_mut() {
                page.push(TextLine {
                    x,
                    y,
                    size,
                    style,
                    text: line,
                });
            }
        }
    }

    fn advance(&mut self, dy: f32) {
        self.y += dy;
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.y = TOP_Y;
        self.break_pending = false;
    }

    /// 超过分页线时，在下一次写字前换页
    fn check_page_break(&mut self) {
        if self.y > PAGE_BREAK_Y {
            self.break_pending = true;
        }
    }
}

fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = current.chars().count() + word.chars().count() + usize::from(!current.is_empty());
        if !current.is_empty() && needed > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// 排版
pub fn layout_quiz(questions: &[QuizQuestion], score: Option<f64>) -> QuizLayout {
    let mut cursor = LayoutCursor::new();

    cursor.size = 20.0;
    cursor.text("Cuestionario", MARGIN_X);
    cursor.advance(20.0);

    cursor.size = 12.0;
    for (index, question) in questions.iter().enumerate() {
        cursor.style = FontStyle::Bold;
        cursor.text(&format!("{}. {}", index + 1, question.question), MARGIN_X);
        cursor.advance(10.0);

        cursor.style = FontStyle::Normal;
        for (opt_index, option) in question.options.iter().enumerate() {
            let label = QuizQuestion::option_label(opt_index);
            cursor.text(&format!("{}) {}", label, option), OPTION_X);
            cursor.advance(8.0);
        }

        cursor.advance(5.0);
        cursor.style = FontStyle::Italic;
        cursor.text(
            &format!("Respuesta correcta: {}", question.correct_answer),
            MARGIN_X,
        );
        cursor.advance(8.0);
        cursor.text(
            &format!("Justificación: {}", question.justification),
            MARGIN_X,
        );
        cursor.advance(15.0);

        cursor.check_page_break();
    }

    if let Some(score) = score {
        cursor.new_page();
        cursor.size = 16.0;
        cursor.style = FontStyle::Normal;
        cursor.text(&format!("Puntuación final: {:.1}%", score), MARGIN_X);
    }

    QuizLayout {
        pages: cursor.pages,
    }
}

/// 生成 PDF 字节
pub fn quiz_to_pdf(questions: &[QuizQuestion], score: Option<f64>) -> Result<Vec<u8>, ExportError> {
    render_pdf(&layout_quiz(questions, score))
}

fn mm_to_pt(mm: f32) -> f32 {
    mm * 72.0 / 25.4
}

/// 把文本编码为 WinAnsi，无法表示的字符替换为 `?`
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => c as u8,
            '€' => 0x80,
            '‘' | '’' => b'\'',
            '“' | '”' => b'"',
            '–' => 0x96,
            '—' => 0x97,
            '…' => 0x85,
            '\t' => b' ',
            _ => b'?',
        })
        .collect()
}

fn render_pdf(layout: &QuizLayout) -> Result<Vec<u8>, ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let fonts = [
        ("F1", "Helvetica"),
        ("F2", "Helvetica-Bold"),
        ("F3", "Helvetica-Oblique"),
    ];
    let mut font_dict = lopdf::Dictionary::new();
    for (name, base_font) in fonts {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => base_font,
            "Encoding" => "WinAnsiEncoding",
        });
        font_dict.set(name, font_id);
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => font_dict,
    });

    let mut kids: Vec<Object> = Vec::with_capacity(layout.pages.len());
    for lines in &layout.pages {
        let mut operations = Vec::with_capacity(lines.len() * 5);
        for line in lines {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Tf",
                vec![line.style.resource_name().into(), line.size.into()],
            ));
            operations.push(Operation::new(
                "Td",
                vec![
                    mm_to_pt(line.x).into(),
                    mm_to_pt(PAGE_HEIGHT_MM - line.y).into(),
                ],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(win_ansi(&line.text))],
            ));
            operations.push(Operation::new("ET", vec![]));
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            mm_to_pt(PAGE_WIDTH_MM).into(),
            mm_to_pt(PAGE_HEIGHT_MM).into(),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn question(i: usize) -> QuizQuestion {
        QuizQuestion {
            question: format!("¿Pregunta número {}?", i),
            options: vec![
                "Opción uno".to_string(),
                "Opción dos".to_string(),
                "Opción tres".to_string(),
                "Opción cuatro".to_string(),
            ],
            correct_answer: "Opción dos".to_string(),
            justification: "Así lo dice el texto.".to_string(),
        }
    }

    #[test]
    fn test_json_shape() {
        let questions = vec![question(1)];
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap();
        let json = quiz_to_json(&questions, Some(100.0), at).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["questions"][0]["correctAnswer"], "Opción dos");
        assert_eq!(value["score"], 100.0);
        assert_eq!(value["exportDate"], "2026-03-01T12:30:00.000Z");
    }

    #[test]
    fn test_json_without_score() {
        let json = quiz_to_json(&[question(1)], None, Utc::now()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["score"].is_null());
    }

    #[test]
    fn test_layout_paginates_after_offset_threshold() {
        // 每题占 70mm：第一页从 40 开始放 4 题，之后每页 4 题
        let questions: Vec<_> = (1..=10).map(question).collect();
        let layout = layout_quiz(&questions, None);

        assert_eq!(layout.pages.len(), 3);
        assert_eq!(layout.pages[0][0].text, "Cuestionario");
        assert_eq!(layout.pages[0][0].size, 20.0);
        assert_eq!(layout.pages[1][0].text, "5. ¿Pregunta número 5?");
        assert_eq!(layout.pages[1][0].y, TOP_Y);
        assert_eq!(layout.pages[2][0].text, "9. ¿Pregunta número 9?");
    }

    #[test]
    fn test_layout_no_trailing_empty_page() {
        let questions: Vec<_> = (1..=8).map(question).collect();
        let layout = layout_quiz(&questions, None);
        assert_eq!(layout.pages.len(), 2);
        assert!(layout.pages.iter().all(|p| !p.is_empty()));
    }

    #[test]
    fn test_layout_lines_and_styles() {
        let layout = layout_quiz(&[question(1)], None);
        let texts: Vec<&str> = layout.pages[0].iter().map(|l| l.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Cuestionario",
                "1. ¿Pregunta número 1?",
                "a) Opción uno",
                "b) Opción dos",
                "c) Opción tres",
                "d) Opción cuatro",
                "Respuesta correcta: Opción dos",
                "Justificación: Así lo dice el texto.",
            ]
        );
        assert_eq!(layout.pages[0][1].style, FontStyle::Bold);
        assert_eq!(layout.pages[0][2].x, OPTION_X);
        assert_eq!(layout.pages[0][7].style, FontStyle::Italic);
    }

    #[test]
    fn test_score_page() {
        let layout = layout_quiz(&[question(1)], Some(66.666));
        assert_eq!(layout.pages.len(), 2);
        assert_eq!(layout.pages[1][0].text, "Puntuación final: 66.7%");
        assert_eq!(layout.pages[1][0].size, 16.0);
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("uno dos tres", 7), vec!["uno dos", "tres"]);
        assert_eq!(wrap("", 10), vec![""]);
    }

    #[test]
    fn test_win_ansi() {
        assert_eq!(win_ansi("¿Sí?"), vec![0xBF, b'S', 0xED, b'?']);
        assert_eq!(win_ansi("日"), vec![b'?']);
    }

    #[test]
    fn test_pdf_bytes_reload() {
        let questions: Vec<_> = (1..=5).map(question).collect();
        let bytes = quiz_to_pdf(&questions, Some(80.0)).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }
}
