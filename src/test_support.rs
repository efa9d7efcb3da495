//! 单元测试共用的辅助函数

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::error::LlmError;
use crate::models::{GenerationRequest, QuizQuestion};
use crate::services::QuestionGenerator;

/// 生成每页一行文字的 PDF
pub fn make_test_pdf(page_texts: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in page_texts {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![100.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// 构造一组合法题目的 JSON 文本
pub fn questions_json(prefix: &str, count: usize) -> String {
    let questions: Vec<QuizQuestion> = (1..=count)
        .map(|i| sample_question(&format!("{} {}", prefix, i)))
        .collect();
    serde_json::to_string(&questions).unwrap()
}

pub fn sample_question(text: &str) -> QuizQuestion {
    QuizQuestion {
        question: format!("¿{}?", text),
        options: vec![
            "Opción A".to_string(),
            "Opción B".to_string(),
            "Opción C".to_string(),
            "Opción D".to_string(),
        ],
        correct_answer: "Opción A".to_string(),
        justification: "Según el texto.".to_string(),
    }
}

/// 按脚本依次返回结果的生成器
///
/// 脚本耗尽后默认按请求数量返回题目
pub struct MockGenerator {
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockGenerator {
    pub fn new(script: Vec<Result<String, LlmError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 总是按请求数量返回题目
    pub fn fulfilling() -> Self {
        Self::new(Vec::new())
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuestionGenerator for MockGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };
        let scripted = self.script.lock().unwrap().pop_front();
        match scripted {
            Some(result) => result,
            None => Ok(questions_json(
                &format!("Llamada {}", call),
                request.question_count,
            )),
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
