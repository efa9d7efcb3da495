//! 集成测试共用的辅助函数

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use pdf_quiz_generator::error::LlmError;
use pdf_quiz_generator::models::{GenerationRequest, QuizQuestion};
use pdf_quiz_generator::QuestionGenerator;

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
                Operation::new("Td", vec![72.into(), 700.into()]),
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

/// 构造一组合法题目的 JSON 文本（包在 markdown 代码块里）
pub fn fenced_questions(prefix: &str, count: usize) -> String {
    let questions: Vec<QuizQuestion> = (1..=count)
        .map(|i| QuizQuestion {
            question: format!("¿{} {}?", prefix, i),
            options: vec![
                "Verdadero".to_string(),
                "Falso".to_string(),
                "Depende".to_string(),
                "Ninguna".to_string(),
            ],
            correct_answer: "Verdadero".to_string(),
            justification: "Aparece en el documento.".to_string(),
        })
        .collect();
    format!(
        "Aquí tienes las preguntas:\n```json\n{}\n```",
        serde_json::to_string_pretty(&questions).unwrap()
    )
}

/// 按脚本依次返回结果的生成器，脚本耗尽后按请求数量返回题目
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn new(script: Vec<Result<String, LlmError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuestionGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };
        match self.script.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(fenced_questions(
                &format!("Llamada {}", call),
                request.question_count,
            )),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
