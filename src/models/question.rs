use serde::{Deserialize, Serialize};

/// 每道题的选项数量
pub const OPTIONS_PER_QUESTION: usize = 4;

/// 选择题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: String,
    pub justification: String,
}

/// 题目结构不合格的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionDefect {
    EmptyQuestion,
    WrongOptionCount(usize),
    AnswerNotInOptions,
}

impl std::fmt::Display for QuestionDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuestionDefect::EmptyQuestion => write!(f, "pregunta vacía"),
            QuestionDefect::WrongOptionCount(n) => {
                write!(f, "{} opciones en lugar de {}", n, OPTIONS_PER_QUESTION)
            }
            QuestionDefect::AnswerNotInOptions => {
                write!(f, "la respuesta correcta no está entre las opciones")
            }
        }
    }
}

impl QuizQuestion {
    /// 检查题目结构
    ///
    /// 正确答案必须与某个选项完全相同（不做大小写或空白归一化）
    pub fn validate(&self) -> Result<(), QuestionDefect> {
        if self.question.trim().is_empty() {
            return Err(QuestionDefect::EmptyQuestion);
        }
        if self.options.len() != OPTIONS_PER_QUESTION {
            return Err(QuestionDefect::WrongOptionCount(self.options.len()));
        }
        if !self.options.iter().any(|o| o == &self.correct_answer) {
            return Err(QuestionDefect::AnswerNotInOptions);
        }
        Ok(())
    }

    /// 选项字母（a, b, c, d …）
    pub fn option_label(index: usize) -> char {
        (b'a' + (index % 26) as u8) as char
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> QuizQuestion {
        QuizQuestion {
            question: "¿Capital de Francia?".to_string(),
            options: vec![
                "Madrid".to_string(),
                "París".to_string(),
                "Roma".to_string(),
                "Lisboa".to_string(),
            ],
            correct_answer: "París".to_string(),
            justification: "El texto lo indica.".to_string(),
        }
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["correctAnswer"], "París");
        assert!(json.get("correct_answer").is_none());
    }

    #[test]
    fn test_validate() {
        assert!(sample().validate().is_ok());

        let mut q = sample();
        q.options.pop();
        assert_eq!(q.validate(), Err(QuestionDefect::WrongOptionCount(3)));

        let mut q = sample();
        q.correct_answer = "parís".to_string();
        assert_eq!(q.validate(), Err(QuestionDefect::AnswerNotInOptions));

        let mut q = sample();
        q.question = "  ".to_string();
        assert_eq!(q.validate(), Err(QuestionDefect::EmptyQuestion));
    }

    #[test]
    fn test_option_label() {
        assert_eq!(QuizQuestion::option_label(0), 'a');
        assert_eq!(QuizQuestion::option_label(3), 'd');
    }
}
