//! 测验状态与评分
//!
//! 只能通过 `load` / `record_answer` / `submit` / `reset` 修改

use std::collections::BTreeMap;

use crate::models::question::QuizQuestion;

/// 及格线（百分比）
pub const PASSING_SCORE: f64 = 70.0;

/// 测验状态
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuizState {
    questions: Option<Vec<QuizQuestion>>,
    selected_answers: BTreeMap<usize, String>,
    score: Option<f64>,
    is_submitted: bool,
}

impl QuizState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 装入新生成的题目，清空之前的作答
    pub fn load(&mut self, questions: Vec<QuizQuestion>) {
        *self = Self {
            questions: Some(questions),
            ..Self::default()
        };
    }

    pub fn questions(&self) -> Option<&[QuizQuestion]> {
        self.questions.as_deref()
    }

    pub fn selected_answers(&self) -> &BTreeMap<usize, String> {
        &self.selected_answers
    }

    pub fn selected_answer(&self, index: usize) -> Option<&str> {
        self.selected_answers.get(&index).map(String::as_str)
    }

    pub fn score(&self) -> Option<f64> {
        self.score
    }

    pub fn is_submitted(&self) -> bool {
        self.is_submitted
    }

    pub fn answered_count(&self) -> usize {
        self.selected_answers.len()
    }

    /// 记录作答
    ///
    /// 已提交后或题号无效时不做任何修改，返回 `false`
    pub fn record_answer(&mut self, index: usize, option: impl Into<String>) -> bool {
        if self.is_submitted {
            return false;
        }
        let in_range = self
            .questions
            .as_ref()
            .map_or(false, |questions| index < questions.len());
        if !in_range {
            return false;
        }
        self.selected_answers.insert(index, option.into());
        true
    }

    /// 提交并计算得分
    ///
    /// 没有题目时返回 `None`；重复提交会用同一份作答重新计算出相同得分
    pub fn submit(&mut self) -> Option<f64> {
        let questions = self.questions.as_ref().filter(|q| !q.is_empty())?;

        let correct = questions
            .iter()
            .enumerate()
            .filter(|(index, question)| {
                self.selected_answers.get(index) == Some(&question.correct_answer)
            })
            .count();

        let score = 100.0 * correct as f64 / questions.len() as f64;
        self.score = Some(score);
        self.is_submitted = true;
        Some(score)
    }

    /// 提交后判断某题是否答对
    pub fn is_correct(&self, index: usize) -> Option<bool> {
        if !self.is_submitted {
            return None;
        }
        let question = self.questions.as_ref()?.get(index)?;
        Some(self.selected_answer(index) == Some(question.correct_answer.as_str()))
    }

    /// 得分评语
    pub fn score_message(&self) -> Option<&'static str> {
        self.score.map(|score| {
            if score >= PASSING_SCORE {
                "¡Excelente trabajo!"
            } else {
                "Sigue practicando, ¡lo harás mejor!"
            }
        })
    }

    /// 恢复初始状态
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(answer: &str) -> QuizQuestion {
        QuizQuestion {
            question: format!("¿Respuesta {}?", answer),
            options: vec![
                "A".to_string(),
                "B".to_string(),
                "C".to_string(),
                "D".to_string(),
            ],
            correct_answer: answer.to_string(),
            justification: String::new(),
        }
    }

    fn loaded() -> QuizState {
        let mut state = QuizState::new();
        state.load(vec![question("A"), question("B"), question("C"), question("D")]);
        state
    }

    #[test]
    fn test_three_of_four_scores_75() {
        let mut state = loaded();
        state.record_answer(0, "A");
        state.record_answer(1, "B");
        state.record_answer(2, "C");
        state.record_answer(3, "A");

        assert_eq!(state.submit(), Some(75.0));
        assert_eq!(state.score(), Some(75.0));
        assert!(state.is_submitted());
        assert_eq!(state.is_correct(3), Some(false));
        assert_eq!(state.score_message(), Some("¡Excelente trabajo!"));
    }

    #[test]
    fn test_unanswered_counts_as_wrong() {
        let mut state = loaded();
        state.record_answer(0, "A");
        assert_eq!(state.submit(), Some(25.0));
        assert_eq!(
            state.score_message(),
            Some("Sigue practicando, ¡lo harás mejor!")
        );
    }

    #[test]
    fn test_strict_equality() {
        let mut state = loaded();
        state.record_answer(0, "a");
        state.record_answer(1, " B");
        assert_eq!(state.submit(), Some(0.0));
    }

    #[test]
    fn test_answers_frozen_after_submit() {
        let mut state = loaded();
        state.record_answer(0, "A");
        let first = state.submit();

        assert!(!state.record_answer(0, "B"));
        assert!(!state.record_answer(1, "B"));
        assert_eq!(state.selected_answer(0), Some("A"));
        assert_eq!(state.submit(), first);
    }

    #[test]
    fn test_upsert_and_out_of_range() {
        let mut state = loaded();
        assert!(state.record_answer(0, "B"));
        assert!(state.record_answer(0, "A"));
        assert!(!state.record_answer(4, "A"));
        assert_eq!(state.answered_count(), 1);
        assert_eq!(state.selected_answer(0), Some("A"));
    }

    #[test]
    fn test_submit_requires_questions() {
        let mut state = QuizState::new();
        assert_eq!(state.submit(), None);
        assert!(!state.is_submitted());
        assert!(!state.record_answer(0, "A"));
    }

    #[test]
    fn test_reset() {
        let mut state = loaded();
        state.record_answer(0, "A");
        state.submit();
        state.reset();

        assert!(state.questions().is_none());
        assert!(state.selected_answers().is_empty());
        assert!(state.score().is_none());
        assert!(!state.is_submitted());
        assert_eq!(state, QuizState::default());
    }
}
