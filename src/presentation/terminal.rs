//! 终端交互界面 - 展示层
//!
//! 负责展示题目、读取作答、显示结果和导出选项。
//! 输入输出都是泛型，测试中用内存缓冲代替终端。

use std::io::{self, BufRead, Write};

use crate::models::{QuizQuestion, QuizState};

/// 用户选择的导出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportChoice {
    pub json: bool,
    pub pdf: bool,
}

impl ExportChoice {
    pub fn is_empty(&self) -> bool {
        !self.json && !self.pdf
    }
}

/// 终端测验界面
pub struct TerminalQuiz<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalQuiz<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// 取回输出端（测试用）
    pub fn into_output(self) -> W {
        self.output
    }

    /// 显示部分批次错误
    pub fn show_partial_errors(&mut self, errors: &[String]) -> io::Result<()> {
        if errors.is_empty() {
            return Ok(());
        }
        writeln!(
            self.output,
            "\nSe generaron preguntas, pero {} lote(s) tuvieron errores:",
            errors.len()
        )?;
        for error in errors {
            writeln!(self.output, "  - {}", error)?;
        }
        Ok(())
    }

    /// 依次作答所有题目并提交
    ///
    /// # 返回
    /// 全部作答并提交后返回 `true`；输入提前结束时返回 `false`（不提交）
    pub fn run(&mut self, quiz: &mut QuizState) -> io::Result<bool> {
        let questions: Vec<QuizQuestion> = match quiz.questions() {
            Some(questions) if !questions.is_empty() => questions.to_vec(),
            _ => {
                writeln!(self.output, "No hay preguntas para mostrar.")?;
                return Ok(false);
            }
        };

        writeln!(self.output, "\n=== Cuestionario Generado ===")?;
        writeln!(self.output, "{} preguntas generadas", questions.len())?;

        for (index, question) in questions.iter().enumerate() {
            self.render_question(index, question)?;
            match self.read_option(question)? {
                Some(option) => {
                    quiz.record_answer(index, option);
                }
                None => {
                    writeln!(
                        self.output,
                        "\n{} de {} preguntas respondidas",
                        quiz.answered_count(),
                        questions.len()
                    )?;
                    return Ok(false);
                }
            }
        }

        writeln!(
            self.output,
            "\n{} de {} preguntas respondidas",
            quiz.answered_count(),
            questions.len()
        )?;
        quiz.submit();
        Ok(true)
    }

    /// 提交后的逐题反馈与总分
    pub fn show_results(&mut self, quiz: &QuizState) -> io::Result<()> {
        let Some(questions) = quiz.questions() else {
            return Ok(());
        };

        writeln!(self.output, "\n=== Resultados ===")?;
        for (index, question) in questions.iter().enumerate() {
            let verdict = match quiz.is_correct(index) {
                Some(true) => "Correcta",
                _ => "Incorrecta",
            };
            writeln!(self.output, "\nPregunta {}: {}", index + 1, verdict)?;
            writeln!(self.output, "{}", question.question)?;
            writeln!(
                self.output,
                "  Tu respuesta: {}",
                quiz.selected_answer(index).unwrap_or("(sin responder)")
            )?;
            writeln!(self.output, "  Respuesta correcta: {}", question.correct_answer)?;
            writeln!(self.output, "  Justificación: {}", question.justification)?;
        }

        if let (Some(score), Some(message)) = (quiz.score(), quiz.score_message()) {
            writeln!(self.output, "\nPuntuación Final: {:.1}%", score)?;
            writeln!(self.output, "{}", message)?;
        }
        Ok(())
    }

    /// 询问导出格式
    pub fn ask_export(&mut self) -> io::Result<ExportChoice> {
        loop {
            write!(
                self.output,
                "\n¿Exportar el cuestionario? [j] JSON, [p] PDF, [a] ambos, [n] no: "
            )?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                return Ok(ExportChoice::default());
            };
            let choice = match line.to_lowercase().as_str() {
                "j" | "json" => ExportChoice {
                    json: true,
                    pdf: false,
                },
                "p" | "pdf" => ExportChoice {
                    json: false,
                    pdf: true,
                },
                "a" | "ambos" => ExportChoice {
                    json: true,
                    pdf: true,
                },
                "n" | "no" | "" => ExportChoice::default(),
                _ => {
                    writeln!(self.output, "Opción no válida.")?;
                    continue;
                }
            };
            return Ok(choice);
        }
    }

    /// 是否生成新的测验
    pub fn ask_new_quiz(&mut self) -> io::Result<bool> {
        write!(self.output, "\n¿Generar un nuevo cuestionario? [s/n]: ")?;
        self.output.flush()?;
        Ok(matches!(
            self.read_line()?.as_deref().map(str::to_lowercase).as_deref(),
            Some("s" | "si" | "sí")
        ))
    }

    // ========== 辅助函数 ==========

    fn render_question(&mut self, index: usize, question: &QuizQuestion) -> io::Result<()> {
        writeln!(self.output, "\nPregunta {}", index + 1)?;
        writeln!(self.output, "{}", question.question)?;
        for (i, option) in question.options.iter().enumerate() {
            writeln!(self.output, "  {}) {}", QuizQuestion::option_label(i), option)?;
        }
        Ok(())
    }

    /// 读取一个选项（字母或序号），无效输入时重新询问
    fn read_option(&mut self, question: &QuizQuestion) -> io::Result<Option<String>> {
        let count = question.options.len();
        let last_label = QuizQuestion::option_label(count.saturating_sub(1));
        loop {
            write!(self.output, "Tu respuesta (a-{}): ", last_label)?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            match parse_option_index(&line, count) {
                Some(i) => return Ok(Some(question.options[i].clone())),
                None => writeln!(self.output, "Opción no válida, inténtalo de nuevo.")?,
            }
        }
    }

    /// 读取一行，输入结束时返回 `None`
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

/// 把 "a"/"B"/"3" 之类的输入转换成选项下标
fn parse_option_index(input: &str, count: usize) -> Option<usize> {
    let mut chars = input.chars();
    let first = chars.next()?;
    if chars.next().is_some() {
        return None;
    }

    let index = match first.to_ascii_lowercase() {
        c @ 'a'..='z' => (c as u8 - b'a') as usize,
        c @ '1'..='9' => (c as u8 - b'1') as usize,
        _ => return None,
    };
    (index < count).then_some(index)
}
