//! pdf-quiz - 从 PDF 生成选择题测验
//!
//! # 用法
//!
//! ```bash
//! # 生成 5 道题并在终端作答
//! pdf-quiz apuntes.pdf
//!
//! # 生成 10 道题，强制 OCR，直接导出不作答
//! pdf-quiz escaneado.pdf -n 10 --mode ocr --no-interactive --export-pdf quiz.pdf
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;

use pdf_quiz_generator::config::{Config, ExtractionMode};
use pdf_quiz_generator::presentation::{ExportChoice, TerminalQuiz};
use pdf_quiz_generator::services::exporter::{self, DEFAULT_JSON_FILE, DEFAULT_PDF_FILE};
use pdf_quiz_generator::utils::{logging, CancelSignal};
use pdf_quiz_generator::{QuizPipeline, QuizState};

/// Generador de cuestionarios a partir de un PDF.
#[derive(Parser)]
#[command(name = "pdf-quiz", version, about)]
struct Cli {
    /// Archivo PDF de entrada
    pdf: PathBuf,

    /// Número de preguntas a generar
    #[arg(short = 'n', long = "questions", default_value_t = 5,
          value_parser = clap::value_parser!(u16).range(1..=20))]
    questions: u16,

    /// Modo de extracción de texto
    #[arg(long, value_enum)]
    mode: Option<ExtractionMode>,

    /// Archivo de configuración TOML
    #[arg(long)]
    config: Option<PathBuf>,

    /// Exportar el cuestionario a JSON
    #[arg(long)]
    export_json: Option<PathBuf>,

    /// Exportar el cuestionario a PDF
    #[arg(long)]
    export_pdf: Option<PathBuf>,

    /// No responder el cuestionario en la terminal
    #[arg(long)]
    no_interactive: bool,

    /// Registro detallado
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(mode) = cli.mode {
        config.extraction_mode = mode;
    }
    config.verbose_logging |= cli.verbose;

    logging::init(config.verbose_logging);

    let mut pipeline = QuizPipeline::initialize(config)?;

    let cancel = CancelSignal::new();
    let generating = Arc::new(AtomicBool::new(false));
    spawn_ctrl_c_listener(cancel.clone(), generating.clone());

    let stdin = io::stdin();
    let mut terminal = TerminalQuiz::new(stdin.lock(), io::stdout());

    loop {
        generating.store(true, Ordering::SeqCst);
        let result = pipeline.run(&cli.pdf, cli.questions as usize, &cancel).await;
        generating.store(false, Ordering::SeqCst);

        let mut quiz = result?;
        terminal.show_partial_errors(&pipeline.processing_state().partial_errors)?;

        if cli.no_interactive {
            export_requested(&cli, &quiz).await?;
            return Ok(());
        }

        if terminal.run(&mut quiz)? {
            terminal.show_results(&quiz)?;
        }
        export_requested(&cli, &quiz).await?;

        let choice = terminal.ask_export()?;
        export_chosen(choice, &quiz).await?;

        if !terminal.ask_new_quiz()? {
            return Ok(());
        }
        quiz.reset();
    }
}

/// 生成期间 Ctrl-C 触发取消，其余时间直接退出
fn spawn_ctrl_c_listener(cancel: CancelSignal, generating: Arc<AtomicBool>) {
    tokio::spawn(async move {
        loop {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            if generating.load(Ordering::SeqCst) && !cancel.is_cancelled() {
                warn!("⛔ Cancelando el procesamiento...");
                cancel.cancel();
            } else {
                eprintln!();
                std::process::exit(130);
            }
        }
    });
}

/// 命令行参数指定的导出
async fn export_requested(cli: &Cli, quiz: &QuizState) -> Result<()> {
    let Some(questions) = quiz.questions() else {
        return Ok(());
    };
    if let Some(path) = &cli.export_json {
        write_json(path, questions, quiz.score()).await?;
    }
    if let Some(path) = &cli.export_pdf {
        write_pdf(path, questions, quiz.score()).await?;
    }
    Ok(())
}

/// 交互中选择的导出（使用默认文件名）
async fn export_chosen(choice: ExportChoice, quiz: &QuizState) -> Result<()> {
    let Some(questions) = quiz.questions() else {
        return Ok(());
    };
    if choice.json {
        write_json(Path::new(DEFAULT_JSON_FILE), questions, quiz.score()).await?;
        println!("Cuestionario guardado en {}", DEFAULT_JSON_FILE);
    }
    if choice.pdf {
        write_pdf(Path::new(DEFAULT_PDF_FILE), questions, quiz.score()).await?;
        println!("Cuestionario guardado en {}", DEFAULT_PDF_FILE);
    }
    Ok(())
}

async fn write_json(
    path: &Path,
    questions: &[pdf_quiz_generator::QuizQuestion],
    score: Option<f64>,
) -> Result<()> {
    exporter::write_json(path, questions, score)
        .await
        .with_context(|| format!("No se pudo exportar {}", path.display()))
}

async fn write_pdf(
    path: &Path,
    questions: &[pdf_quiz_generator::QuizQuestion],
    score: Option<f64>,
) -> Result<()> {
    exporter::write_pdf(path, questions, score)
        .await
        .with_context(|| format!("No se pudo exportar {}", path.display()))
}
