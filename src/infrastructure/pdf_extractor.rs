//! PDF 文本提取 - 基础设施层
//!
//! 只暴露"PDF 字节 → 按页文本"的能力：
//! - `TextLayerExtractor`：读取文本层（pdf-extract）
//! - `OcrExtractor`：逐页渲染（pdftoppm）后识别（tesseract）
//! - `AutoExtractor`：文本层为空或失败时退回 OCR

use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::{Config, ExtractionMode};
use crate::error::ExtractionError;
use crate::models::PageText;
use crate::utils::CancelSignal;

/// 逐页进度回调 `(当前页, 总页数)`
pub type PageProgress<'a> = &'a mut (dyn FnMut(usize, usize) + Send);

/// 文本提取器
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(
        &self,
        pdf_bytes: &[u8],
        cancel: &CancelSignal,
        progress: PageProgress<'_>,
    ) -> Result<Vec<PageText>, ExtractionError>;
}

/// 根据配置创建提取器
pub fn build_extractor(config: &Config) -> Arc<dyn TextExtractor> {
    let timeout = Duration::from_secs(config.extraction_timeout_secs);
    let text: Arc<dyn TextExtractor> = Arc::new(TextLayerExtractor::new(timeout));
    let ocr: Arc<dyn TextExtractor> = Arc::new(OcrExtractor::new(
        config.ocr_dpi(),
        config.ocr_language.clone(),
        timeout,
    ));

    match config.extraction_mode {
        ExtractionMode::Text => text,
        ExtractionMode::Ocr => ocr,
        ExtractionMode::Auto => Arc::new(AutoExtractor::new(text, ocr)),
    }
}

/// 读取 PDF 页数（不提取文字）
pub async fn count_pages(pdf_bytes: &[u8], timeout: Duration) -> Result<usize, ExtractionError> {
    let bytes = pdf_bytes.to_vec();
    run_blocking(timeout, move || {
        let document = lopdf::Document::load_mem(&bytes)
            .map_err(|e| ExtractionError::Pdf(e.to_string()))?;
        Ok(document.get_pages().len())
    })
    .await
}

async fn run_blocking<T, F>(timeout: Duration, f: F) -> Result<T, ExtractionError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ExtractionError> + Send + 'static,
{
    tokio::time::timeout(timeout, tokio::task::spawn_blocking(f))
        .await
        .map_err(|_| ExtractionError::Timeout {
            secs: timeout.as_secs(),
        })?
        .map_err(|e| ExtractionError::Task(e.to_string()))?
}

// ========== 文本层 ==========

pub struct TextLayerExtractor {
    timeout: Duration,
}

impl TextLayerExtractor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl TextExtractor for TextLayerExtractor {
    async fn extract(
        &self,
        pdf_bytes: &[u8],
        cancel: &CancelSignal,
        _progress: PageProgress<'_>,
    ) -> Result<Vec<PageText>, ExtractionError> {
        if cancel.is_cancelled() {
            return Err(ExtractionError::Cancelled);
        }

        let bytes = pdf_bytes.to_vec();
        let page_texts = run_blocking(self.timeout, move || {
            pdf_extract::extract_text_from_mem_by_pages(&bytes)
                .map_err(|e| ExtractionError::Pdf(e.to_string()))
        })
        .await?;

        let pages: Vec<PageText> = page_texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| PageText::new(i + 1, text))
            .collect();

        info!("📄 Texto extraído de {} páginas", pages.len());
        Ok(pages)
    }
}

// ========== OCR ==========

/// 调用外部 `pdftoppm` 与 `tesseract` 的 OCR 提取器
///
/// 每个外部进程都受 `timeout` 限制，取消或超时时进程被终止
pub struct OcrExtractor {
    dpi: u32,
    language: String,
    timeout: Duration,
}

impl OcrExtractor {
    pub fn new(dpi: u32, language: impl Into<String>, timeout: Duration) -> Self {
        Self {
            dpi,
            language: language.into(),
            timeout,
        }
    }

    /// 渲染单页为 PNG，返回图片路径
    async fn render_page(
        &self,
        pdf_path: &Path,
        work_dir: &Path,
        page: usize,
        cancel: &CancelSignal,
    ) -> Result<PathBuf, ExtractionError> {
        let prefix = work_dir.join(format!("page-{}", page));
        let mut command = Command::new("pdftoppm");
        command
            .arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-f")
            .arg(page.to_string())
            .arg("-l")
            .arg(page.to_string())
            .arg("-singlefile")
            .arg(pdf_path)
            .arg(&prefix);

        self.run_tool(command, "pdftoppm", page, cancel).await?;
        Ok(prefix.with_extension("png"))
    }

    /// 识别单张图片
    async fn recognize(
        &self,
        image: &Path,
        page: usize,
        cancel: &CancelSignal,
    ) -> Result<String, ExtractionError> {
        let mut command = Command::new("tesseract");
        command.arg(image).arg("stdout").arg("-l").arg(&self.language);

        let output = self.run_tool(command, "tesseract", page, cancel).await?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// 运行外部命令：超时或取消时终止进程
    async fn run_tool(
        &self,
        mut command: Command,
        tool: &str,
        page: usize,
        cancel: &CancelSignal,
    ) -> Result<Output, ExtractionError> {
        command.kill_on_drop(true);
        let running = tokio::time::timeout(self.timeout, command.output());

        let output = tokio::select! {
            _ = cancel.cancelled() => return Err(ExtractionError::Cancelled),
            result = running => result
                .map_err(|_| ExtractionError::Timeout { secs: self.timeout.as_secs() })?
                .map_err(|e| ExtractionError::Ocr {
                    page,
                    message: format!("no se pudo ejecutar {}: {}", tool, e),
                })?,
        };

        if !output.status.success() {
            return Err(ExtractionError::Ocr {
                page,
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }
}

#[async_trait]
impl TextExtractor for OcrExtractor {
    async fn extract(
        &self,
        pdf_bytes: &[u8],
        cancel: &CancelSignal,
        progress: PageProgress<'_>,
    ) -> Result<Vec<PageText>, ExtractionError> {
        let page_count = count_pages(pdf_bytes, self.timeout).await?;

        let work_dir = tempfile::tempdir()?;
        let pdf_path = work_dir.path().join("input.pdf");
        tokio::fs::write(&pdf_path, pdf_bytes).await?;

        let mut pages = Vec::with_capacity(page_count);
        for page in 1..=page_count {
            if cancel.is_cancelled() {
                return Err(ExtractionError::Cancelled);
            }
            progress(page, page_count);

            let image = self
                .render_page(&pdf_path, work_dir.path(), page, cancel)
                .await?;
            let text = self.recognize(&image, page, cancel).await?;
            if let Err(e) = tokio::fs::remove_file(&image).await {
                debug!("删除临时图片失败 {}: {}", image.display(), e);
            }

            pages.push(PageText::new(page, text));
        }

        Ok(pages)
    }
}

// ========== 自动 ==========

/// 先读文本层，没有可用文字时改用 OCR
pub struct AutoExtractor {
    text: Arc<dyn TextExtractor>,
    ocr: Arc<dyn TextExtractor>,
}

impl AutoExtractor {
    pub fn new(text: Arc<dyn TextExtractor>, ocr: Arc<dyn TextExtractor>) -> Self {
        Self { text, ocr }
    }
}

#[async_trait]
impl TextExtractor for AutoExtractor {
    async fn extract(
        &self,
        pdf_bytes: &[u8],
        cancel: &CancelSignal,
        progress: PageProgress<'_>,
    ) -> Result<Vec<PageText>, ExtractionError> {
        match self.text.extract(pdf_bytes, cancel, &mut *progress).await {
            Ok(pages) if pages.iter().any(|p| !p.is_blank()) => Ok(pages),
            Ok(_) => {
                info!("📷 El PDF no tiene capa de texto, se usará OCR");
                self.ocr.extract(pdf_bytes, cancel, progress).await
            }
            Err(ExtractionError::Cancelled) => Err(ExtractionError::Cancelled),
            Err(e) => {
                warn!("⚠️ Falló la extracción de texto ({}), se intentará OCR", e);
                self.ocr.extract(pdf_bytes, cancel, progress).await
            }
        }
    }
}
