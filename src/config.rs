//! 程序配置
//!
//! 优先级：默认值 < TOML 配置文件 < 环境变量 < 命令行参数

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;

/// LLM 服务提供方
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Google Gemini `generateContent` 接口
    Gemini,
    /// 兼容 OpenAI chat completions 的服务
    OpenAi,
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(LlmProvider::Gemini),
            "openai" => Ok(LlmProvider::OpenAi),
            other => Err(format!("proveedor desconocido: {}", other)),
        }
    }
}

/// 文本提取方式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// 只读取文本层
    Text,
    /// 每页渲染后做 OCR
    Ocr,
    /// 先读文本层，没有文字时退回 OCR
    Auto,
}

impl FromStr for ExtractionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(ExtractionMode::Text),
            "ocr" => Ok(ExtractionMode::Ocr),
            "auto" => Ok(ExtractionMode::Auto),
            other => Err(format!("modo de extracción desconocido: {}", other)),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_provider: LlmProvider,
    /// 不提供默认值，必须来自环境变量或配置文件
    pub llm_api_key: Option<String>,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 单次调用的超时时间（秒）
    pub request_timeout_secs: u64,

    // --- 分批配置 ---
    /// 每次 API 调用最多生成的题目数
    pub questions_per_api_call: usize,
    /// 每个段落最多包含的页数
    pub max_pages_per_segment: usize,
    /// 每个段落最多包含的字符数
    pub max_chars_per_segment: usize,
    /// 允许处理的 PDF 最大页数
    pub max_pdf_pages: usize,

    // --- 提取配置 ---
    pub extraction_mode: ExtractionMode,
    /// tesseract 语言代码
    pub ocr_language: String,
    /// 渲染倍率（1.0 = 72 dpi）
    pub ocr_scale: f32,
    /// PDF 解析超时时间（秒）
    pub extraction_timeout_secs: u64,

    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_provider: LlmProvider::Gemini,
            llm_api_key: None,
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            llm_model_name: "gemini-1.5-flash".to_string(),
            request_timeout_secs: 90,
            questions_per_api_call: 5,
            max_pages_per_segment: 20,
            max_chars_per_segment: 30_000,
            max_pdf_pages: 1000,
            extraction_mode: ExtractionMode::Auto,
            ocr_language: "spa".to_string(),
            ocr_scale: 2.0,
            extraction_timeout_secs: 120,
            verbose_logging: false,
        }
    }
}

/// TOML 配置文件的内容，所有字段可省略
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    llm_provider: Option<LlmProvider>,
    llm_api_key: Option<String>,
    llm_api_base_url: Option<String>,
    llm_model_name: Option<String>,
    request_timeout_secs: Option<u64>,
    questions_per_api_call: Option<usize>,
    max_pages_per_segment: Option<usize>,
    max_chars_per_segment: Option<usize>,
    max_pdf_pages: Option<usize>,
    extraction_mode: Option<ExtractionMode>,
    ocr_language: Option<String>,
    ocr_scale: Option<f32>,
    extraction_timeout_secs: Option<u64>,
    verbose_logging: Option<bool>,
}

impl Config {
    /// 从环境变量加载（未设置的字段使用默认值）
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().merge_env()
    }

    /// 从 TOML 文件加载，再用环境变量覆盖
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        base.merge_env()
    }

    /// 从 TOML 文件加载
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })
    }

    /// 解析 TOML 文本
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let file: FileConfig = toml::from_str(content)?;
        let default = Self::default();
        Ok(Self {
            llm_provider: file.llm_provider.unwrap_or(default.llm_provider),
            llm_api_key: file.llm_api_key.or(default.llm_api_key),
            llm_api_base_url: file.llm_api_base_url.unwrap_or(default.llm_api_base_url),
            llm_model_name: file.llm_model_name.unwrap_or(default.llm_model_name),
            request_timeout_secs: file
                .request_timeout_secs
                .unwrap_or(default.request_timeout_secs),
            questions_per_api_call: file
                .questions_per_api_call
                .unwrap_or(default.questions_per_api_call),
            max_pages_per_segment: file
                .max_pages_per_segment
                .unwrap_or(default.max_pages_per_segment),
            max_chars_per_segment: file
                .max_chars_per_segment
                .unwrap_or(default.max_chars_per_segment),
            max_pdf_pages: file.max_pdf_pages.unwrap_or(default.max_pdf_pages),
            extraction_mode: file.extraction_mode.unwrap_or(default.extraction_mode),
            ocr_language: file.ocr_language.unwrap_or(default.ocr_language),
            ocr_scale: file.ocr_scale.unwrap_or(default.ocr_scale),
            extraction_timeout_secs: file
                .extraction_timeout_secs
                .unwrap_or(default.extraction_timeout_secs),
            verbose_logging: file.verbose_logging.unwrap_or(default.verbose_logging),
        })
    }

    /// 用环境变量覆盖当前配置
    fn merge_env(self) -> Result<Self, ConfigError> {
        Ok(Self {
            llm_provider: env_parse("LLM_PROVIDER", "gemini|openai")?.unwrap_or(self.llm_provider),
            llm_api_key: env_string("LLM_API_KEY").or(self.llm_api_key),
            llm_api_base_url: env_string("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: env_string("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.request_timeout_secs),
            questions_per_api_call: env_parse("QUESTIONS_PER_API_CALL", "usize")?
                .unwrap_or(self.questions_per_api_call),
            max_pages_per_segment: env_parse("MAX_PAGES_PER_SEGMENT", "usize")?
                .unwrap_or(self.max_pages_per_segment),
            max_chars_per_segment: env_parse("MAX_CHARS_PER_SEGMENT", "usize")?
                .unwrap_or(self.max_chars_per_segment),
            max_pdf_pages: env_parse("MAX_PDF_PAGES_ALLOWED", "usize")?
                .unwrap_or(self.max_pdf_pages),
            extraction_mode: env_parse("EXTRACTION_MODE", "text|ocr|auto")?
                .unwrap_or(self.extraction_mode),
            ocr_language: env_string("OCR_LANGUAGE").unwrap_or(self.ocr_language),
            ocr_scale: env_parse("OCR_SCALE", "f32")?.unwrap_or(self.ocr_scale),
            extraction_timeout_secs: env_parse("EXTRACTION_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.extraction_timeout_secs),
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool")?
                .unwrap_or(self.verbose_logging),
        })
    }

    /// 检查配置是否可用于生成题目
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm_api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            return Err(ConfigError::MissingApiKey);
        }
        let limits = [
            ("questions_per_api_call", self.questions_per_api_call),
            ("max_pages_per_segment", self.max_pages_per_segment),
            ("max_chars_per_segment", self.max_chars_per_segment),
            ("max_pdf_pages", self.max_pdf_pages),
        ];
        for (name, value) in limits {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{} debe ser mayor que 0", name)));
            }
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs debe ser mayor que 0".to_string(),
            ));
        }
        if !(self.ocr_scale > 0.0) {
            return Err(ConfigError::Invalid("ocr_scale debe ser positivo".to_string()));
        }
        Ok(())
    }

    /// OCR 渲染分辨率
    pub fn ocr_dpi(&self) -> u32 {
        (72.0 * self.ocr_scale).round() as u32
    }
}

fn env_string(var_name: &str) -> Option<String> {
    std::env::var(var_name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: FromStr>(var_name: &str, expected_type: &str) -> Result<Option<T>, ConfigError> {
    match env_string(var_name) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
    }
}
