//! 错误类型
//!
//! 两类错误：
//! - 致命错误（`QuizError`）：中断整个流程，只向用户展示一条消息
//! - 批次错误（`LlmError`）：只影响单个批次，记录后继续
//!
//! 所有 Display 文本直接面向用户（西班牙语）

use thiserror::Error;

/// 致命错误
#[derive(Debug, Error)]
pub enum QuizError {
    /// 配置错误
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// 文本提取失败
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// PDF 页数超过上限
    #[error("El PDF tiene {pages} páginas. El máximo permitido es {max}.")]
    PageLimitExceeded { pages: usize, max: usize },

    /// 没有形成任何段落
    #[error("El OCR no pudo extraer texto significativo para formar segmentos.")]
    NoSegments,

    /// 所有批次都没有产出题目
    #[error("No se pudieron generar preguntas a partir del PDF. Revisa los errores de los lotes.")]
    NoQuestions { batch_errors: Vec<String> },

    /// 用户取消
    #[error("Proceso cancelado por el usuario.")]
    Cancelled,

    /// 文件读写失败
    #[error("Error de archivo ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 文本提取错误
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// PDF 解析失败
    #[error("Error al procesar el PDF: {0}")]
    Pdf(String),

    /// OCR 失败
    #[error("Error al realizar OCR en la página {page}: {message}")]
    Ocr { page: usize, message: String },

    /// 提取超时
    #[error("La extracción del PDF superó el tiempo límite de {secs} segundos.")]
    Timeout { secs: u64 },

    /// 后台任务失败
    #[error("Error interno durante la extracción: {0}")]
    Task(String),

    /// 临时文件读写失败
    #[error("Error de E/S durante la extracción: {0}")]
    Io(#[from] std::io::Error),

    /// 提取过程中被取消
    #[error("Extracción cancelada.")]
    Cancelled,
}

/// LLM 批次错误
///
/// Display 文本就是批次错误信息中冒号后面的部分
#[derive(Debug, Error)]
pub enum LlmError {
    /// 网络请求失败
    #[error("Error de red: {0}")]
    Request(String),

    /// 服务返回非 2xx
    #[error("Error API {provider}: {message}")]
    Api { provider: String, message: String },

    /// 响应中没有文本内容
    #[error("La respuesta de la API no contiene texto.")]
    EmptyContent,

    /// 单次调用超时
    #[error("La llamada a la API superó el tiempo límite de {secs} segundos.")]
    Timeout { secs: u64 },

    /// JSON 解析失败
    #[error("Error parseando JSON. Texto intentado: {snippet}...")]
    Parse { snippet: String },

    /// 有返回条目，但没有一条符合题目结构
    #[error("Ninguna de las {received} preguntas recibidas tiene un formato válido.")]
    NoValidQuestions { received: usize },

    /// 调用被取消
    #[error("Llamada cancelada.")]
    Cancelled,
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Request(err.to_string())
    }
}

impl From<async_openai::error::OpenAIError> for LlmError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        use async_openai::error::OpenAIError;
        match err {
            OpenAIError::ApiError(api) => LlmError::Api {
                provider: "OpenAI".to_string(),
                message: api.message,
            },
            other => LlmError::Request(other.to_string()),
        }
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 缺少 API 密钥
    #[error("Falta la clave de la API. Define la variable de entorno LLM_API_KEY.")]
    MissingApiKey,

    /// 环境变量解析失败
    #[error("La variable de entorno {var_name} tiene un valor no válido '{value}' (se esperaba {expected_type}).")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },

    /// 配置文件读取失败
    #[error("No se pudo leer el archivo de configuración {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// TOML 解析失败
    #[error("No se pudo interpretar el archivo de configuración {path}: {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// 取值非法
    #[error("Configuración no válida: {0}")]
    Invalid(String),
}

/// 导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Error al generar el JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Error al generar el PDF: {0}")]
    Pdf(String),

    #[error("Error al escribir {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<lopdf::Error> for ExportError {
    fn from(err: lopdf::Error) -> Self {
        ExportError::Pdf(err.to_string())
    }
}

// ========== 便捷构造函数 ==========

impl QuizError {
    /// 创建文件读写错误
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        QuizError::Io {
            path: path.into(),
            source,
        }
    }
}

impl LlmError {
    /// 创建 API 错误响应
    pub fn api(provider: impl Into<String>, message: impl Into<String>) -> Self {
        LlmError::Api {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_limit_message() {
        let err = QuizError::PageLimitExceeded {
            pages: 1200,
            max: 1000,
        };
        assert_eq!(
            err.to_string(),
            "El PDF tiene 1200 páginas. El máximo permitido es 1000."
        );
    }

    #[test]
    fn test_api_error_message() {
        let err = LlmError::api("Gemini", "quota exceeded");
        assert_eq!(err.to_string(), "Error API Gemini: quota exceeded");
    }
}
