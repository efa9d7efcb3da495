//! LLM 服务 - 业务能力层
//!
//! 只负责"把一段文本变成模型的原始回答"，不关心分批和解析
//!
//! ## 技术栈
//! - Gemini：`reqwest` 直接调用 `generateContent`
//! - 其它兼容 OpenAI API 的服务：`async-openai`

use std::sync::Arc;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{Config, LlmProvider};
use crate::error::{ConfigError, LlmError};
use crate::models::GenerationRequest;
use crate::services::prompt::build_question_prompt;

/// 题目生成服务
///
/// 返回模型的原始文本，由调用方定位并解析其中的 JSON
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError>;

    /// 用于日志
    fn model_name(&self) -> &str;
}

/// 根据配置创建生成服务
pub fn build_generator(config: &Config) -> Result<Arc<dyn QuestionGenerator>, ConfigError> {
    let api_key = config
        .llm_api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .ok_or(ConfigError::MissingApiKey)?;

    let generator: Arc<dyn QuestionGenerator> = match config.llm_provider {
        LlmProvider::Gemini => Arc::new(GeminiService::new(
            api_key,
            &config.llm_api_base_url,
            &config.llm_model_name,
        )),
        LlmProvider::OpenAi => Arc::new(OpenAiService::new(
            &api_key,
            &config.llm_api_base_url,
            &config.llm_model_name,
        )),
    };
    Ok(generator)
}

// ========== Gemini ==========

/// Gemini `generateContent` 客户端
pub struct GeminiService {
    http: reqwest::Client,
    api_key: String,
    api_base_url: String,
    model_name: String,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    message: Option<String>,
}

impl GeminiService {
    pub fn new(api_key: impl Into<String>, api_base_url: &str, model_name: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            model_name: model_name.to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base_url, self.model_name
        )
    }
}

#[async_trait]
impl QuestionGenerator for GeminiService {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        let prompt = build_question_prompt(request);
        debug!(
            "调用 Gemini API，模型: {}，提示词长度: {} 字符",
            self.model_name,
            prompt.chars().count()
        );

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: &prompt }],
            }],
        };

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .ok()
                .and_then(|e| e.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("respuesta no válida")
                        .to_string()
                });
            warn!("Gemini API 返回 {}: {}", status, message);
            return Err(LlmError::api("Gemini", message));
        }

        let data: GenerateContentResponse = response.json().await?;

        data.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

// ========== OpenAI 兼容服务 ==========

/// 兼容 OpenAI chat completions 的客户端
pub struct OpenAiService {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl OpenAiService {
    pub fn new(api_key: &str, api_base_url: &str, model_name: &str) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: model_name.to_string(),
        }
    }

    /// 通用的 LLM 调用
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> Result<String, LlmError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.chars().count());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.7)
            .max_tokens(4096u32)
            .build()?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            LlmError::from(e)
        })?;

        debug!("LLM API 调用成功");

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|t| !t.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}

#[async_trait]
impl QuestionGenerator for OpenAiService {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        let prompt = build_question_prompt(request);
        self.send_to_llm(
            &prompt,
            Some("Eres un asistente que redacta cuestionarios de opción múltiple en español y responde solo con JSON."),
        )
        .await
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
