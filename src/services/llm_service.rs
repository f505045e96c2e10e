//! LLM 服务 - 业务能力层
//!
//! 只负责"把一个提示词（可带一张图片）发给模型并拿回文本"，不关心题目和流程。
//!
//! ## 技术栈
//! - 默认走 OpenAI Responses API（`reqwest` 直接发 JSON）
//! - `LLM_BACKEND=chat` 时使用 `async-openai` 的 Chat Completions，
//!   兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
        CreateChatCompletionRequestArgs, ImageDetail, ImageUrl,
    },
    Client,
};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::{Config, LlmBackend};
use crate::error::{AppError, AppResult, LlmError};
use crate::utils::logging::truncate_text;

const TEMPERATURE: f32 = 0.2;

/// 要求模型按此 JSON Schema 输出
#[derive(Debug, Clone)]
pub struct JsonSchema {
    pub name: String,
    pub schema: Value,
}

/// 一次模型请求
#[derive(Debug, Clone, Default)]
pub struct ModelRequest {
    pub prompt: String,
    /// `data:image/...;base64,...`
    pub image_data_url: Option<String>,
    pub schema: Option<JsonSchema>,
    pub max_output_tokens: Option<u32>,
}

impl ModelRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_image(mut self, data_url: impl Into<String>) -> Self {
        self.image_data_url = Some(data_url.into());
        self
    }

    pub fn with_schema(mut self, name: impl Into<String>, schema: Value) -> Self {
        self.schema = Some(JsonSchema {
            name: name.into(),
            schema,
        });
        self
    }

    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }
}

/// 模型回复：拼好的文本 + 原始响应（用于排查空回复）
#[derive(Debug, Clone)]
pub struct ModelReply {
    pub output_text: String,
    pub raw: Value,
}

/// 语言模型能力
///
/// 流程层只依赖这个 trait，测试里可以换成脚本化的假模型。
#[allow(async_fn_in_trait)]
pub trait LanguageModel {
    async fn respond(&self, request: &ModelRequest) -> AppResult<ModelReply>;

    fn model_name(&self) -> &str;
}

impl<T: LanguageModel> LanguageModel for &T {
    async fn respond(&self, request: &ModelRequest) -> AppResult<ModelReply> {
        (**self).respond(request).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// OpenAI Responses API
pub struct ResponsesApi {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model_name: String,
}

impl ResponsesApi {
    pub fn new(config: &Config) -> AppResult<Self> {
        let api_key = config.require_api_key()?.to_string();
        Ok(Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}/responses", config.llm_api_base_url.trim_end_matches('/')),
            api_key,
            model_name: config.llm_model_name.clone(),
        })
    }

    /// 构建请求体；`with_schema` 为 false 时去掉 `text.format`
    fn build_body(&self, request: &ModelRequest, with_schema: bool) -> Value {
        let input = match &request.image_data_url {
            Some(url) => json!([{
                "role": "user",
                "content": [
                    { "type": "input_text", "text": request.prompt },
                    { "type": "input_image", "image_url": url, "detail": "high" }
                ]
            }]),
            None => Value::String(request.prompt.clone()),
        };

        let mut body = json!({
            "model": self.model_name,
            "input": input,
            "temperature": TEMPERATURE,
        });
        if let Some(tokens) = request.max_output_tokens {
            body["max_output_tokens"] = json!(tokens);
        }
        if let (true, Some(schema)) = (with_schema, &request.schema) {
            body["text"] = json!({
                "format": {
                    "type": "json_schema",
                    "name": schema.name,
                    "schema": schema.schema,
                }
            });
        }
        body
    }

    async fn post(&self, body: &Value) -> AppResult<Value> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::llm_api_failed(&self.model_name, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::BadStatus {
                status: status.as_u16(),
                body: truncate_text(&body, 500),
            }
            .into());
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AppError::llm_api_failed(&self.model_name, e))
    }
}

impl LanguageModel for ResponsesApi {
    async fn respond(&self, request: &ModelRequest) -> AppResult<ModelReply> {
        debug!(
            "调用 Responses API，模型: {}，提示词 {} 字符，图片: {}",
            self.model_name,
            request.prompt.chars().count(),
            request.image_data_url.is_some()
        );

        let raw = match self.post(&self.build_body(request, true)).await {
            Err(AppError::Llm(LlmError::BadStatus { status, body })) if request.schema.is_some() => {
                warn!("⚠️ 带 JSON Schema 的请求被拒绝 ({}): {}，去掉 Schema 重试", status, body);
                self.post(&self.build_body(request, false)).await?
            }
            other => other?,
        };

        Ok(ModelReply {
            output_text: extract_output_text(&raw),
            raw,
        })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// 兼容 OpenAI 的 Chat Completions 接口
///
/// 不发送 `response_format`，
/// JSON 输出靠提示词约束，再由 [`parse_json_output`] 兜底。
pub struct ChatCompletionsApi {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl ChatCompletionsApi {
    pub fn new(config: &Config) -> AppResult<Self> {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.require_api_key()?)
            .with_api_base(&config.llm_api_base_url);

        Ok(Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
        })
    }

    fn build_user_message(&self, request: &ModelRequest) -> anyhow::Result<ChatCompletionRequestMessage> {
        let user_msg = match &request.image_data_url {
            Some(url) => {
                let parts = vec![
                    ChatCompletionRequestUserMessageContentPart::Text(
                        ChatCompletionRequestMessageContentPartText {
                            text: request.prompt.clone(),
                        },
                    ),
                    ChatCompletionRequestUserMessageContentPart::ImageUrl(
                        ChatCompletionRequestMessageContentPartImage {
                            image_url: ImageUrl {
                                url: url.clone(),
                                detail: Some(ImageDetail::High),
                            },
                        },
                    ),
                ];
                ChatCompletionRequestUserMessageArgs::default()
                    .content(ChatCompletionRequestUserMessageContent::Array(parts))
                    .build()?
            }
            None => ChatCompletionRequestUserMessageArgs::default()
                .content(request.prompt.as_str())
                .build()?,
        };
        Ok(ChatCompletionRequestMessage::User(user_msg))
    }
}

impl LanguageModel for ChatCompletionsApi {
    async fn respond(&self, request: &ModelRequest) -> AppResult<ModelReply> {
        debug!("调用 Chat Completions API，模型: {}", self.model_name);

        let message = self
            .build_user_message(request)
            .map_err(|e| AppError::llm_api_failed(&self.model_name, e))?;

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model_name)
            .messages(vec![message])
            .temperature(TEMPERATURE);
        if let Some(tokens) = request.max_output_tokens {
            args.max_completion_tokens(tokens);
        }
        let chat_request = args
            .build()
            .map_err(|e| AppError::llm_api_failed(&self.model_name, e))?;

        let response = self.client.chat().create(chat_request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            AppError::llm_api_failed(&self.model_name, e)
        })?;

        let output_text = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .unwrap_or_default()
            .trim()
            .to_string();

        Ok(ModelReply {
            output_text,
            raw: serde_json::to_value(&response).unwrap_or(Value::Null),
        })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// 按配置选择的模型客户端
pub enum ModelClient {
    Responses(ResponsesApi),
    Chat(ChatCompletionsApi),
}

impl ModelClient {
    pub fn from_config(config: &Config) -> AppResult<Self> {
        Ok(match config.llm_backend {
            LlmBackend::Responses => ModelClient::Responses(ResponsesApi::new(config)?),
            LlmBackend::Chat => ModelClient::Chat(ChatCompletionsApi::new(config)?),
        })
    }
}

impl LanguageModel for ModelClient {
    async fn respond(&self, request: &ModelRequest) -> AppResult<ModelReply> {
        match self {
            ModelClient::Responses(api) => api.respond(request).await,
            ModelClient::Chat(api) => api.respond(request).await,
        }
    }

    fn model_name(&self) -> &str {
        match self {
            ModelClient::Responses(api) => api.model_name(),
            ModelClient::Chat(api) => api.model_name(),
        }
    }
}

/// 从 Responses API 的原始响应中拼出文本
///
/// 既收集顶层 `output_text` 条目，也收集 `message` 条目里的 `output_text` 片段。
pub fn extract_output_text(raw: &Value) -> String {
    let mut text = String::new();
    let Some(items) = raw.get("output").and_then(Value::as_array) else {
        return text;
    };

    let is_output_text = |v: &Value| v.get("type").and_then(Value::as_str) == Some("output_text");
    let text_of = |v: &Value| v.get("text").and_then(Value::as_str).unwrap_or_default().to_string();

    for item in items {
        if is_output_text(item) {
            text.push_str(&text_of(item));
        }
        if item.get("type").and_then(Value::as_str) == Some("message") {
            let parts = item.get("content").and_then(Value::as_array);
            for part in parts.into_iter().flatten() {
                if is_output_text(part) {
                    text.push_str(&text_of(part));
                }
            }
        }
    }

    text.trim().to_string()
}

/// 解析模型输出的 JSON；直接解析失败时取第一个 `{` 到最后一个 `}` 之间的内容
pub fn parse_json_output(output_text: &str) -> AppResult<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(output_text) {
        return Ok(value);
    }

    let parse_failed = || LlmError::JsonParseFailed {
        response: truncate_text(output_text, 200),
    };

    let (Some(start), Some(end)) = (output_text.find('{'), output_text.rfind('}')) else {
        return Err(parse_failed().into());
    };
    if end < start {
        return Err(parse_failed().into());
    }

    serde_json::from_str(&output_text[start..=end]).map_err(|_| parse_failed().into())
}
