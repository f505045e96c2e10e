//! 讲解生成服务 - 业务能力层
//!
//! 把"一张题目截图"或"一段 OCR 文本"变成 `{hint, story}`。
//! 只负责一次请求；重试和 OCR 兜底由流程层决定。

use std::path::PathBuf;

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{AppError, AppResult, LlmError};
use crate::models::{Explanation, QuestionId};
use crate::services::llm_service::{parse_json_output, LanguageModel, ModelRequest};
use crate::utils::logging::truncate_text;

const MAX_OUTPUT_TOKENS: u32 = 500;

/// 空回复时原始响应的保存文件名（位于工作目录）
pub const EMPTY_RESPONSE_DUMP: &str = "openai_empty_response.json";

fn explanation_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "hint": { "type": "string" },
            "story": { "type": "string" }
        },
        "required": ["hint", "story"]
    })
}

pub fn image_prompt(id: QuestionId, answer: char) -> String {
    format!(
        "You are a kind math tutor for a 10-year-old. \
         The image shows question {id} from a German Kangaroo math contest. \
         Translate the question to English internally. \
         The correct answer letter is {answer}. \
         Return JSON with keys \"hint\" and \"story\". \
         The hint must be 1-2 sentences, specific to this question, and must NOT reveal the answer. \
         The story must be 2-4 sentences, explain the reasoning, and may mention the answer. \
         Return ONLY JSON."
    )
}

pub fn ocr_text_prompt(id: QuestionId, answer: char, ocr_text: &str) -> String {
    format!(
        "You are a kind math tutor for a 10-year-old. \
         The text below is OCR for question {id} from a German Kangaroo contest. \
         Translate to English internally. \
         The correct answer letter is {answer}. \
         Return JSON with keys \"hint\" and \"story\". \
         The hint must be 1-2 sentences and must NOT reveal the answer. \
         The story must be 2-4 sentences and may mention the answer. \
         Return ONLY JSON.\n\n\
         OCR TEXT:\n{ocr_text}"
    )
}

/// 讲解生成服务
pub struct Explainer<M> {
    model: M,
    /// 空回复时保存原始响应的位置
    empty_dump_path: Option<PathBuf>,
}

impl<M: LanguageModel> Explainer<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            empty_dump_path: None,
        }
    }

    pub fn with_empty_dump(mut self, path: impl Into<PathBuf>) -> Self {
        self.empty_dump_path = Some(path.into());
        self
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// 看图讲解（带 JSON Schema）
    pub async fn from_image(
        &self,
        id: QuestionId,
        answer: char,
        image_data_url: &str,
    ) -> AppResult<Explanation> {
        let request = ModelRequest::text(image_prompt(id, answer))
            .with_image(image_data_url)
            .with_schema("explanation", explanation_schema())
            .with_max_output_tokens(MAX_OUTPUT_TOKENS);
        self.ask(&request).await
    }

    /// 根据 OCR 文本讲解（纯文本请求）
    pub async fn from_ocr_text(
        &self,
        id: QuestionId,
        answer: char,
        ocr_text: &str,
    ) -> AppResult<Explanation> {
        let request = ModelRequest::text(ocr_text_prompt(id, answer, ocr_text))
            .with_max_output_tokens(MAX_OUTPUT_TOKENS);
        self.ask(&request).await
    }

    async fn ask(&self, request: &ModelRequest) -> AppResult<Explanation> {
        let reply = self.model.respond(request).await?;

        if reply.output_text.is_empty() {
            self.dump_empty_reply(&reply.raw).await;
            return Err(LlmError::EmptyContent {
                model: self.model.model_name().to_string(),
            }
            .into());
        }
        debug!("模型回复: {}", truncate_text(&reply.output_text, 120));

        let value = parse_json_output(&reply.output_text)?;
        serde_json::from_value::<Explanation>(value).map_err(|_| {
            AppError::from(LlmError::JsonParseFailed {
                response: truncate_text(&reply.output_text, 200),
            })
        })
    }

    /// 写调试文件失败只记日志
    async fn dump_empty_reply(&self, raw: &Value) {
        let Some(path) = &self.empty_dump_path else {
            return;
        };
        let result = async {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let pretty = serde_json::to_string_pretty(raw).unwrap_or_default();
            tokio::fs::write(path, pretty).await
        }
        .await;

        match result {
            Ok(()) => warn!("⚠️ 模型返回空内容，原始响应已保存到 {}", path.display()),
            Err(e) => warn!("⚠️ 无法保存空响应 ({}): {}", path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::llm_service::ModelReply;
    use std::cell::RefCell;

    struct CannedModel {
        replies: RefCell<Vec<ModelReply>>,
        requests: RefCell<Vec<ModelRequest>>,
    }

    impl CannedModel {
        fn new(texts: &[&str]) -> Self {
            Self {
                replies: RefCell::new(
                    texts
                        .iter()
                        .rev()
                        .map(|t| ModelReply {
                            output_text: t.to_string(),
                            raw: json!({ "output": [] }),
                        })
                        .collect(),
                ),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl LanguageModel for CannedModel {
        async fn respond(&self, request: &ModelRequest) -> AppResult<ModelReply> {
            self.requests.borrow_mut().push(request.clone());
            Ok(self.replies.borrow_mut().pop().expect("没有更多预设回复"))
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    fn id(s: &str) -> QuestionId {
        s.parse().unwrap()
    }

    #[test]
    fn test_prompts_mention_question_and_answer() {
        let prompt = image_prompt(id("B7"), 'D');
        assert!(prompt.contains("question B7 from a German Kangaroo math contest"));
        assert!(prompt.contains("The correct answer letter is D."));
        assert!(prompt.ends_with("Return ONLY JSON."));

        let prompt = ocr_text_prompt(id("C3"), 'A', "Wie viele?");
        assert!(prompt.contains("OCR for question C3"));
        assert!(prompt.ends_with("OCR TEXT:\nWie viele?"));
    }

    #[tokio::test]
    async fn test_from_image_parses_reply() {
        let model = CannedModel::new(&["{\"hint\": \"Look at the corners.\", \"story\": \"Four corners.\"}"]);
        let explainer = Explainer::new(&model);
        let explanation = explainer
            .from_image(id("A1"), 'C', "data:image/jpeg;base64,AA")
            .await
            .unwrap();
        assert_eq!(explanation.story, "Four corners.");

        let requests = model.requests.borrow();
        assert!(requests[0].schema.is_some());
        assert_eq!(requests[0].max_output_tokens, Some(500));
        assert!(requests[0].image_data_url.is_some());
    }

    #[tokio::test]
    async fn test_empty_reply_is_dumped_and_reported() {
        let dir = tempfile::tempdir().unwrap();
        let dump = dir.path().join(EMPTY_RESPONSE_DUMP);
        let model = CannedModel::new(&[""]);
        let explainer = Explainer::new(&model).with_empty_dump(&dump);

        let err = explainer.from_ocr_text(id("A2"), 'B', "text").await.unwrap_err();
        assert!(err.is_empty_content());
        let saved = std::fs::read_to_string(&dump).unwrap();
        assert!(saved.contains("\"output\""));
        assert!(model.requests.borrow()[0].schema.is_none());
    }

    #[tokio::test]
    async fn test_non_object_reply_is_parse_error() {
        let model = CannedModel::new(&["[1, 2, 3]"]);
        let err = Explainer::new(&model)
            .from_ocr_text(id("A2"), 'B', "text")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(LlmError::JsonParseFailed { .. })));
    }
}
