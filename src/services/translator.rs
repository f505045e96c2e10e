//! 解析翻译服务 - 业务能力层
//!
//! 德语答案解析 → 给 10 岁孩子看的英文小故事，按批发送。

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{info, warn};

use crate::error::{AppResult, LlmError};
use crate::models::QuestionId;
use crate::services::llm_service::{parse_json_output, LanguageModel, ModelRequest};
use crate::utils::logging::truncate_text;

pub fn translate_prompt(batch_json: &str) -> String {
    format!(
        "Translate these German Kangaroo math solution explanations into English. \
         Rewrite them as short, friendly “story explanations” for a 10-year-old. \
         Keep each explanation to 2-4 sentences. Return only JSON with the same keys.\n\n\
         {batch_json}"
    )
}

pub struct Translator<M> {
    model: M,
    batch_size: usize,
}

impl<M: LanguageModel> Translator<M> {
    pub fn new(model: M, batch_size: usize) -> Self {
        Self {
            model,
            batch_size: batch_size.max(1),
        }
    }

    /// 按题号顺序分批翻译全部解析
    pub async fn translate_all(
        &self,
        solutions: &BTreeMap<QuestionId, String>,
    ) -> AppResult<BTreeMap<QuestionId, String>> {
        let items: Vec<(&QuestionId, &String)> = solutions.iter().collect();
        let total_batches = items.len().div_ceil(self.batch_size);
        let mut translated = BTreeMap::new();

        for (idx, chunk) in items.chunks(self.batch_size).enumerate() {
            let batch: BTreeMap<QuestionId, String> =
                chunk.iter().map(|(id, text)| (**id, (*text).clone())).collect();
            info!(
                "🌐 翻译第 {}/{} 批 ({} 条)",
                idx + 1,
                total_batches,
                batch.len()
            );
            translated.extend(self.translate_batch(&batch).await?);
        }

        Ok(translated)
    }

    async fn translate_batch(
        &self,
        batch: &BTreeMap<QuestionId, String>,
    ) -> AppResult<BTreeMap<QuestionId, String>> {
        let batch_json = serde_json::to_string(batch).map_err(|e| LlmError::JsonParseFailed {
            response: e.to_string(),
        })?;
        let reply = self
            .model
            .respond(&ModelRequest::text(translate_prompt(&batch_json)))
            .await?;

        if reply.output_text.is_empty() {
            return Err(LlmError::EmptyContent {
                model: self.model.model_name().to_string(),
            }
            .into());
        }

        let Value::Object(map) = parse_json_output(&reply.output_text)? else {
            return Err(LlmError::JsonParseFailed {
                response: truncate_text(&reply.output_text, 200),
            }
            .into());
        };

        let mut out = BTreeMap::new();
        for (key, value) in map {
            let Ok(id) = key.parse::<QuestionId>() else {
                warn!("⚠️ 翻译结果中有未知的键: {}", key);
                continue;
            };
            match value {
                Value::String(text) => {
                    out.insert(id, text);
                }
                other => warn!("⚠️ {} 的翻译不是字符串: {}", id, other),
            }
        }

        for id in batch.keys().filter(|id| !out.contains_key(*id)) {
            warn!("⚠️ 翻译结果缺少 {}", id);
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::llm_service::ModelReply;
    use std::cell::RefCell;

    /// 把每个德语解析原样加上前缀返回，顺便记录每批的键
    #[derive(Default)]
    struct EchoModel {
        batches: RefCell<Vec<Vec<String>>>,
        extra_key: bool,
    }

    impl LanguageModel for EchoModel {
        async fn respond(&self, request: &ModelRequest) -> AppResult<ModelReply> {
            let json_start = request.prompt.find('{').unwrap();
            let batch: BTreeMap<String, String> =
                serde_json::from_str(&request.prompt[json_start..]).unwrap();
            self.batches
                .borrow_mut()
                .push(batch.keys().cloned().collect());

            let mut reply: BTreeMap<String, String> = batch
                .into_iter()
                .map(|(k, v)| (k, format!("EN {}", v)))
                .collect();
            if self.extra_key {
                reply.insert("note".to_string(), "ignored".to_string());
            }
            Ok(ModelReply {
                output_text: format!("```json\n{}\n```", serde_json::to_string(&reply).unwrap()),
                raw: Value::Null,
            })
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    fn solutions(n: usize) -> BTreeMap<QuestionId, String> {
        QuestionId::all()
            .into_iter()
            .take(n)
            .map(|id| (id, format!("Lösung {}", id)))
            .collect()
    }

    #[tokio::test]
    async fn test_batches_of_eight_in_id_order() {
        let model = EchoModel::default();
        let translator = Translator::new(&model, 8);
        let input = solutions(10);

        let out = translator.translate_all(&input).await.unwrap();
        assert_eq!(out.len(), 10);
        assert_eq!(out[&"A1".parse().unwrap()], "EN Lösung A1");

        let batches = model.batches.borrow();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 8);
        assert_eq!(batches[1], vec!["A10".to_string(), "A9".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_keys_are_dropped() {
        let model = EchoModel {
            extra_key: true,
            ..EchoModel::default()
        };
        let out = Translator::new(&model, 8)
            .translate_all(&solutions(3))
            .await
            .unwrap();
        assert_eq!(out.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_input_sends_nothing() {
        let model = EchoModel::default();
        let out = Translator::new(&model, 8)
            .translate_all(&BTreeMap::new())
            .await
            .unwrap();
        assert!(out.is_empty());
        assert!(model.batches.borrow().is_empty());
    }

    struct SilentModel;

    impl LanguageModel for SilentModel {
        async fn respond(&self, _request: &ModelRequest) -> AppResult<ModelReply> {
            Ok(ModelReply {
                output_text: String::new(),
                raw: Value::Null,
            })
        }

        fn model_name(&self) -> &str {
            "silent"
        }
    }

    #[tokio::test]
    async fn test_empty_reply_is_error() {
        let err = Translator::new(SilentModel, 8)
            .translate_all(&solutions(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(LlmError::EmptyContent { .. })));
    }
}
