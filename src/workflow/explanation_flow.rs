//! 讲解生成流程 - 流程层
//!
//! 核心职责：定义"一道题"从截图到讲解的完整流程
//!
//! 流程顺序：
//! 1. 截图 → LLM（失败时再试一次）
//! 2. 回复为空或没有 story → OCR 截图 → 纯文本 LLM（只试一次）
//! 3. 仍然没有 story → 报错，整个运行终止

use std::path::Path;

use tracing::{info, warn};

use crate::error::{AppError, AppResult, LlmError};
use crate::infrastructure::{images, TextRecognizer};
use crate::models::Explanation;
use crate::services::{Explainer, LanguageModel};
use crate::utils::logging::truncate_text;
use crate::workflow::question_ctx::QuestionCtx;

/// 讲解生成流程
///
/// - 决定何时重试、何时走 OCR 兜底
/// - 不持有页面和目录，只拿到一张已经裁好的图片
pub struct ExplanationFlow<M, O> {
    explainer: Explainer<M>,
    recognizer: O,
    ocr_lang: String,
}

impl<M: LanguageModel, O: TextRecognizer> ExplanationFlow<M, O> {
    pub fn new(explainer: Explainer<M>, recognizer: O, ocr_lang: impl Into<String>) -> Self {
        Self {
            explainer,
            recognizer,
            ocr_lang: ocr_lang.into(),
        }
    }

    pub async fn run(&self, image: &Path, ctx: &QuestionCtx<'_>) -> AppResult<Explanation> {
        info!("{} 🧠 生成讲解...", ctx);
        let data_url = images::data_url(image).await?;

        let first = match self.ask_image(&data_url, ctx).await {
            Ok(explanation) => Some(explanation),
            Err(e) => {
                warn!("{} ⚠️ 看图请求失败: {}，重试一次", ctx, e);
                match self.ask_image(&data_url, ctx).await {
                    Ok(explanation) => Some(explanation),
                    Err(e) if e.is_empty_content() => None,
                    Err(e) => return Err(e),
                }
            }
        };

        if let Some(explanation) = first.filter(Explanation::is_usable) {
            info!("{} ✓ {}", ctx, truncate_text(&explanation.story, 60));
            return Ok(explanation);
        }

        warn!("{} ⚠️ 没有得到 story，改用 OCR 文本", ctx);
        let text = self.recognizer.recognize(image, &self.ocr_lang).await?;
        let explanation = self
            .explainer
            .from_ocr_text(ctx.id, ctx.answer, text.trim())
            .await?;

        if !explanation.is_usable() {
            return Err(AppError::from(LlmError::EmptyExplanation {
                question: ctx.id.to_string(),
            }));
        }

        info!("{} ✓ (OCR) {}", ctx, truncate_text(&explanation.story, 60));
        Ok(explanation)
    }

    async fn ask_image(&self, data_url: &str, ctx: &QuestionCtx<'_>) -> AppResult<Explanation> {
        self.explainer.from_image(ctx.id, ctx.answer, data_url).await
    }
}
