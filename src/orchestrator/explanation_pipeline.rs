//! 讲解生成 - 编排层
//!
//! ## 职责
//!
//! 1. **渲染页面**：140 dpi JPEG，再缩放到最长边 1400 像素（`*_small.jpg`）
//! 2. **逐页定位**：用 bbox 单词定位本页题号，换算到图片像素
//! 3. **裁剪题目**：每道题一张 `<id>.jpg`；找不到题号时直接用整页
//! 4. **流程调度**：把每张图交给 `ExplanationFlow`
//! 5. **写入结果**：`explanations_<year>.json`

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{CropSettings, RenderSettings};
use crate::error::{AppError, AppResult, PdfError};
use crate::infrastructure::{images, pdf_text, raster, BboxPage, RasterFormat, Tesseract, TextRecognizer};
use crate::models::{questions_by_page, AnswerKey, Explanation, ExplanationsFile, QuestionId};
use crate::orchestrator::App;
use crate::services::explainer::EMPTY_RESPONSE_DUMP;
use crate::services::label_locator::locate_labels;
use crate::services::{compute_crop, Explainer, FixtureKind, FixtureWriter, LanguageModel, ModelClient};
use crate::utils::logging;
use crate::workflow::{ExplanationFlow, QuestionCtx};

/// 渲染并缩放全部页面，返回按页序排列的 `*_small.jpg`
pub async fn prepare_pages(pdf: &Path, pages_dir: &Path, render: &RenderSettings) -> AppResult<Vec<PathBuf>> {
    let rendered = raster::render_pages(pdf, pages_dir, render.page_dpi, RasterFormat::Jpeg).await?;

    let mut small_pages = Vec::with_capacity(rendered.len());
    for page in &rendered {
        let stem = page.file_stem().and_then(|s| s.to_str()).unwrap_or("page");
        let small = page.with_file_name(format!("{}_small.jpg", stem));
        images::resize_to_fit(page, &small, render.page_max_dimension).await?;
        small_pages.push(small);
    }

    info!("🖼️ 已准备 {} 页图片", small_pages.len());
    Ok(small_pages)
}

/// 为本页每道题准备一张图片：能定位到题号就裁剪，否则用整页
pub async fn crop_page_questions(
    page_image: &Path,
    page_num: u32,
    bbox: &BboxPage,
    ids: &[QuestionId],
    crops_dir: &Path,
    crop: &CropSettings,
) -> AppResult<Vec<(QuestionId, PathBuf)>> {
    let (img_w, img_h) = images::dimensions(page_image)?;
    let page_size = bbox.size.ok_or(PdfError::PageSizeMissing { page: page_num })?;

    let scale_x = img_w as f64 / page_size.width;
    let scale_y = img_h as f64 / page_size.height;
    let labels = locate_labels(&bbox.words, ids, scale_x, scale_y, crop.line_tolerance);
    debug!("第 {} 页定位到 {}/{} 个题号", page_num, labels.len(), ids.len());

    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if !labels.contains_key(id) {
            warn!("⚠️ 第 {} 页找不到 {}，使用整页", page_num, id);
            out.push((*id, page_image.to_path_buf()));
            continue;
        }

        let rect = compute_crop(*id, &labels, (img_w, img_h), crop);
        let crop_path = crops_dir.join(format!("{}.jpg", id));
        images::crop(page_image, &crop_path, rect).await?;
        debug!("{} 裁剪: {:?}", id, rect);
        out.push((*id, crop_path));
    }
    Ok(out)
}

/// 按固定的页面布局逐题生成讲解
pub async fn generate_explanations<M: LanguageModel, O: TextRecognizer>(
    flow: &ExplanationFlow<M, O>,
    pdf: &Path,
    year: &str,
    answer_key: &AnswerKey,
    pages: &[PathBuf],
    crops_dir: &Path,
    crop: &CropSettings,
) -> AppResult<ExplanationsFile<Explanation>> {
    tokio::fs::create_dir_all(crops_dir)
        .await
        .map_err(|e| AppError::file_write_failed(crops_dir.display().to_string(), e))?;

    let layout = questions_by_page();
    let mut explanations = ExplanationsFile::new();

    for (page_num, ids) in &layout {
        let Some(page_image) = pages.get(*page_num as usize - 1) else {
            warn!("⚠️ PDF 只有 {} 页，跳过第 {} 页", pages.len(), page_num);
            continue;
        };
        logging::log_page_start(*page_num, layout.len(), ids.len());

        let bbox = pdf_text::page_bbox(pdf, *page_num).await?;
        let question_images = crop_page_questions(page_image, *page_num, &bbox, ids, crops_dir, crop).await?;

        for (id, image) in question_images {
            let ctx = QuestionCtx::new(year, *page_num, id, answer_key.answer_for(id));
            let explanation = flow.run(&image, &ctx).await?;
            explanations.insert(id, explanation);
        }
    }

    Ok(explanations)
}

pub async fn run(app: &App, args: &CliArgs) -> Result<PathBuf> {
    let config = app.config();
    let settings = app.settings();

    // 启动时检查：密钥和答案都要在渲染之前确认
    let model = ModelClient::from_config(config)?;
    let answer_key = AnswerKey::for_year(&args.year, &settings.answer_keys)?;

    let pages = prepare_pages(&args.pdf, &app.scratch_dir(&args.year, "pages"), &settings.render).await?;

    let explainer = Explainer::new(model).with_empty_dump(config.work_dir.join(EMPTY_RESPONSE_DUMP));
    let flow = ExplanationFlow::new(
        explainer,
        Tesseract::new(settings.render.ocr_psm),
        settings.render.crop_ocr_lang.clone(),
    );

    let explanations = generate_explanations(
        &flow,
        &args.pdf,
        &args.year,
        &answer_key,
        &pages,
        &app.scratch_dir(&args.year, "crops"),
        &settings.crop,
    )
    .await?;

    let out_path = FixtureWriter::new(config)
        .write(FixtureKind::Explanations, &args.year, &explanations)
        .await?;

    app.finish(explanations.len(), &out_path);
    Ok(out_path)
}
