//! OCR 答案导出 - 编排层
//!
//! PDF → 200 dpi PNG → tesseract（德语）→ 7–8 年级章节 → 翻译 → `explanations_<year>.json`

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::cli::CliArgs;
use crate::config::RenderSettings;
use crate::error::AppResult;
use crate::infrastructure::raster;
use crate::infrastructure::{RasterFormat, Tesseract, TextRecognizer};
use crate::orchestrator::App;
use crate::services::sections::{extract_solutions, find_section};
use crate::services::{FixtureKind, FixtureWriter, ModelClient, Translator};

/// 渲染全部页面并逐页 OCR，按页序以换行连接
pub async fn ocr_pdf<O: TextRecognizer>(
    recognizer: &O,
    pdf: &Path,
    work_dir: &Path,
    render: &RenderSettings,
) -> AppResult<String> {
    let pages = raster::render_pages(pdf, work_dir, render.ocr_dpi, RasterFormat::Png).await?;

    let mut texts = Vec::with_capacity(pages.len());
    for (idx, page) in pages.iter().enumerate() {
        info!("🔎 OCR 第 {}/{} 页", idx + 1, pages.len());
        texts.push(recognizer.recognize(page, &render.solutions_ocr_lang).await?);
    }

    Ok(texts.join("\n"))
}

pub async fn run(app: &App, args: &CliArgs) -> Result<PathBuf> {
    let model = ModelClient::from_config(app.config())?;
    let render = &app.settings().render;

    let recognizer = Tesseract::new(render.ocr_psm);
    let text = ocr_pdf(&recognizer, &args.pdf, &app.scratch_dir(&args.year, "ocr"), render).await?;

    let section = find_section(&text)?;
    let german = extract_solutions(section)?;
    info!("✓ 找到 {} 条德语解析", german.len());

    let english = Translator::new(model, render.translate_batch_size)
        .translate_all(&german)
        .await?;

    let out_path = FixtureWriter::new(app.config())
        .write(FixtureKind::Explanations, &args.year, &english)
        .await?;

    app.finish(english.len(), &out_path);
    Ok(out_path)
}
