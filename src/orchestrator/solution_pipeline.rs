//! 内嵌文本答案导出 - 编排层
//!
//! PDF 字节 → 内容流文本 → 7–8 年级章节 → 德语解析 → `explanations_<year>.json`

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use crate::cli::CliArgs;
use crate::error::{AppError, AppResult};
use crate::infrastructure::pdf_streams;
use crate::models::QuestionId;
use crate::orchestrator::App;
use crate::services::sections::{extract_solutions, find_section};
use crate::services::{FixtureKind, FixtureWriter};

pub fn solutions_from_pdf_bytes(data: &[u8]) -> AppResult<BTreeMap<QuestionId, String>> {
    let text = pdf_streams::extract_text(data);
    info!("📝 内嵌文本 {} 字符", text.chars().count());
    let section = find_section(&text)?;
    extract_solutions(section)
}

pub async fn run(app: &App, args: &CliArgs) -> Result<PathBuf> {
    let data = tokio::fs::read(&args.pdf)
        .await
        .map_err(|e| AppError::file_read_failed(args.pdf.display().to_string(), e))?;

    let solutions = solutions_from_pdf_bytes(&data)?;

    let out_path = FixtureWriter::new(app.config())
        .write(FixtureKind::Explanations, &args.year, &solutions)
        .await?;

    app.finish(solutions.len(), &out_path);
    Ok(out_path)
}
