//! 题号位置导出 - 编排层
//!
//! PDF → 每页尺寸 + 每页题号左上角 → `label_positions_<year>.json`

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::error::AppResult;
use crate::infrastructure::pdf_text;
use crate::models::LabelPositionsFile;
use crate::orchestrator::App;
use crate::services::label_locator::first_label_points;
use crate::services::{FixtureKind, FixtureWriter};

/// 逐页收集页面尺寸和题号位置；没有题号的页面不出现在 `labels` 中
pub async fn collect_label_positions(pdf: &Path) -> AppResult<LabelPositionsFile> {
    let total = pdf_text::page_count(pdf).await?;
    info!("📄 共 {} 页", total);

    let mut file = LabelPositionsFile::default();
    for page in 1..=total {
        let bbox = pdf_text::page_bbox(pdf, page).await?;
        if let Some(size) = bbox.size {
            file.page_sizes.insert(page, size);
        }

        let labels = first_label_points(&bbox.words);
        debug!("第 {} 页: {} 个单词, {} 个题号", page, bbox.words.len(), labels.len());
        if !labels.is_empty() {
            file.labels.insert(page, labels);
        }
    }

    Ok(file)
}

pub async fn run(app: &App, args: &CliArgs) -> Result<PathBuf> {
    let positions = collect_label_positions(&args.pdf).await?;
    let written: usize = positions.labels.values().map(|page| page.len()).sum();

    let out_path = FixtureWriter::new(app.config())
        .write(FixtureKind::LabelPositions, &args.year, &positions)
        .await?;

    app.finish(written, &out_path);
    Ok(out_path)
}
