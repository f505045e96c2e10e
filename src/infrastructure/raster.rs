//! pdftoppm 封装：把 PDF 渲染成逐页图片

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use crate::error::{AppError, AppResult, ToolError};
use crate::infrastructure::tools;

/// 渲染输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Jpeg,
    Png,
}

impl RasterFormat {
    fn flag(self) -> &'static str {
        match self {
            RasterFormat::Jpeg => "-jpeg",
            RasterFormat::Png => "-png",
        }
    }

    fn extension(self) -> &'static str {
        match self {
            RasterFormat::Jpeg => "jpg",
            RasterFormat::Png => "png",
        }
    }
}

/// 渲染全部页面到 `work_dir/page-N.<ext>`
///
/// 目录会先被清空；返回按页码排序的文件列表。
pub async fn render_pages(
    pdf_path: &Path,
    work_dir: &Path,
    dpi: u32,
    format: RasterFormat,
) -> AppResult<Vec<PathBuf>> {
    clear_dir(work_dir).await?;

    info!("🖨️ 正在渲染页面 ({} dpi): {}", dpi, pdf_path.display());
    let prefix = work_dir.join("page");
    let dpi_arg = dpi.to_string();
    let args = [
        OsStr::new("-r"),
        OsStr::new(&dpi_arg),
        OsStr::new(format.flag()),
        pdf_path.as_os_str(),
        prefix.as_os_str(),
    ];
    tools::run("pdftoppm", args).await?;

    let pages = list_rendered_pages(work_dir, format).await?;
    if pages.is_empty() {
        return Err(ToolError::NoOutput {
            program: "pdftoppm".to_string(),
            dir: work_dir.display().to_string(),
        }
        .into());
    }

    debug!("渲染得到 {} 页", pages.len());
    Ok(pages)
}

async fn clear_dir(dir: &Path) -> AppResult<()> {
    let path = dir.display().to_string();
    if fs::try_exists(dir).await.unwrap_or(false) {
        fs::remove_dir_all(dir)
            .await
            .map_err(|e| AppError::file_write_failed(path.clone(), e))?;
    }
    fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::file_write_failed(path, e))
}

async fn list_rendered_pages(dir: &Path, format: RasterFormat) -> AppResult<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| AppError::file_read_failed(dir.display().to_string(), e))?;

    let mut pages = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::file_read_failed(dir.display().to_string(), e))?
    {
        let path = entry.path();
        if let Some(number) = rendered_page_number(&path, format) {
            pages.push((number, path));
        }
    }

    pages.sort();
    Ok(pages.into_iter().map(|(_, path)| path).collect())
}

/// `page-3.jpg` / `page-03.jpg` → 3；其他文件（包括 `page-3_small.jpg`）→ None
pub fn rendered_page_number(path: &Path, format: RasterFormat) -> Option<u32> {
    if path.extension()?.to_str()? != format.extension() {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let digits = stem.strip_prefix("page-")?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_page_number() {
        let jpeg = RasterFormat::Jpeg;
        assert_eq!(rendered_page_number(Path::new("w/page-3.jpg"), jpeg), Some(3));
        assert_eq!(rendered_page_number(Path::new("w/page-03.jpg"), jpeg), Some(3));
        assert_eq!(rendered_page_number(Path::new("w/page-12.jpg"), jpeg), Some(12));
        assert_eq!(rendered_page_number(Path::new("w/page-3_small.jpg"), jpeg), None);
        assert_eq!(rendered_page_number(Path::new("w/page-3.png"), jpeg), None);
        assert_eq!(rendered_page_number(Path::new("w/cover.jpg"), jpeg), None);
        assert_eq!(
            rendered_page_number(Path::new("w/page-7.png"), RasterFormat::Png),
            Some(7)
        );
    }

    #[tokio::test]
    async fn test_list_sorts_numerically() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["page-10.png", "page-2.png", "page-1.png", "notes.txt", "page-2_small.png"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let pages = list_rendered_pages(dir.path(), RasterFormat::Png).await.unwrap();
        let names: Vec<_> = pages
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["page-1.png", "page-2.png", "page-10.png"]);
    }
}
