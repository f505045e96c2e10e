//! pdfinfo / pdftotext 封装

use std::ffi::OsStr;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AppResult, PdfError};
use crate::infrastructure::tools;
use crate::models::{PageSize, Word};

static PAGE_SIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<page[^>]*width="([0-9.]+)"[^>]*height="([0-9.]+)""#).expect("page 正则")
});

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<word[^>]*xMin="([0-9.]+)" yMin="([0-9.]+)" xMax="([0-9.]+)" yMax="([0-9.]+)">(.*?)</word>"#,
    )
    .expect("word 正则")
});

/// 一页的 bbox 抽取结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BboxPage {
    /// 页面尺寸（输出中没有 `<page>` 标签时为 None）
    pub size: Option<PageSize>,
    pub words: Vec<Word>,
}

/// 读取 PDF 页数
pub async fn page_count(pdf_path: &Path) -> AppResult<u32> {
    let output = tools::run_stdout("pdfinfo", [pdf_path]).await?;
    parse_page_count(&output).ok_or_else(|| {
        PdfError::PageCountMissing {
            path: pdf_path.display().to_string(),
        }
        .into()
    })
}

/// 抽取单页的单词及其外框
pub async fn page_bbox(pdf_path: &Path, page: u32) -> AppResult<BboxPage> {
    let page_arg = page.to_string();
    let args = [
        OsStr::new("-bbox"),
        OsStr::new("-f"),
        OsStr::new(&page_arg),
        OsStr::new("-l"),
        OsStr::new(&page_arg),
        pdf_path.as_os_str(),
        OsStr::new("-"),
    ];
    let output = tools::run_stdout("pdftotext", args).await?;
    Ok(parse_bbox_html(&output))
}

pub fn parse_page_count(pdfinfo_output: &str) -> Option<u32> {
    pdfinfo_output
        .lines()
        .find_map(|line| line.strip_prefix("Pages:"))
        .and_then(|rest| rest.trim().parse().ok())
}

pub fn parse_bbox_html(html: &str) -> BboxPage {
    let size = PAGE_SIZE_RE.captures(html).and_then(|caps| {
        Some(PageSize {
            width: caps[1].parse().ok()?,
            height: caps[2].parse().ok()?,
        })
    });

    let words = WORD_RE
        .captures_iter(html)
        .filter_map(|caps| {
            let text = html_escape::decode_html_entities(&caps[5]).trim().to_string();
            if text.is_empty() {
                return None;
            }
            Some(Word {
                x_min: caps[1].parse().ok()?,
                y_min: caps[2].parse().ok()?,
                x_max: caps[3].parse().ok()?,
                y_max: caps[4].parse().ok()?,
                text,
            })
        })
        .collect();

    BboxPage { size, words }
}
