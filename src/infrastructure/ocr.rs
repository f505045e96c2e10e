//! OCR 能力（tesseract）

use std::ffi::OsStr;
use std::path::Path;

use tracing::debug;

use crate::error::AppResult;
use crate::infrastructure::tools;

/// 图片 → 文本
#[allow(async_fn_in_trait)]
pub trait TextRecognizer {
    async fn recognize(&self, image: &Path, lang: &str) -> AppResult<String>;
}

impl<T: TextRecognizer> TextRecognizer for &T {
    async fn recognize(&self, image: &Path, lang: &str) -> AppResult<String> {
        (**self).recognize(image, lang).await
    }
}

/// 调用本机 `tesseract`
#[derive(Debug, Clone)]
pub struct Tesseract {
    psm: u32,
}

impl Tesseract {
    pub fn new(psm: u32) -> Self {
        Self { psm }
    }
}

impl Default for Tesseract {
    fn default() -> Self {
        Self::new(6)
    }
}

impl TextRecognizer for Tesseract {
    async fn recognize(&self, image: &Path, lang: &str) -> AppResult<String> {
        let psm = self.psm.to_string();
        let args = [
            image.as_os_str(),
            OsStr::new("stdout"),
            OsStr::new("-l"),
            OsStr::new(lang),
            OsStr::new("--psm"),
            OsStr::new(&psm),
        ];
        let text = tools::run_stdout("tesseract", args).await?;
        debug!("OCR {} → {} 字符", image.display(), text.chars().count());
        Ok(text)
    }
}
