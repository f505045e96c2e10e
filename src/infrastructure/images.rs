//! 页面图片处理：尺寸、缩放、裁剪、转 data URL
//!
//! 缩放和裁剪要完整解码、编码整页图片，放到 `spawn_blocking` 中执行。

use std::path::Path;

use base64::{engine::general_purpose, Engine as _};
use image::imageops::FilterType;
use image::DynamicImage;
use tracing::debug;

use crate::error::{AppError, AppResult, PdfError};
use crate::models::CropRect;

fn image_error(path: &Path, source: image::ImageError) -> AppError {
    PdfError::Image {
        path: path.display().to_string(),
        source,
    }
    .into()
}

fn open(path: &Path) -> AppResult<DynamicImage> {
    image::open(path).map_err(|e| image_error(path, e))
}

/// 统一转成 RGB 再保存（JPEG 编码器不接受带 alpha 的图片）
fn save(img: &DynamicImage, dest: &Path) -> AppResult<()> {
    DynamicImage::ImageRgb8(img.to_rgb8())
        .save(dest)
        .map_err(|e| image_error(dest, e))
}

/// 读取图片宽高（像素）
pub fn dimensions(path: &Path) -> AppResult<(u32, u32)> {
    image::image_dimensions(path).map_err(|e| image_error(path, e))
}

/// 把同步的图片处理放到阻塞线程池
async fn run_blocking<F>(path: &Path, task: F) -> AppResult<()>
where
    F: FnOnce() -> AppResult<()> + Send + 'static,
{
    tokio::task::spawn_blocking(task).await.map_err(|e| {
        AppError::from(PdfError::ImageTask {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    })?
}

/// 等比缩放，使最长边等于 `max_dimension`
pub async fn resize_to_fit(src: &Path, dest: &Path, max_dimension: u32) -> AppResult<()> {
    let (src_owned, dest_owned) = (src.to_path_buf(), dest.to_path_buf());
    run_blocking(src, move || resize_blocking(&src_owned, &dest_owned, max_dimension)).await
}

fn resize_blocking(src: &Path, dest: &Path, max_dimension: u32) -> AppResult<()> {
    let img = open(src)?;
    let resized = img.resize(max_dimension, max_dimension, FilterType::Lanczos3);
    debug!(
        "缩放 {} → {}x{}",
        src.display(),
        resized.width(),
        resized.height()
    );
    save(&resized, dest)
}

/// 按像素矩形裁剪
pub async fn crop(src: &Path, dest: &Path, rect: CropRect) -> AppResult<()> {
    let (src_owned, dest_owned) = (src.to_path_buf(), dest.to_path_buf());
    run_blocking(src, move || {
        let img = open(&src_owned)?;
        let cropped = img.crop_imm(rect.left, rect.top, rect.width, rect.height);
        save(&cropped, &dest_owned)
    })
    .await
}

/// 图片文件 → `data:image/...;base64,...`
pub async fn data_url(path: &Path) -> AppResult<String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
    Ok(format!(
        "data:{};base64,{}",
        mime_type(path),
        general_purpose::STANDARD.encode(bytes)
    ))
}

fn mime_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_test_image(path: &Path, w: u32, h: u32) {
        let img = RgbImage::from_fn(w, h, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 0]));
        DynamicImage::ImageRgb8(img).save(path).unwrap();
    }

    #[tokio::test]
    async fn test_resize_and_crop() {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("page-1.png");
        write_test_image(&page, 400, 800);

        let small = dir.path().join("page-1_small.png");
        resize_to_fit(&page, &small, 200).await.unwrap();
        assert_eq!(dimensions(&small).unwrap(), (100, 200));

        let crop_path = dir.path().join("A1.jpg");
        crop(
            &small,
            &crop_path,
            CropRect {
                left: 10,
                top: 20,
                width: 50,
                height: 60,
            },
        )
        .await
        .unwrap();
        assert_eq!(dimensions(&crop_path).unwrap(), (50, 60));
    }

    #[tokio::test]
    async fn test_data_url_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crop.png");
        std::fs::write(&path, b"\x89PNG").unwrap();
        let url = data_url(&path).await.unwrap();
        assert_eq!(url, "data:image/png;base64,iVBORw==");

        assert_eq!(mime_type(Path::new("a.JPG")), "image/jpeg");
    }

    #[tokio::test]
    async fn test_missing_image_is_error() {
        assert!(dimensions(Path::new("/nonexistent/page-1.jpg")).is_err());

        let dir = tempfile::tempdir().unwrap();
        let err = resize_to_fit(Path::new("/nonexistent/page-1.jpg"), &dir.path().join("out.jpg"), 100)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Pdf(PdfError::Image { .. })));
    }
}
