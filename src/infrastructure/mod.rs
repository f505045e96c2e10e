//! 基础设施层（Infrastructure）
//!
//! 持有外部资源（命令行工具、PDF 字节、图片文件），只暴露能力，
//! 不认识题号和流程。

pub mod images;
pub mod ocr;
pub mod pdf_streams;
pub mod pdf_text;
pub mod raster;
pub mod tools;

pub use ocr::{Tesseract, TextRecognizer};
pub use pdf_text::BboxPage;
pub use raster::RasterFormat;
