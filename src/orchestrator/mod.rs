//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层把一次命令行调用从头跑到尾，是整个系统的"指挥中心"。
//! 每个工具对应一条流水线，全部顺序执行，任何未恢复的错误都会终止本次运行。
//!
//! ## 模块划分
//!
//! ### `app` - 应用启动
//! - 初始化日志、加载 `kangaroo.toml`
//! - 提供工作目录和收尾统计
//!
//! ### `label_pipeline` - 题号位置导出（工具 1）
//! ### `solution_pipeline` - 内嵌文本答案导出（工具 2）
//! ### `explanation_pipeline` - 看图生成讲解（工具 3）
//! - 渲染、定位、裁剪，再逐题交给 `workflow::ExplanationFlow`
//! ### `ocr_pipeline` - OCR 答案导出并翻译（工具 4）
//!
//! ## 层次关系
//!
//! ```text
//! bin/* (参数解析)
//!     ↓
//! orchestrator (一条流水线 = 一个工具)
//!     ↓
//! workflow::ExplanationFlow (处理单道题)
//!     ↓
//! services (能力层：定位 / 裁剪 / 章节 / LLM / 翻译 / 写入)
//!     ↓
//! infrastructure (基础设施：poppler / tesseract / 图片 / PDF 字节)
//! ```

pub mod app;
pub mod explanation_pipeline;
pub mod label_pipeline;
pub mod ocr_pipeline;
pub mod solution_pipeline;

pub use app::App;
