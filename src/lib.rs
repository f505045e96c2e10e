//! # Kangaroo Fixtures
//!
//! 把袋鼠数学竞赛（Känguru der Mathematik）的 PDF 变成练习网站用的 JSON 数据
//!
//! ## 工具
//!
//! - `extract_label_positions` - 每页题号位置 → `label_positions_<year>.json`
//! - `extract_solutions` - 答案册内嵌文本 → 德语解析 → `explanations_<year>.json`
//! - `generate_explanations` - 题目截图 + LLM → `{hint, story}` → `explanations_<year>.json`
//! - `ocr_translate_solutions` - 答案册 OCR → 英文小故事 → `explanations_<year>.json`
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 调用 poppler / tesseract，处理图片和 PDF 字节，只暴露能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"：定位题号、计算裁剪、切分章节、调用 LLM、翻译、写文件
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一道题"的讲解流程（看图 → 重试 → OCR 兜底）
//! - `QuestionCtx` - 上下文封装（year + page + id + answer）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/` - 每个工具一条流水线
//!
//! ## 模块结构

pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use cli::CliArgs;
pub use config::{Config, Settings};
pub use error::{AppError, AppResult};
pub use models::{Explanation, QuestionId};
pub use orchestrator::App;
pub use workflow::{ExplanationFlow, QuestionCtx};
