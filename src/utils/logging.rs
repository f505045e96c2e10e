//! 日志工具模块
//!
//! 提供日志初始化、格式化和输出的辅助函数

use std::path::Path;

use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// 初始化控制台日志
///
/// `RUST_LOG` 优先；未设置时 `verbose` 决定 debug 还是 info。
/// 重复调用（例如测试里）不会 panic。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(false)
        .with_line_number(false)
        .with_target(false)
        .with_filter(env_filter);

    let _ = tracing_subscriber::registry().with(console_layer).try_init();
}

/// 记录程序启动信息
pub fn log_startup(tool: &str, pdf: &Path, year: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 {} 启动 - {}", tool, chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    info!("📄 PDF: {}", pdf.display());
    info!("📅 年份: {}", year);
    info!("{}", "=".repeat(60));
}

/// 记录页面开始处理
///
/// # 参数
/// - `page`: 页码（从 1 开始）
/// - `total`: 页面总数
/// - `items`: 本页要处理的条目数
pub fn log_page_start(page: u32, total: usize, items: usize) {
    info!("\n{}", "─".repeat(60));
    info!("📃 第 {}/{} 页，{} 道题", page, total, items);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(tool: &str, written: usize, out_path: &Path, started: chrono::DateTime<chrono::Local>) {
    let elapsed = chrono::Local::now() - started;
    info!("\n{}", "=".repeat(60));
    info!("📊 {} 完成", tool);
    info!("完成时间: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    info!("用时: {} 秒", elapsed.num_seconds());
    info!("{}", "=".repeat(60));
    info!("✅ 已写入 {} 条 → {}", written, out_path.display());
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符数）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("Würfel", 10), "Würfel");
        assert_eq!(truncate_text("Würfelspiel", 3), "Wür...");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(false);
        init(true);
    }
}
