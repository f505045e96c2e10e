//! 应用启动 - 编排层
//!
//! ## 职责
//!
//! 四个命令行工具共用的启动步骤：
//!
//! 1. **日志初始化**：按 `VERBOSE_LOGGING` / `RUST_LOG` 设置级别
//! 2. **设置加载**：读取 `kangaroo.toml`（不存在时使用默认值）
//! 3. **启动信息**：记录工具名、PDF 路径和年份
//! 4. **收尾统计**：记录写入条数、输出路径和用时

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Local};

use crate::cli::CliArgs;
use crate::config::{Config, Settings};
use crate::models::load_settings;
use crate::utils::logging;

/// 应用主结构
pub struct App {
    tool: &'static str,
    config: Config,
    settings: Settings,
    started: DateTime<Local>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config, tool: &'static str, args: &CliArgs) -> Result<Self> {
        logging::init(config.verbose_logging);
        logging::log_startup(tool, &args.pdf, &args.year);

        let settings = load_settings(&config.settings_path).await?;

        Ok(Self {
            tool,
            config,
            settings,
            started: Local::now(),
        })
    }

    /// 直接用现成的配置和设置创建（测试用）
    pub fn with_settings(config: Config, settings: Settings, tool: &'static str) -> Self {
        Self {
            tool,
            config,
            settings,
            started: Local::now(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// `<work_dir>/kangaroo_<year>_<suffix>`
    pub fn scratch_dir(&self, year: &str, suffix: &str) -> std::path::PathBuf {
        self.config
            .work_dir
            .join(format!("kangaroo_{}_{}", year, suffix))
    }

    pub fn finish(&self, written: usize, out_path: &Path) {
        logging::print_final_stats(self.tool, written, out_path, self.started);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_scratch_dir_layout() {
        let config = Config {
            work_dir: PathBuf::from("/tmp/work"),
            ..Config::default()
        };
        let app = App::with_settings(config, Settings::default(), "test");
        assert_eq!(
            app.scratch_dir("2025", "crops"),
            PathBuf::from("/tmp/work/kangaroo_2025_crops")
        );
    }
}
