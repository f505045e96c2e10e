use crate::config::Settings;
use crate::error::{AppError, ConfigError};
use anyhow::Result;
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载设置
///
/// 文件不存在时返回默认设置；文件存在但无法解析时直接报错。
pub async fn load_settings(settings_path: &Path) -> Result<Settings> {
    if !fs::try_exists(settings_path).await.unwrap_or(false) {
        tracing::debug!("未找到设置文件 {}，使用默认值", settings_path.display());
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(settings_path)
        .await
        .map_err(|e| AppError::file_read_failed(settings_path.display().to_string(), e))?;

    let settings = parse_settings(&content, settings_path)?;

    tracing::info!("已加载设置文件: {}", settings_path.display());
    Ok(settings)
}

fn parse_settings(content: &str, settings_path: &Path) -> Result<Settings, AppError> {
    let settings: Settings = toml::from_str(content).map_err(|source| ConfigError::SettingsParseFailed {
        path: settings_path.display().to_string(),
        source,
    })?;

    if settings.render.translate_batch_size == 0 {
        return Err(ConfigError::InvalidSettings {
            message: "render.translate_batch_size 必须大于 0".to_string(),
        }
        .into());
    }

    Ok(settings)
}
