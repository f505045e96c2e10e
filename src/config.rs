use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{AppResult, ConfigError};

/// API 密钥所在的环境变量
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// 程序配置（来自环境变量）
#[derive(Clone, Debug)]
pub struct Config {
    /// JSON 输出目录（前端的 src/data）
    pub data_dir: PathBuf,
    /// 临时文件目录（渲染的页面、裁剪图、调试输出）
    pub work_dir: PathBuf,
    /// TOML 设置文件路径（不存在时使用默认值）
    pub settings_path: PathBuf,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: Option<String>,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_backend: LlmBackend,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("src/data"),
            work_dir: PathBuf::from(".tmp"),
            settings_path: PathBuf::from("kangaroo.toml"),
            verbose_logging: false,
            llm_api_key: None,
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            llm_backend: LlmBackend::Responses,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            data_dir: std::env::var("KANGAROO_DATA_DIR").map(PathBuf::from).unwrap_or(default.data_dir),
            work_dir: std::env::var("KANGAROO_WORK_DIR").map(PathBuf::from).unwrap_or(default.work_dir),
            settings_path: std::env::var("KANGAROO_SETTINGS").map(PathBuf::from).unwrap_or(default.settings_path),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            llm_api_key: std::env::var(API_KEY_VAR).ok().filter(|v| !v.trim().is_empty()),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_backend: std::env::var("LLM_BACKEND").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_backend),
        }
    }

    /// 需要调用远程 API 的工具在启动时检查密钥
    pub fn require_api_key(&self) -> AppResult<&str> {
        self.llm_api_key.as_deref().ok_or_else(|| {
            ConfigError::EnvVarNotFound {
                var_name: API_KEY_VAR.to_string(),
            }
            .into()
        })
    }
}

/// LLM 接口类型
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LlmBackend {
    /// OpenAI Responses API (`/v1/responses`)
    Responses,
    /// 兼容 OpenAI 的 Chat Completions 接口
    Chat,
}

impl FromStr for LlmBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "responses" => Ok(LlmBackend::Responses),
            "chat" | "chat-completions" => Ok(LlmBackend::Chat),
            other => Err(ConfigError::EnvVarParseFailed {
                var_name: "LLM_BACKEND".to_string(),
                value: other.to_string(),
                expected_type: "responses | chat".to_string(),
            }),
        }
    }
}

/// 设置文件内容（`kangaroo.toml`）
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub crop: CropSettings,
    pub render: RenderSettings,
    /// 额外年份的答案，值为 30 个字母，例如 `"CEEBA..."`
    pub answer_keys: BTreeMap<String, String>,
}

/// 裁剪启发式参数
///
/// 默认值即现有夹具所用的取值。
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct CropSettings {
    /// 同一列的 left 坐标最大偏差
    pub column_tolerance: f64,
    /// 把单词归到同一行的 y 容差
    pub line_tolerance: f64,
    /// "下一题"至少要比当前题低这么多
    pub next_item_margin: f64,
    pub padding_top: f64,
    pub padding_bottom: f64,
    pub padding_x: f64,
    /// 有下一题时裁剪区域的最小跨度
    pub min_bottom_span: f64,
    /// 统计题间距时忽略不大于该值的间距
    pub min_gap: f64,
    /// 没有任何间距可用时，估计高度 = 页面高度 × 该比例
    pub fallback_height_ratio: f64,
    pub gap_multiplier: f64,
    pub min_estimated_height: f64,
    pub max_height_ratio: f64,
    pub min_width: u32,
    pub min_height: u32,
}

impl Default for CropSettings {
    fn default() -> Self {
        Self {
            column_tolerance: 90.0,
            line_tolerance: 2.5,
            next_item_margin: 4.0,
            padding_top: 24.0,
            padding_bottom: 16.0,
            padding_x: 18.0,
            min_bottom_span: 140.0,
            min_gap: 24.0,
            fallback_height_ratio: 0.25,
            gap_multiplier: 1.35,
            min_estimated_height: 220.0,
            max_height_ratio: 0.55,
            min_width: 140,
            min_height: 200,
        }
    }
}

/// 渲染 / OCR / 翻译参数
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderSettings {
    /// 生成讲解时页面渲染的 DPI
    pub page_dpi: u32,
    /// 页面图片最长边（等同于 `sips -Z 1400`）
    pub page_max_dimension: u32,
    /// OCR 抽取解答时的渲染 DPI
    pub ocr_dpi: u32,
    /// 解答册的 OCR 语言
    pub solutions_ocr_lang: String,
    /// 裁剪图兜底 OCR 的语言
    pub crop_ocr_lang: String,
    /// tesseract 页面分割模式
    pub ocr_psm: u32,
    /// 每次翻译请求包含的题目数量
    pub translate_batch_size: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            page_dpi: 140,
            page_max_dimension: 1400,
            ocr_dpi: 200,
            solutions_ocr_lang: "deu".to_string(),
            crop_ocr_lang: "eng".to_string(),
            ocr_psm: 6,
            translate_batch_size: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parse() {
        assert_eq!("responses".parse::<LlmBackend>().unwrap(), LlmBackend::Responses);
        assert_eq!(" Chat ".parse::<LlmBackend>().unwrap(), LlmBackend::Chat);
        assert!("grpc".parse::<LlmBackend>().is_err());
    }

    #[test]
    fn test_require_api_key() {
        let config = Config::default();
        assert!(config.require_api_key().is_err());

        let config = Config {
            llm_api_key: Some("sk-test".to_string()),
            ..Config::default()
        };
        assert_eq!(config.require_api_key().unwrap(), "sk-test");
    }

    #[test]
    fn test_partial_settings_keep_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [crop]
            column_tolerance = 120.0

            [answer_keys]
            "2026" = "ABCDEABCDEABCDEABCDEABCDEABCDE"
            "#,
        )
        .unwrap();
        assert_eq!(settings.crop.column_tolerance, 120.0);
        assert_eq!(settings.crop.padding_top, 24.0);
        assert_eq!(settings.render, RenderSettings::default());
        assert_eq!(settings.answer_keys.len(), 1);
    }
}
