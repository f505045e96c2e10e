use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 外部工具错误（pdftotext / pdftoppm / tesseract …）
    #[error("外部工具错误: {0}")]
    Tool(#[from] ToolError),
    /// PDF 结构错误
    #[error("PDF错误: {0}")]
    Pdf(#[from] PdfError),
    /// 文本抽取错误
    #[error("抽取错误: {0}")]
    Extraction(#[from] ExtractionError),
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 外部工具错误
#[derive(Debug, Error)]
pub enum ToolError {
    /// 无法启动（通常是没有安装 / 不在 PATH 上）
    #[error("无法启动 {program}: {source}")]
    NotFound {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// 非零退出
    #[error("{program} 执行失败 (状态: {status}): {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
    /// 没有产生预期的输出文件
    #[error("{program} 没有生成任何输出文件: {dir}")]
    NoOutput { program: String, dir: String },
}

/// PDF 结构错误
#[derive(Debug, Error)]
pub enum PdfError {
    /// pdfinfo 输出中没有 Pages 行
    #[error("无法读取页数: {path}")]
    PageCountMissing { path: String },
    /// bbox 输出中没有页面尺寸
    #[error("无法解析第 {page} 页的页面尺寸")]
    PageSizeMissing { page: u32 },
    /// 图片处理失败
    #[error("图片处理失败 ({path}): {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },
    /// 图片处理任务异常退出
    #[error("图片处理任务中断 ({path}): {message}")]
    ImageTask { path: String, message: String },
}

/// 文本抽取错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    /// 找不到 7–8 年级章节标题
    #[error("找不到章节标题: Klassenstufen 7 und 8")]
    SectionStartNotFound,
    /// 找不到 9–10 年级章节标题
    #[error("找不到结束章节标题: Klassenstufen 9 und 10")]
    SectionEndNotFound,
    /// 章节内没有任何 "Lösung" 条目
    #[error("章节中没有找到任何解答")]
    NoSolutions,
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// 网络请求失败
    #[error("LLM API调用失败 (模型: {model}): {message}")]
    ApiCallFailed { model: String, message: String },
    /// API 返回错误状态
    #[error("LLM API返回错误状态 {status}: {body}")]
    BadStatus { status: u16, body: String },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 返回内容不是 JSON
    #[error("无法解析LLM返回的JSON: {response}")]
    JsonParseFailed { response: String },
    /// 兜底之后仍然没有可用的讲解
    #[error("题目 {question} 没有得到可用的讲解")]
    EmptyExplanation { question: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量不存在
    #[error("环境变量 {var_name} 不存在")]
    EnvVarNotFound { var_name: String },
    /// 环境变量取值不合法
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 设置文件解析失败
    #[error("设置文件解析失败 ({path}): {source}")]
    SettingsParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 设置文件内容不合法
    #[error("设置文件内容不合法: {message}")]
    InvalidSettings { message: String },
    /// 没有该年份的答案
    #[error("没有 {year} 年的答案")]
    UnknownYear { year: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建LLM API调用错误
    pub fn llm_api_failed(model: impl Into<String>, source: impl std::fmt::Display) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            message: source.to_string(),
        })
    }

    /// 是否为"内容为空"类错误（走 OCR 兜底而不是直接失败）
    pub fn is_empty_content(&self) -> bool {
        matches!(self, AppError::Llm(LlmError::EmptyContent { .. }))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_group_prefix() {
        let err = AppError::from(ExtractionError::SectionEndNotFound);
        assert!(err.to_string().starts_with("抽取错误"));
        assert!(err.to_string().contains("Klassenstufen 9 und 10"));
    }

    #[test]
    fn test_is_empty_content() {
        let empty = AppError::Llm(LlmError::EmptyContent {
            model: "gpt-4o-mini".to_string(),
        });
        assert!(empty.is_empty_content());

        let other = AppError::llm_api_failed("gpt-4o-mini", "connection reset");
        assert!(!other.is_empty_content());
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = AppError::from(ConfigError::UnknownYear {
            year: "1999".to_string(),
        })
        .into();
        let app = err.downcast_ref::<AppError>().unwrap();
        assert!(matches!(app, AppError::Config(ConfigError::UnknownYear { .. })));
    }
}
