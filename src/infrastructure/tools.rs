//! 外部工具执行器 - 基础设施层
//!
//! 所有外部命令（pdfinfo / pdftotext / pdftoppm / tesseract）都经过这里

use std::ffi::OsStr;
use std::process::Output;

use tokio::process::Command;
use tracing::debug;

use crate::error::{AppResult, ToolError};

/// 执行外部命令并返回完整输出
///
/// - 无法启动 → `ToolError::NotFound`
/// - 非零退出 → `ToolError::Failed`（附带 stderr）
pub async fn run<I, S>(program: &str, args: I) -> AppResult<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<_> = args.into_iter().map(|a| a.as_ref().to_os_string()).collect();
    debug!("执行外部命令: {} {:?}", program, args);

    let output = Command::new(program)
        .args(&args)
        .output()
        .await
        .map_err(|source| ToolError::NotFound {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(ToolError::Failed {
            program: program.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into());
    }

    Ok(output)
}

/// 执行外部命令并把 stdout 当作文本返回（非 UTF-8 字节会被替换）
pub async fn run_stdout<I, S>(program: &str, args: I) -> AppResult<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = run(program, args).await?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_missing_program_is_not_found() {
        let err = run("kangaroo-no-such-tool", ["--version"]).await.unwrap_err();
        assert!(matches!(err, AppError::Tool(ToolError::NotFound { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_captures_stdout() {
        let out = run_stdout("sh", ["-c", "printf 'Pages: 4'"]).await.unwrap();
        assert_eq!(out, "Pages: 4");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_failed() {
        let err = run("sh", ["-c", "echo broken >&2; exit 3"]).await.unwrap_err();
        match err {
            AppError::Tool(ToolError::Failed { stderr, .. }) => assert_eq!(stderr, "broken"),
            other => panic!("意外的错误: {}", other),
        }
    }
}
