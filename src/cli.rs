//! 命令行参数：`<tool> <pdf> <year>`

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub pdf: PathBuf,
    pub year: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("缺少参数")]
    MissingArgs,

    #[error("File not found: {0}")]
    FileNotFound(String),
}

/// 解析参数（不含程序名）；多余的参数忽略
pub fn parse<I>(args: I) -> Result<CliArgs, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let (Some(pdf), Some(year)) = (args.next(), args.next()) else {
        return Err(CliError::MissingArgs);
    };

    let pdf = PathBuf::from(pdf);
    if !pdf.exists() {
        return Err(CliError::FileNotFound(pdf.display().to_string()));
    }

    Ok(CliArgs {
        pdf,
        year: year.trim().to_string(),
    })
}

/// 解析 `std::env::args()`；出错时打印用法并以状态 1 退出
pub fn parse_or_exit(tool: &str, pdf_hint: &str) -> CliArgs {
    match parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(CliError::MissingArgs) => {
            eprintln!("Usage: {} {} YYYY", tool, pdf_hint);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_arguments() {
        assert_eq!(parse(strings(&[])), Err(CliError::MissingArgs));
        assert_eq!(parse(strings(&["a.pdf"])), Err(CliError::MissingArgs));
    }

    #[test]
    fn test_missing_file() {
        let err = parse(strings(&["/nonexistent/kangaroo-2025.pdf", "2025"])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "File not found: /nonexistent/kangaroo-2025.pdf"
        );
    }

    #[test]
    fn test_existing_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().display().to_string();
        let args = parse(strings(&[&path, "2025", "extra"])).unwrap();
        assert_eq!(args.pdf, file.path());
        assert_eq!(args.year, "2025");
    }
}
