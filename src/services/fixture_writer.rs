//! 结果写入服务 - 业务能力层
//!
//! 只负责"把某一年的结果写成前端用的 JSON 文件"，不关心内容从哪里来

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// 输出文件种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureKind {
    /// `label_positions_<year>.json`
    LabelPositions,
    /// `explanations_<year>.json`
    Explanations,
}

impl FixtureKind {
    fn prefix(self) -> &'static str {
        match self {
            FixtureKind::LabelPositions => "label_positions",
            FixtureKind::Explanations => "explanations",
        }
    }
}

/// 结果写入服务
///
/// 每次写入都完整覆盖旧文件，输出为两空格缩进的 UTF-8 JSON。
pub struct FixtureWriter {
    data_dir: PathBuf,
}

impl FixtureWriter {
    pub fn new(config: &Config) -> Self {
        Self::with_dir(&config.data_dir)
    }

    /// 使用自定义输出目录创建
    pub fn with_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path(&self, kind: FixtureKind, year: &str) -> PathBuf {
        self.data_dir.join(format!("{}_{}.json", kind.prefix(), year))
    }

    /// 写入并返回文件路径
    pub async fn write<T: Serialize>(
        &self,
        kind: FixtureKind,
        year: &str,
        value: &T,
    ) -> AppResult<PathBuf> {
        let path = self.path(kind, year);
        write_pretty_json(&path, value).await?;
        Ok(path)
    }
}

async fn write_pretty_json<T: Serialize>(path: &Path, value: &T) -> AppResult<()> {
    let write_failed = |e: std::io::Error| AppError::file_write_failed(path.display().to_string(), e);

    let json = serde_json::to_string_pretty(value).map_err(|e| write_failed(e.into()))?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
    }
    tokio::fs::write(path, &json).await.map_err(write_failed)?;

    debug!("写入 {} ({} 字节)", path.display(), json.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Explanation, ExplanationsFile, QuestionId};

    #[tokio::test]
    async fn test_write_replaces_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let writer = FixtureWriter::with_dir(dir.path().join("src/data"));
        let id: QuestionId = "A1".parse().unwrap();

        let mut first = ExplanationsFile::new();
        first.insert(id, "Weil 2+2=4.".to_string());
        first.insert("A2".parse().unwrap(), "Zähle die Formen.".to_string());
        writer.write(FixtureKind::Explanations, "2024", &first).await.unwrap();

        let mut second = ExplanationsFile::new();
        second.insert(
            id,
            Explanation {
                hint: "Add them.".to_string(),
                story: "Two and two make four.".to_string(),
            },
        );
        let path = writer.write(FixtureKind::Explanations, "2024", &second).await.unwrap();
        assert!(path.ends_with("src/data/explanations_2024.json"));

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "{\n  \"A1\": {\n    \"hint\": \"Add them.\",\n    \"story\": \"Two and two make four.\"\n  }\n}"
        );
    }

    #[tokio::test]
    async fn test_non_ascii_is_written_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let writer = FixtureWriter::with_dir(dir.path());
        let mut file = ExplanationsFile::new();
        file.insert("C10".parse::<QuestionId>().unwrap(), "Würfel".to_string());
        let path = writer.write(FixtureKind::Explanations, "2025", &file).await.unwrap();
        assert!(std::fs::read_to_string(path).unwrap().contains("Würfel"));

        assert!(writer
            .path(FixtureKind::LabelPositions, "2025")
            .ends_with("label_positions_2025.json"));
    }
}
