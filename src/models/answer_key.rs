//! 答案表
//!
//! 每年一张，手工录入，30 个字母依次对应 A1..C10

use std::collections::BTreeMap;

use phf::phf_map;

use crate::error::{AppResult, ConfigError};
use crate::models::question::QuestionId;

static ANSWER_KEYS: phf::Map<&'static str, &'static str> = phf_map! {
    "2025" => "CEEBAECBBACADBDCBDABADECCDAACD",
    "2024" => "BCEDDBECCCBAADADBCDEAEBDDEDBCA",
    "2023" => "EAABCDBBDEECBCEDDDBABCCEDBEAAC",
};

/// 某一年的答案表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerKey {
    year: String,
    letters: Vec<char>,
}

impl AnswerKey {
    /// 查找答案表：先查内置表，再查设置文件中的 `[answer_keys]`
    pub fn for_year(year: &str, extra: &BTreeMap<String, String>) -> AppResult<Self> {
        let letters = ANSWER_KEYS
            .get(year)
            .copied()
            .or_else(|| extra.get(year).map(String::as_str))
            .ok_or_else(|| ConfigError::UnknownYear {
                year: year.to_string(),
            })?;
        Self::parse(year, letters)
    }

    fn parse(year: &str, letters: &str) -> AppResult<Self> {
        let letters: Vec<char> = letters
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        if letters.len() != 30 || letters.iter().any(|c| !('A'..='E').contains(c)) {
            return Err(ConfigError::InvalidSettings {
                message: format!("{} 年的答案必须是 30 个 A–E 字母", year),
            }
            .into());
        }
        Ok(Self {
            year: year.to_string(),
            letters,
        })
    }

    pub fn year(&self) -> &str {
        &self.year
    }

    pub fn answer_for(&self, id: QuestionId) -> char {
        self.letters[(id.item_number() - 1) as usize]
    }
}
