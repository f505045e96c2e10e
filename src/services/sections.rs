//! 答案章节解析 - 业务能力层
//!
//! 在整份 PDF 文本（内嵌文本或 OCR 结果）里截出 7–8 年级的答案部分，
//! 再按 `<题号> Lösung:` 切成一条条解析。

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

use crate::error::{AppResult, ExtractionError};
use crate::models::QuestionId;

/// 每个字符之后都允许任意空白（PDF 抽取常在字母间插入空格）
fn spaced(literal: &str) -> String {
    literal
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| format!("{}\\s*", regex::escape(&c.to_string())))
        .collect()
}

fn header_regex(from: &str, to: &str) -> Regex {
    let pattern = format!(
        "{}{}(?:{}|{}){}",
        spaced("Klassenstufen"),
        spaced(from),
        spaced("und"),
        spaced("bis"),
        spaced(to)
    );
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .expect("章节标题正则")
}

static START_RE: LazyLock<Regex> = LazyLock::new(|| header_regex("7", "8"));
static END_RE: LazyLock<Regex> = LazyLock::new(|| header_regex("9", "10"));

/// `12 Lösung:`、`12 L o s u n g .`、`12 Loesung:`、`12 Lsung:`，大小写不敏感
static SOLUTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"(\d+)\s*L\s*(?:ö\s*|o\s*(?:e\s*)?)?s\s*u\s*n\s*g\s*[:.]\s*")
        .case_insensitive(true)
        .build()
        .expect("Lösung 正则")
});

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("空白正则"));

/// 截取两个年级标题之间的文本（不含标题本身）
pub fn find_section(text: &str) -> AppResult<&str> {
    let start = START_RE
        .find(text)
        .ok_or(ExtractionError::SectionStartNotFound)?;
    let end = END_RE
        .find(&text[start.end()..])
        .ok_or(ExtractionError::SectionEndNotFound)?;

    let section = &text[start.end()..start.end() + end.start()];
    debug!("答案章节长度: {} 字符", section.chars().count());
    Ok(section)
}

/// 把答案章节切成 题号 → 解析文本
pub fn extract_solutions(section: &str) -> AppResult<BTreeMap<QuestionId, String>> {
    let markers: Vec<_> = SOLUTION_RE.captures_iter(section).collect();
    if markers.is_empty() {
        return Err(ExtractionError::NoSolutions.into());
    }

    let mut solutions = BTreeMap::new();
    for (idx, caps) in markers.iter().enumerate() {
        let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let body_end = markers
            .get(idx + 1)
            .and_then(|next| next.get(0))
            .map_or(section.len(), |m| m.start());

        let id = number
            .as_str()
            .parse::<u32>()
            .ok()
            .and_then(QuestionId::from_item_number);
        let Some(id) = id else {
            warn!("⚠️ 忽略超出范围的题号: {}", number.as_str());
            continue;
        };

        let body = WHITESPACE_RE
            .replace_all(&section[whole.end()..body_end], " ")
            .trim()
            .to_string();
        solutions.insert(id, body);
    }

    debug!("解析出 {} 条答案", solutions.len());
    Ok(solutions)
}
