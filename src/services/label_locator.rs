//! 题号标签定位 - 业务能力层
//!
//! 在 `pdftotext -bbox` 的单词列表里找出印在页面上的题号（A1…C10）。

use std::collections::{BTreeMap, HashSet};

use crate::models::{LabelBox, LabelPoint, QuestionId, Word};

/// 只保留字母和数字
fn alphanumeric(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// 每个题号取最靠左（同列再取最靠上）的一次出现
///
/// 用于 `label_positions_<year>.json`，坐标保持 PDF 点。
pub fn first_label_points(words: &[Word]) -> BTreeMap<QuestionId, LabelPoint> {
    let mut best: BTreeMap<QuestionId, LabelPoint> = BTreeMap::new();

    for word in words {
        let Ok(id) = alphanumeric(&word.text).parse::<QuestionId>() else {
            continue;
        };
        let candidate = LabelPoint {
            x: word.x_min,
            y: word.y_min,
        };
        best.entry(id)
            .and_modify(|current| {
                let ord = candidate
                    .x
                    .total_cmp(&current.x)
                    .then(candidate.y.total_cmp(&current.y));
                if ord.is_lt() {
                    *current = candidate;
                }
            })
            .or_insert(candidate);
    }

    best
}

/// OCR 风格的归一化：大写、去掉标点、把字母 O 当作数字 0
fn normalize_token(token: &str) -> String {
    alphanumeric(&token.to_uppercase()).replace('O', "0")
}

struct Line<'a> {
    y: f64,
    words: Vec<&'a Word>,
}

/// 把 y 坐标接近的单词归为同一行
fn group_lines(words: &[Word], tolerance: f64) -> Vec<Line<'_>> {
    let mut lines: Vec<Line<'_>> = Vec::new();
    for word in words {
        match lines.iter_mut().find(|line| (line.y - word.y_min).abs() <= tolerance) {
            Some(line) => {
                line.words.push(word);
                line.y = (line.y + word.y_min) / 2.0;
            }
            None => lines.push(Line {
                y: word.y_min,
                words: vec![word],
            }),
        }
    }
    lines
}

/// 定位本页题号标签，并换算到图片像素坐标
///
/// 除了完整的 "A7" 之外，也识别被拆成两个单词的 "A" + "7"。
/// 同一题号出现多次时保留最靠左的一次（相同时保留先出现的）。
pub fn locate_labels(
    words: &[Word],
    page_ids: &[QuestionId],
    scale_x: f64,
    scale_y: f64,
    line_tolerance: f64,
) -> BTreeMap<QuestionId, LabelBox> {
    let wanted: HashSet<QuestionId> = page_ids.iter().copied().collect();
    let mut positions: BTreeMap<QuestionId, LabelBox> = BTreeMap::new();

    for mut line in group_lines(words, line_tolerance) {
        line.words.sort_by(|a, b| a.x_min.total_cmp(&b.x_min));

        for (idx, word) in line.words.iter().enumerate() {
            let token = normalize_token(&word.text);

            let found = match token.parse::<QuestionId>() {
                Ok(id) => Some((id, LabelBox::from_word(word))),
                Err(_) if matches!(token.as_str(), "A" | "B" | "C") => {
                    line.words.get(idx + 1).and_then(|next| {
                        let id = format!("{}{}", token, normalize_token(&next.text))
                            .parse::<QuestionId>()
                            .ok()?;
                        Some((id, LabelBox::from_word(word).union(&LabelBox::from_word(next))))
                    })
                }
                Err(_) => None,
            };

            let Some((id, label_box)) = found else {
                continue;
            };
            if !wanted.contains(&id) {
                continue;
            }

            let scaled = label_box.scaled(scale_x, scale_y);
            let replace = positions
                .get(&id)
                .map_or(true, |existing| scaled.left < existing.left);
            if replace {
                positions.insert(id, scaled);
            }
        }
    }

    positions
}
