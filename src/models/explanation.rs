use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::question::QuestionId;

/// 一道题的讲解：不泄露答案的提示 + 可以说出答案的小故事
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    #[serde(default)]
    pub hint: String,
    #[serde(default)]
    pub story: String,
}

impl Explanation {
    /// story 为空的讲解不能写入结果
    pub fn is_usable(&self) -> bool {
        !self.story.trim().is_empty()
    }
}

/// `explanations_<year>.json` 的内容
///
/// 工具 2 和 4 写入纯文本，工具 3 写入 [`Explanation`]。
pub type ExplanationsFile<T> = BTreeMap<QuestionId, T>;
