//! 题目处理上下文
//!
//! 封装"我正在处理哪一年、第几页的哪道题"这一信息

use std::fmt::Display;

use crate::models::QuestionId;

/// 题目处理上下文
#[derive(Debug, Clone, Copy)]
pub struct QuestionCtx<'a> {
    pub year: &'a str,
    /// 页码（从 1 开始，仅用于日志显示）
    pub page: u32,
    pub id: QuestionId,
    /// 正确答案字母
    pub answer: char,
}

impl<'a> QuestionCtx<'a> {
    pub fn new(year: &'a str, page: u32, id: QuestionId, answer: char) -> Self {
        Self {
            year,
            page,
            id,
            answer,
        }
    }
}

impl Display for QuestionCtx<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} 第{}页 {}]", self.year, self.page, self.id)
    }
}
