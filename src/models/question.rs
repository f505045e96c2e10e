//! 题号
//!
//! 袋鼠数学竞赛每年 30 道题：A1–A10、B1–B10、C1–C10

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// 题组
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Group {
    A,
    B,
    C,
}

impl Group {
    pub const ALL: [Group; 3] = [Group::A, Group::B, Group::C];

    pub fn letter(self) -> char {
        match self {
            Group::A => 'A',
            Group::B => 'B',
            Group::C => 'C',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'A' => Some(Group::A),
            'B' => Some(Group::B),
            'C' => Some(Group::C),
            _ => None,
        }
    }

    fn offset(self) -> u32 {
        match self {
            Group::A => 0,
            Group::B => 10,
            Group::C => 20,
        }
    }
}

/// 题号，例如 `A1`、`C10`
///
/// 排序顺序为 A1 < A2 < … < A10 < B1 < … < C10。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuestionId {
    group: Group,
    index: u8,
}

impl QuestionId {
    /// 创建题号，`index` 必须在 1..=10 之间
    pub fn new(group: Group, index: u8) -> Option<Self> {
        (1..=10).contains(&index).then_some(Self { group, index })
    }

    /// 解答册中的连续编号（1–30）转换为题号
    pub fn from_item_number(number: u32) -> Option<Self> {
        if !(1..=30).contains(&number) {
            return None;
        }
        let group = Group::ALL[((number - 1) / 10) as usize];
        let index = (number - group.offset()) as u8;
        Some(Self { group, index })
    }

    /// 反向转换，A1 → 1，C10 → 30
    pub fn item_number(self) -> u32 {
        self.group.offset() + u32::from(self.index)
    }

    pub fn group(self) -> Group {
        self.group
    }

    pub fn index(self) -> u8 {
        self.index
    }

    /// 按顺序列出全部 30 个题号
    pub fn all() -> impl Iterator<Item = QuestionId> {
        (1..=30).filter_map(Self::from_item_number)
    }

    /// 同一题组内的一段题号，例如 `range(Group::B, 6, 10)` → B6..=B10
    pub fn range(group: Group, from: u8, to: u8) -> Vec<QuestionId> {
        (from..=to).filter_map(|i| Self::new(group, i)).collect()
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.group.letter(), self.index)
    }
}

/// 题号解析失败
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseQuestionIdError(pub String);

impl fmt::Display for ParseQuestionIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "不是合法的题号: {}", self.0)
    }
}

impl std::error::Error for ParseQuestionIdError {}

impl FromStr for QuestionId {
    type Err = ParseQuestionIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseQuestionIdError(s.to_string());
        let mut chars = s.chars();
        let group = chars.next().and_then(Group::from_letter).ok_or_else(err)?;
        let digits = chars.as_str();
        // 不接受 "A01"、"A+1" 这类写法
        if digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let index: u8 = digits.parse().map_err(|_| err())?;
        Self::new(group, index).ok_or_else(err)
    }
}

impl Serialize for QuestionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for QuestionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn id(s: &str) -> QuestionId {
        s.parse().unwrap()
    }

    #[test]
    fn test_item_number_mapping() {
        assert_eq!(QuestionId::from_item_number(1), Some(id("A1")));
        assert_eq!(QuestionId::from_item_number(10), Some(id("A10")));
        assert_eq!(QuestionId::from_item_number(11), Some(id("B1")));
        assert_eq!(QuestionId::from_item_number(20), Some(id("B10")));
        assert_eq!(QuestionId::from_item_number(21), Some(id("C1")));
        assert_eq!(QuestionId::from_item_number(30), Some(id("C10")));
        assert_eq!(QuestionId::from_item_number(0), None);
        assert_eq!(QuestionId::from_item_number(31), None);
    }

    #[test]
    fn test_item_number_inverse() {
        for n in 1..=30 {
            assert_eq!(QuestionId::from_item_number(n).unwrap().item_number(), n);
        }
    }

    #[test]
    fn test_parse_rejects_invalid() {
        for bad in ["", "A", "D1", "A0", "A11", "A01", "A+1", "a1", "B1x"] {
            assert!(bad.parse::<QuestionId>().is_err(), "{} 应该解析失败", bad);
        }
    }

    #[test]
    fn test_ordering_is_reading_order() {
        let all: Vec<String> = QuestionId::all().map(|q| q.to_string()).collect();
        assert_eq!(all.len(), 30);
        assert_eq!(all[0], "A1");
        assert_eq!(all[9], "A10");
        assert_eq!(all[10], "B1");
        assert_eq!(all[29], "C10");
        assert!(id("A2") < id("A10"));
    }

    #[test]
    fn test_serde_as_map_key() {
        let mut map = BTreeMap::new();
        map.insert(id("B3"), 2);
        map.insert(id("A10"), 1);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"A10":1,"B3":2}"#);

        let back: BTreeMap<QuestionId, i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_range() {
        let ids: Vec<String> = QuestionId::range(Group::B, 6, 10)
            .iter()
            .map(|q| q.to_string())
            .collect();
        assert_eq!(ids, ["B6", "B7", "B8", "B9", "B10"]);
    }
}
