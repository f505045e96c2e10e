use crate::models::question::{Group, QuestionId};

/// 试卷每一页上印的题目（页码从 1 开始）
pub fn questions_by_page() -> Vec<(u32, Vec<QuestionId>)> {
    vec![
        (1, QuestionId::range(Group::A, 1, 7)),
        (
            2,
            [QuestionId::range(Group::A, 8, 10), QuestionId::range(Group::B, 1, 5)].concat(),
        ),
        (
            3,
            [QuestionId::range(Group::B, 6, 10), QuestionId::range(Group::C, 1, 3)].concat(),
        ),
        (4, QuestionId::range(Group::C, 4, 10)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_covers_every_question_once() {
        let listed: Vec<QuestionId> = questions_by_page()
            .into_iter()
            .flat_map(|(_, ids)| ids)
            .collect();
        let all: Vec<QuestionId> = QuestionId::all().collect();
        assert_eq!(listed, all);
    }
}
