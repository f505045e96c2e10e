pub mod answer_key;
pub mod explanation;
pub mod label;
pub mod layout;
pub mod loaders;
pub mod question;

pub use answer_key::AnswerKey;
pub use explanation::{Explanation, ExplanationsFile};
pub use label::{CropRect, LabelBox, LabelPoint, LabelPositionsFile, PageSize, Word};
pub use layout::questions_by_page;
pub use loaders::load_settings;
pub use question::{Group, QuestionId};
