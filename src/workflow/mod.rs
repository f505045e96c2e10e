pub mod explanation_flow;
pub mod question_ctx;

pub use explanation_flow::ExplanationFlow;
pub use question_ctx::QuestionCtx;
