pub mod crop;
pub mod explainer;
pub mod fixture_writer;
pub mod label_locator;
pub mod llm_service;
pub mod sections;
pub mod translator;

pub use crop::compute_crop;
pub use explainer::Explainer;
pub use fixture_writer::{FixtureKind, FixtureWriter};
pub use llm_service::{LanguageModel, ModelClient, ModelReply, ModelRequest};
pub use translator::Translator;
