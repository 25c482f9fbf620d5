//! 业务能力层
//!
//! 描述"我能做什么"，不关心流程顺序

pub mod document_loader;
pub mod prompt_builder;
pub mod response_parser;

pub use document_loader::{concat_segments, load_document};
pub use prompt_builder::{build_generation_prompt, SYSTEM_MESSAGE};
pub use response_parser::parse_round;
