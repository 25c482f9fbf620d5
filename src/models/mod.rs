//! 数据模型

pub mod difficulty;
pub mod question;

pub use difficulty::{DifficultyTier, ALL_TIERS};
pub use question::{
    AnswerOption, ContentSegment, GeneratedQuestion, ParsedQuestion, QuestionHistory,
};
