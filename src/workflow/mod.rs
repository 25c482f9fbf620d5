//! 流程层
//!
//! 定义"一次生成会话"的完整处理流程

pub mod batch;
pub mod session;

pub use batch::{sanitize_batch, validate_wire_shape, BatchEmitter};
pub use session::{GenerationSession, SessionReport, SessionState};
