//! # Wizdom Question Gen
//!
//! 文字冒险战役的题目生成流水线：给定一份上传的文档，
//! 按递增难度曲线驱动大模型补全，把半结构化输出解析为
//! 离散的选择题记录，去重、乱序后作为一个原子批次交给
//! 持久化后端。
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 数据模型层（Models）
//! - `models/` - 流水线各阶段的数据形状
//! - `DifficultyTier` - 有序难度档位，轮次耗尽后固定在最后一档
//! - `ParsedQuestion` / `GeneratedQuestion` - 解析记录与持久化单元
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个输入
//! - `document_loader` - PDF 按页提取文本
//! - `prompt_builder` - 纯函数构建生成提示词
//! - `response_parser` - 防御式解析补全输出，畸形块静默丢弃
//!
//! ### ③ 外部客户端层（Clients）
//! - `clients/` - 外部服务的薄适配
//! - `CompletionBackend` - 补全服务接口（trait 注入，便于测试）
//! - `BackendClient` - 持久化后端 REST 客户端
//!
//! ### ④ 流程层（Workflow）
//! - `workflow/` - 定义"一次生成会话"的完整流程
//! - `GenerationSession` - 轮次状态机（核心控制循环）
//! - `BatchEmitter` - 批次校验与原子交付
//!
//! ### ⑤ 装配层（App）
//! - `app` - 配置装配、归属校验、临时文件作用域管理

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::{App, SessionSummary};
pub use clients::{BackendClient, CompletionBackend, OpenAiCompletionClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{
    AnswerOption, ContentSegment, DifficultyTier, GeneratedQuestion, ParsedQuestion,
    QuestionHistory,
};
pub use workflow::{BatchEmitter, GenerationSession, SessionReport, SessionState};
