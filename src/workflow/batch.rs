//! 批次发射器 - 流程层
//!
//! 把会话积累的题目整理成持久化端期望的形状并原子交付。
//! 提交前做两层校验：
//! 1. 生成侧不变量（恰好 4 个选项、恰好 1 个正确）——违规者丢弃并告警
//! 2. 持久化端形状约束（每条记录 2 或 4 个选项）——违规即整批拒绝，不写入任何记录

use crate::clients::BackendClient;
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::GeneratedQuestion;
use tracing::{info, warn};

/// 批次发射器
pub struct BatchEmitter {
    backend: BackendClient,
}

impl BatchEmitter {
    /// 创建新的批次发射器
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    /// 校验并原子提交整个批次
    ///
    /// # 返回
    /// 返回实际提交的记录数；空批次直接返回 0，不发起网络请求
    pub async fn emit(&self, questions: Vec<GeneratedQuestion>) -> AppResult<usize> {
        let batch = sanitize_batch(questions);

        if batch.is_empty() {
            info!("批次为空，跳过提交");
            return Ok(0);
        }

        validate_wire_shape(&batch)?;

        let submitted = self.backend.submit_questions(&batch).await?;
        info!("📤 批次提交成功: {} 条题目", submitted);
        Ok(submitted)
    }
}

/// 丢弃违反生成侧不变量的记录
///
/// 每条存活记录满足：恰好 4 个选项、恰好 1 个正确答案。
/// 违规不致命，告警后丢弃
pub fn sanitize_batch(questions: Vec<GeneratedQuestion>) -> Vec<GeneratedQuestion> {
    questions
        .into_iter()
        .filter(|q| {
            if q.answers.len() != 4 {
                warn!(
                    "⚠️ 丢弃选项数量异常的题目 ({} 个选项): {}",
                    q.answers.len(),
                    q.question_str
                );
                return false;
            }
            if q.correct_count() != 1 {
                warn!(
                    "⚠️ 丢弃正确答案数量异常的题目 ({} 个正确): {}",
                    q.correct_count(),
                    q.question_str
                );
                return false;
            }
            true
        })
        .collect()
}

/// 持久化端形状校验
///
/// 每条记录的选项数必须为 2 或 4，否则整个提交在任何写入发生前被拒绝
pub fn validate_wire_shape(batch: &[GeneratedQuestion]) -> AppResult<()> {
    for q in batch {
        let count = q.answers.len();
        if count != 2 && count != 4 {
            return Err(AppError::Validation(ValidationError::WrongAnswerCount {
                question: q.question_str.clone(),
                count,
            }));
        }
    }
    Ok(())
}
