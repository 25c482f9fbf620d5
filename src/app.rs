//! 应用装配层
//!
//! 持有配置与外部服务客户端，编排一次完整的文档处理调用：
//! 归属校验 → 文档加载 → 生成会话 → 批次提交。
//!
//! 多个并发上传互不相关：每次调用创建独立的会话，
//! 不存在跨会话的共享可变状态。

use crate::clients::{BackendClient, OpenAiCompletionClient};
use crate::config::Config;
use crate::error::{AppError, AppResult, ValidationError};
use crate::services::load_document;
use crate::utils::logging;
use crate::workflow::{BatchEmitter, GenerationSession};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// 一次会话的最终摘要
#[derive(Debug)]
pub struct SessionSummary {
    /// 会话生成的题目数
    pub generated: usize,
    /// 实际提交的题目数
    pub submitted: usize,
    /// 是否为部分结果（补全服务中途失败）
    pub partial: bool,
}

/// 应用主结构
pub struct App {
    config: Config,
    completion: OpenAiCompletionClient,
    backend: BackendClient,
    emitter: BatchEmitter,
}

impl App {
    /// 初始化应用
    ///
    /// 所有凭证来自传入的配置，生命周期跟随进程装配，
    /// 不依赖模块级全局初始化
    pub fn initialize(config: Config) -> AppResult<Self> {
        config.validate()?;

        let completion = OpenAiCompletionClient::new(&config);
        let backend = BackendClient::new(&config);
        let emitter = BatchEmitter::new(backend.clone());

        Ok(Self {
            config,
            completion,
            backend,
            emitter,
        })
    }

    /// 处理一份已落盘的文档
    ///
    /// # 参数
    /// - `document_path`: 文档路径
    /// - `campaign_id`: 目标战役 ID
    /// - `user_id`: 调用者身份（仅用于归属校验，不参与生成逻辑）
    pub async fn run(
        &self,
        document_path: &Path,
        campaign_id: i64,
        user_id: i64,
    ) -> AppResult<SessionSummary> {
        logging::log_session_start(
            campaign_id,
            self.config.num_rounds,
            self.config.questions_per_round,
        );

        // 归属校验失败时不尝试任何生成
        self.backend
            .verify_campaign_ownership(user_id, campaign_id)
            .await?;
        info!("✓ 战役归属校验通过");

        let segments = load_document(document_path)?;
        logging::log_document_loaded(segments.len());

        let mut session = GenerationSession::new(
            &self.completion,
            campaign_id,
            self.config.questions_per_round,
            self.config.num_rounds,
        );
        let report = session.run(&segments).await;
        let generated = report.questions.len();

        // 部分结果同样立即提交：后续轮次依赖但不会使先前轮次失效
        let submitted = self.emitter.emit(report.questions).await?;

        logging::log_session_complete(generated, submitted, report.partial);

        Ok(SessionSummary {
            generated,
            submitted,
            partial: report.partial,
        })
    }

    /// 处理一份上传的文档字节流
    ///
    /// 字节流写入作用域受限的临时文件，所有退出路径
    /// （包括解析与补全失败）都保证删除
    pub async fn run_upload(
        &self,
        bytes: &[u8],
        campaign_id: i64,
        user_id: i64,
    ) -> AppResult<SessionSummary> {
        if bytes.is_empty() {
            return Err(AppError::Validation(ValidationError::EmptyDocument));
        }

        let mut temp = tempfile::NamedTempFile::new()?;
        temp.write_all(bytes)?;
        temp.flush()?;

        // NamedTempFile 在 drop 时删除文件，覆盖包括 `?` 在内的所有退出路径
        self.run(temp.path(), campaign_id, user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_upload_rejected() {
        let app = App::initialize(Config::default()).unwrap();
        let result = app.run_upload(&[], 1, 1).await;
        assert!(matches!(
            result,
            Err(AppError::Validation(ValidationError::EmptyDocument))
        ));
    }

    #[test]
    fn test_initialize_rejects_invalid_config() {
        let config = Config {
            num_rounds: 0,
            ..Config::default()
        };
        assert!(App::initialize(config).is_err());
    }
}
