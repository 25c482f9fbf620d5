//! 补全服务客户端
//!
//! 薄适配层：把一条指令发给外部文本补全服务，返回原始文本。
//! 以 trait 注入到流程层，测试时用脚本化的假实现替换。

use crate::config::Config;
use crate::error::{AppError, AppResult, CompletionServiceError};
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// 补全服务后端
///
/// 流程层只依赖这个接口，不关心具体提供方
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// 发送一条指令，返回单条文本补全
    async fn complete(&self, system_message: &str, user_message: &str) -> AppResult<String>;
}

/// 兼容 OpenAI API 的补全客户端
///
/// 凭证与端点在构造时显式传入，不读取模块级全局状态
pub struct OpenAiCompletionClient {
    client: Client<OpenAIConfig>,
    model_name: String,
    timeout_secs: u64,
}

impl OpenAiCompletionClient {
    /// 创建新的补全客户端
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            timeout_secs: config.completion_timeout_secs,
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiCompletionClient {
    async fn complete(&self, system_message: &str, user_message: &str) -> AppResult<String> {
        debug!("调用补全 API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        // 构建消息列表
        let mut messages = Vec::new();

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_message)
            .build()
            .map_err(|e| AppError::completion_request_failed(&self.model_name, e))?;
        messages.push(ChatCompletionRequestMessage::System(system_msg));

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| AppError::completion_request_failed(&self.model_name, e))?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.7)
            .build()
            .map_err(|e| AppError::completion_request_failed(&self.model_name, e))?;

        // 调用 API；超时同样按补全服务错误处理（中止会话并返回部分结果）
        let response = match tokio::time::timeout(
            Duration::from_secs(self.timeout_secs),
            self.client.chat().create(request),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!("补全 API 调用失败: {}", e);
                let message = e.to_string();
                if message.contains("429") || message.to_lowercase().contains("rate limit") {
                    return Err(AppError::Completion(CompletionServiceError::RateLimited {
                        model: self.model_name.clone(),
                    }));
                }
                return Err(AppError::completion_request_failed(&self.model_name, e));
            }
            Err(_) => {
                warn!("补全 API 请求超时 ({}秒)", self.timeout_secs);
                return Err(AppError::Completion(CompletionServiceError::Timeout {
                    model: self.model_name.clone(),
                    seconds: self.timeout_secs,
                }));
            }
        };

        debug!("补全 API 调用成功");

        // 提取响应内容，空响应视为服务错误
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                AppError::Completion(CompletionServiceError::EmptyResponse {
                    model: self.model_name.clone(),
                })
            })?;

        Ok(content.trim().to_string())
    }
}
