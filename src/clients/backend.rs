//! 后端 API 客户端
//!
//! 封装与持久化后端（战役/题目 REST 服务）相关的所有调用。
//! 流水线只通过它做两件事：战役归属校验、题目批次的原子提交。

use crate::config::Config;
use crate::error::{AppError, AppResult, AuthorizationError};
use crate::models::GeneratedQuestion;
use serde_json::{json, Value};
use tracing::debug;

/// 后端 API 客户端
#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl BackendClient {
    /// 创建新的后端客户端
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.backend_api_base_url.clone(),
            token: config.backend_token.clone(),
        }
    }

    /// 校验战役归属
    ///
    /// 拉取用户的战役列表并确认目标战役在其中。
    /// 不在列表中时返回授权错误，调用方不得开始生成。
    pub async fn verify_campaign_ownership(
        &self,
        user_id: i64,
        campaign_id: i64,
    ) -> AppResult<()> {
        let url = format!("{}/campaigns/{}", self.base_url, user_id);
        debug!("校验战役归属: GET {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| {
                AppError::Authorization(AuthorizationError::IdentityCheckFailed {
                    source: Box::new(e),
                })
            })?;

        if !response.status().is_success() {
            return Err(AppError::Authorization(
                AuthorizationError::IdentityCheckFailed {
                    source: Box::new(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        format!("后端返回状态 {}", response.status()),
                    )),
                },
            ));
        }

        let campaigns: Value = response.json().await.map_err(|e| {
            AppError::Authorization(AuthorizationError::IdentityCheckFailed {
                source: Box::new(e),
            })
        })?;

        let owned = campaigns
            .as_array()
            .map(|list| {
                list.iter()
                    .any(|c| c.get("campaignID").and_then(|v| v.as_i64()) == Some(campaign_id))
            })
            .unwrap_or(false);

        if owned {
            Ok(())
        } else {
            Err(AppError::Authorization(
                AuthorizationError::CampaignNotOwned {
                    user_id,
                    campaign_id,
                },
            ))
        }
    }

    /// 原子提交题目批次
    ///
    /// 一次 POST 提交完整列表；后端的嵌套事务保证全有或全无，
    /// 任何一条记录形状不合法都会导致整个批次被拒绝。
    pub async fn submit_questions(&self, questions: &[GeneratedQuestion]) -> AppResult<usize> {
        let url = format!("{}/questions/create", self.base_url);
        debug!("提交题目批次: POST {} ({} 条)", url, questions.len());

        let body = json!({ "questions": questions });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::batch_rejected(None, format!("请求发送失败: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "<无响应体>".to_string());
            return Err(AppError::batch_rejected(Some(status.as_u16()), message));
        }

        debug!("批次提交成功 ({} 条)", questions.len());
        Ok(questions.len())
    }
}
