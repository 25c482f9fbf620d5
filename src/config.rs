use crate::error::{AppResult, ConfigError};
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

/// 程序配置文件
///
/// 所有外部服务的凭证与端点都在进程装配时显式传入各构造函数，
/// 不使用模块级全局状态
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 每轮请求生成的题目数量
    pub questions_per_round: usize,
    /// 生成轮次数量
    pub num_rounds: usize,
    /// 补全请求超时（秒），超时视为补全服务错误
    pub completion_timeout_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    // --- 后端 API 配置 ---
    pub backend_api_base_url: String,
    pub backend_token: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            questions_per_round: 3,
            num_rounds: 5,
            completion_timeout_secs: 60,
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            backend_api_base_url: "http://localhost:5000".to_string(),
            backend_token: String::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            questions_per_round: std::env::var("QUESTIONS_PER_ROUND").ok().and_then(|v| v.parse().ok()).unwrap_or(default.questions_per_round),
            num_rounds: std::env::var("NUM_ROUNDS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.num_rounds),
            completion_timeout_secs: std::env::var("COMPLETION_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.completion_timeout_secs),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            backend_api_base_url: std::env::var("BACKEND_API_BASE_URL").unwrap_or(default.backend_api_base_url),
            backend_token: std::env::var("BACKEND_TOKEN").unwrap_or(default.backend_token),
        }
    }

    /// 从 TOML 配置文件加载
    ///
    /// 文件中未出现的字段使用默认值
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", path.display()))?;
        Ok(config)
    }

    /// 校验关键配置项
    pub fn validate(&self) -> AppResult<()> {
        if self.questions_per_round == 0 {
            return Err(ConfigError::EnvVarParseFailed {
                var_name: "QUESTIONS_PER_ROUND".to_string(),
                value: "0".to_string(),
                expected_type: "正整数".to_string(),
            }
            .into());
        }
        if self.num_rounds == 0 {
            return Err(ConfigError::EnvVarParseFailed {
                var_name: "NUM_ROUNDS".to_string(),
                value: "0".to_string(),
                expected_type: "正整数".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.questions_per_round, 3);
        assert_eq!(config.num_rounds, 5);
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let config = Config {
            num_rounds: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml_str() {
        let toml_str = r#"
            questions_per_round = 2
            num_rounds = 3
            llm_model_name = "gpt-4o"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.questions_per_round, 2);
        assert_eq!(config.num_rounds, 3);
        assert_eq!(config.llm_model_name, "gpt-4o");
        // 未出现的字段回落到默认值
        assert_eq!(config.completion_timeout_secs, 60);
    }
}
