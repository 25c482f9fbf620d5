use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 文档加载错误
    Document(DocumentLoadError),
    /// 补全服务错误
    Completion(CompletionServiceError),
    /// 批次校验错误
    Validation(ValidationError),
    /// 授权错误
    Authorization(AuthorizationError),
    /// 配置错误
    Config(ConfigError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Document(e) => write!(f, "文档错误: {}", e),
            AppError::Completion(e) => write!(f, "补全服务错误: {}", e),
            AppError::Validation(e) => write!(f, "校验错误: {}", e),
            AppError::Authorization(e) => write!(f, "授权错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Document(e) => Some(e),
            AppError::Completion(e) => Some(e),
            AppError::Validation(e) => Some(e),
            AppError::Authorization(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 文档加载错误
///
/// 会话级致命错误：没有内容就没有部分结果可言
#[derive(Debug)]
pub enum DocumentLoadError {
    /// 文件打开或解码失败
    OpenFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 文档中没有可提取的文本
    NoExtractableText { path: String },
}

impl fmt::Display for DocumentLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentLoadError::OpenFailed { path, source } => {
                write!(f, "无法打开文档 ({}): {}", path, source)
            }
            DocumentLoadError::NoExtractableText { path } => {
                write!(f, "文档中没有可提取的文本: {}", path)
            }
        }
    }
}

impl std::error::Error for DocumentLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DocumentLoadError::OpenFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            DocumentLoadError::NoExtractableText { .. } => None,
        }
    }
}

/// 补全服务错误
///
/// 轮次级错误：中止后续轮次，已积累的结果作为部分批次返回
#[derive(Debug)]
pub enum CompletionServiceError {
    /// API 调用失败
    RequestFailed {
        model: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 请求频率限制
    RateLimited { model: String },
    /// 返回内容为空
    EmptyResponse { model: String },
    /// 请求超时
    Timeout { model: String, seconds: u64 },
}

impl fmt::Display for CompletionServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionServiceError::RequestFailed { model, source } => {
                write!(f, "补全 API 调用失败 (模型: {}): {}", model, source)
            }
            CompletionServiceError::RateLimited { model } => {
                write!(f, "补全 API 请求频率限制 (模型: {})", model)
            }
            CompletionServiceError::EmptyResponse { model } => {
                write!(f, "补全 API 返回内容为空 (模型: {})", model)
            }
            CompletionServiceError::Timeout { model, seconds } => {
                write!(f, "补全 API 请求超时 (模型: {}, {}秒)", model, seconds)
            }
        }
    }
}

impl std::error::Error for CompletionServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompletionServiceError::RequestFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 批次校验错误
///
/// 批次形状违规：整个批次被拒绝，不允许部分持久化
#[derive(Debug)]
pub enum ValidationError {
    /// 选项数量不合法（持久化端只接受 2 或 4 个）
    WrongAnswerCount { question: String, count: usize },
    /// 上传的文档为空
    EmptyDocument,
    /// 持久化端拒绝了整个批次
    BatchRejected {
        status: Option<u16>,
        message: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::WrongAnswerCount { question, count } => {
                write!(f, "题目选项数量不合法 (题目: {}, 数量: {})", question, count)
            }
            ValidationError::EmptyDocument => write!(f, "上传的文档为空"),
            ValidationError::BatchRejected { status, message } => {
                write!(f, "批次被拒绝 (状态: {:?}): {}", status, message)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// 授权错误
///
/// 战役不属于调用者：直接返回，不尝试生成
#[derive(Debug)]
pub enum AuthorizationError {
    /// 战役不属于该用户
    CampaignNotOwned { user_id: i64, campaign_id: i64 },
    /// 身份查询失败
    IdentityCheckFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for AuthorizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthorizationError::CampaignNotOwned {
                user_id,
                campaign_id,
            } => {
                write!(f, "战役 {} 不属于用户 {}", campaign_id, user_id)
            }
            AuthorizationError::IdentityCheckFailed { source } => {
                write!(f, "身份校验失败: {}", source)
            }
        }
    }
}

impl std::error::Error for AuthorizationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthorizationError::IdentityCheckFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 环境变量解析失败
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置文件解析失败
    FileParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EnvVarParseFailed {
                var_name,
                value,
                expected_type,
            } => {
                write!(
                    f,
                    "环境变量 {} 解析失败: 值 '{}' 无法转换为 {}",
                    var_name, value, expected_type
                )
            }
            ConfigError::FileParseFailed { path, source } => {
                write!(f, "配置文件解析失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::FileParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

// ========== 从常见错误类型转换 ==========
// 注意：不需要手动实现 From<AppError> for anyhow::Error，
// 因为 anyhow 已经为所有实现了 std::error::Error 的类型提供了自动实现

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Other(format!("IO 错误: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Other(format!("JSON 解析失败: {}", err))
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(ConfigError::FileParseFailed {
            path: String::new(), // TOML错误通常不包含路径信息
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文档打开失败错误
    pub fn document_open_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Document(DocumentLoadError::OpenFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建补全 API 调用失败错误
    pub fn completion_request_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Completion(CompletionServiceError::RequestFailed {
            model: model.into(),
            source: Box::new(source),
        })
    }

    /// 创建批次拒绝错误
    pub fn batch_rejected(status: Option<u16>, message: impl Into<String>) -> Self {
        AppError::Validation(ValidationError::BatchRejected {
            status,
            message: message.into(),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
