//! 错误类型定义
//!
//! 这个模块定义了库中使用的所有错误类型，使用 thiserror 提供丰富的错误信息。

/// MyBatis 日志还原库的结果类型
pub type Result<T> = std::result::Result<T, RestoreError>;

/// MyBatis 日志还原错误类型
#[derive(Debug, thiserror::Error)]
pub enum RestoreError {
    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// 正则表达式错误
    #[error("正则表达式错误: {0}")]
    Regex(#[from] regex::Error),

    /// 配置文件解析错误
    #[error("配置解析错误: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// 配置文件序列化错误
    #[error("配置序列化错误: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// JSON 序列化错误（仅在启用 exporter-json feature 时可用）
    #[cfg(feature = "exporter-json")]
    #[error("JSON序列化错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 占位符与参数数量不匹配
    #[error(
        "参数数量不匹配: 占位符 {expected} 个, 参数 {actual} 个 (mapper: {mapper})"
    )]
    ParamCountMismatch { expected: usize, actual: usize, mapper: String },

    /// 解析错误
    #[error("解析错误: {message}")]
    Parse { message: String },

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 日志错误（仅在启用 logging feature 时可用）
    #[cfg(feature = "logging")]
    #[error("日志错误: {0}")]
    Log(#[from] crate::logging::LogError),

    /// 其他错误
    #[error("未知错误: {0}")]
    Other(String),
}

impl RestoreError {
    /// 创建一个参数数量不匹配错误
    pub fn param_mismatch(
        expected: usize,
        actual: usize,
        mapper: impl Into<String>,
    ) -> Self {
        let mapper = mapper.into();
        #[cfg(feature = "logging")]
        {
            crate::logging::ensure_logger_initialized();
            tracing::error!(
                "参数数量不匹配: 占位符 {} 个, 参数 {} 个 (mapper: {})",
                expected,
                actual,
                mapper
            );
        }
        Self::ParamCountMismatch { expected, actual, mapper }
    }

    /// 创建一个解析错误
    pub fn parse_error<S: Into<String>>(message: S) -> Self {
        let message = message.into();
        #[cfg(feature = "logging")]
        {
            crate::logging::ensure_logger_initialized();
            tracing::error!("解析错误: {}", message);
        }
        Self::Parse { message }
    }

    /// 创建一个配置错误
    pub fn config<S: Into<String>>(message: S) -> Self {
        let message = message.into();
        #[cfg(feature = "logging")]
        {
            crate::logging::ensure_logger_initialized();
            tracing::error!("配置错误: {}", message);
        }
        Self::Config(message)
    }

    /// 创建一个其他类型错误
    pub fn other<S: Into<String>>(message: S) -> Self {
        let message = message.into();
        #[cfg(feature = "logging")]
        {
            crate::logging::ensure_logger_initialized();
            tracing::error!("未知错误: {}", message);
        }
        Self::Other(message)
    }

    /// 检查是否为 IO 错误
    pub fn is_io_error(&self) -> bool {
        matches!(self, RestoreError::Io(_))
    }

    /// 检查是否为参数数量不匹配错误
    pub fn is_param_mismatch(&self) -> bool {
        matches!(self, RestoreError::ParamCountMismatch { .. })
    }

    /// 检查是否为解析错误
    pub fn is_parse_error(&self) -> bool {
        matches!(self, RestoreError::Parse { .. })
    }

    /// 检查是否为配置错误
    pub fn is_config_error(&self) -> bool {
        matches!(self, RestoreError::Config(_))
    }
}
