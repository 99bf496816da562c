//! 配置管理模块
//!
//! 提供统一的配置文件读取和管理功能

use crate::error::{Result, RestoreError};
use crate::restore::types::DatabaseType;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 主配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
    /// SQL 还原配置
    #[serde(default)]
    pub restore: RestoreConfig,
    /// 导出配置
    #[serde(default)]
    pub export: ExportConfig,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 是否启用控制台输出
    pub enable_stdout: bool,
    /// 日志输出目录
    pub log_dir: String,
    /// 日志级别 (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enable_stdout: true,
            log_dir: "logs".to_string(),
            level: "info".to_string(),
        }
    }
}

/// SQL 还原配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreConfig {
    /// 是否启用日志还原管线
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// 会话超时时间（毫秒），超时的未完成会话会被清理
    #[serde(default = "default_session_timeout_ms")]
    pub session_timeout_ms: u64,
    /// 是否根据 SQL 文本自动识别数据库方言
    #[serde(default = "default_enabled")]
    pub auto_detect_database: bool,
    /// 关闭自动识别时使用的默认方言 (MySQL, PostgreSQL, Oracle, SQLServer)
    #[serde(default = "default_database")]
    pub default_database: String,
}

fn default_enabled() -> bool {
    true
}

fn default_session_timeout_ms() -> u64 {
    5000
}

fn default_database() -> String {
    "MySQL".to_string()
}

impl Default for RestoreConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            session_timeout_ms: default_session_timeout_ms(),
            auto_detect_database: default_enabled(),
            default_database: default_database(),
        }
    }
}

impl RestoreConfig {
    /// 解析配置中的默认方言，无法识别时回落到 MySQL
    pub fn default_database_type(&self) -> DatabaseType {
        DatabaseType::from_name(&self.default_database)
            .unwrap_or(DatabaseType::MySql)
    }
}

/// 导出配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    /// CSV 导出配置
    #[serde(default)]
    pub csv: Vec<CsvConfig>,
    /// JSON 导出配置
    #[serde(default)]
    pub json: Vec<JsonConfig>,
}

/// CSV 导出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvConfig {
    /// 输出文件路径
    pub out_path: String,
    /// 是否覆盖现有文件
    #[serde(default)]
    pub overwrite: bool,
}

/// JSON 导出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonConfig {
    /// 输出文件路径
    pub out_path: String,
    /// 是否覆盖现有文件
    #[serde(default)]
    pub overwrite: bool,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// 从字符串加载配置
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        // 验证日志级别
        match self.log.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(RestoreError::config(format!(
                    "无效的日志级别: {}",
                    self.log.level
                )));
            }
        }

        // 验证会话超时
        if self.restore.session_timeout_ms == 0 {
            return Err(RestoreError::config("会话超时时间不能为0"));
        }

        // 验证默认方言
        if DatabaseType::from_name(&self.restore.default_database).is_none() {
            return Err(RestoreError::config(format!(
                "无效的默认数据库方言: {}",
                self.restore.default_database
            )));
        }

        if self.export.csv.is_empty() && self.export.json.is_empty() {
            #[cfg(feature = "logging")]
            tracing::debug!("没有配置任何导出格式，仅输出到控制台");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log: LogConfig::default(),
            restore: RestoreConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.restore.enabled);
        assert_eq!(config.restore.session_timeout_ms, 5000);
        assert!(config.restore.auto_detect_database);
        assert_eq!(
            config.restore.default_database_type(),
            DatabaseType::MySql
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        // 无效日志级别
        config.log.level = "invalid".to_string();
        assert!(config.validate().is_err());

        // 会话超时为0
        config.log.level = "info".to_string();
        config.restore.session_timeout_ms = 0;
        assert!(config.validate().is_err());

        // 无效方言
        config.restore.session_timeout_ms = 5000;
        config.restore.default_database = "MongoDB".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_str_with_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.restore.session_timeout_ms, 5000);

        let config = Config::from_str(
            r#"
[restore]
session_timeout_ms = 10000
auto_detect_database = false
default_database = "Oracle"
"#,
        )
        .unwrap();
        assert_eq!(config.restore.session_timeout_ms, 10000);
        assert!(!config.restore.auto_detect_database);
        assert_eq!(
            config.restore.default_database_type(),
            DatabaseType::Oracle
        );
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.log.level, parsed.log.level);
        assert_eq!(
            config.restore.session_timeout_ms,
            parsed.restore.session_timeout_ms
        );
    }
}
