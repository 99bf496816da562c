//! MyBatis 日志还原的核心类型定义

use serde::{Deserialize, Serialize};

/// 日志行类型，由 content 的第一个关键字决定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogType {
    /// `Preparing:` 带占位符的 SQL 文本
    Preparing,
    /// `Parameters:` 绑定参数列表
    Parameters,
    /// `Total:` 查询结果行数（完成信号）
    Total,
    /// `Updates:` 更新影响行数（完成信号）
    Updates,
    /// 其他关键字，调用方忽略
    Unknown,
}

impl LogType {
    /// 从 content 的首个关键字推导日志类型
    pub fn from_content(content: &str) -> Self {
        let c = content.trim_start();
        if c.starts_with("Preparing:") {
            Self::Preparing
        } else if c.starts_with("Parameters:") {
            Self::Parameters
        } else if c.starts_with("Total:") {
            Self::Total
        } else if c.starts_with("Updates:") {
            Self::Updates
        } else {
            Self::Unknown
        }
    }

    /// 是否为语句执行的完成信号
    pub fn is_completion(self) -> bool {
        matches!(self, Self::Total | Self::Updates)
    }
}

/// 单条已识别的日志行，解析后不可变
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    /// 日志时间戳，保留原文，不做日历解析
    pub timestamp: String,
    /// 线程 ID（仅部分格式携带）
    pub thread_id: Option<String>,
    /// 线程名（仅部分格式携带）
    pub thread_name: Option<String>,
    /// 语句标识（mapper 方法全名）
    pub mapper: String,
    /// 日志类型
    pub log_type: LogType,
    /// 箭头标记之后的文本（含关键字）
    pub content: String,
    /// 原始日志行
    pub raw_line: String,
}

/// 单个绑定参数，不可变值类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    /// 参数值原文
    pub value: String,
    /// 参数类型名，无类型标注时为 "Unknown"
    pub param_type: String,
}

impl Parameter {
    pub fn new(value: impl Into<String>, param_type: impl Into<String>) -> Self {
        Self { value: value.into(), param_type: param_type.into() }
    }
}

/// 目标数据库方言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseType {
    MySql,
    PostgreSql,
    Oracle,
    SqlServer,
    Unknown,
}

impl DatabaseType {
    /// 从配置中的名称解析方言，大小写不敏感
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "mysql" => Some(Self::MySql),
            "postgresql" | "postgres" => Some(Self::PostgreSql),
            "oracle" => Some(Self::Oracle),
            "sqlserver" | "mssql" => Some(Self::SqlServer),
            _ => None,
        }
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::MySql => "MySQL",
            Self::PostgreSql => "PostgreSQL",
            Self::Oracle => "Oracle",
            Self::SqlServer => "SQLServer",
            Self::Unknown => "Unknown",
        };
        write!(f, "{name}")
    }
}

/// 还原完成的 SQL 记录，管线的最终输出
#[derive(Debug, Clone, Serialize)]
pub struct ConvertedSql {
    /// 带占位符的原始 SQL
    pub original_sql: String,
    /// 参数绑定完成的 SQL
    pub converted_sql: String,
    /// 识别出或指定的数据库方言
    pub database: DatabaseType,
    /// 绑定参数列表
    pub parameters: Vec<Parameter>,
    /// 会话从创建到完成的墙钟毫秒数
    pub execution_time: Option<i64>,
    /// 语句标识
    pub mapper: String,
    /// Preparing 行的时间戳
    pub timestamp: String,
    /// 线程信息（线程名优先，其次线程 ID）
    pub thread_info: Option<String>,
    /// Preparing 原始行
    pub preparing_line: String,
    /// Parameters 原始行
    pub parameters_line: String,
    /// 完成信号原始行
    pub completion_line: String,
}
