//! MyBatis 日志解析和 SQL 还原工具库
//!
//! 从交错的多线程诊断日志流中识别 MyBatis 预编译语句的生命周期日志
//! （`Preparing:` / `Parameters:` / `Total:` / `Updates:`），按会话关联
//! 后把参数绑定回占位符，产出按方言格式化的完整 SQL。
//!
//! ## 使用示例
//!
//! ```
//! use mybatis_log_restore::config::RestoreConfig;
//! use mybatis_log_restore::pipeline::LogPipeline;
//!
//! let pipeline = LogPipeline::new(RestoreConfig::default());
//! let lines = [
//!     "2025-01-15 10:30:45.123 DEBUG com.example.UserMapper.selectById - ==>  Preparing: SELECT * FROM user WHERE id = ?",
//!     "2025-01-15 10:30:45.123 DEBUG com.example.UserMapper.selectById - ==> Parameters: 1(Integer)",
//!     "2025-01-15 10:30:45.123 DEBUG com.example.UserMapper.selectById - <==      Total: 1",
//! ];
//!
//! for line in lines {
//!     if let Some(record) = pipeline.feed_line(line) {
//!         assert_eq!(record.converted_sql, "SELECT * FROM user WHERE id = 1");
//!     }
//! }
//! ```

// 核心模块 - 始终可用
pub mod config;
pub mod error;
pub mod pipeline;
pub mod restore;

// 日志模块 - 需要 logging feature
#[cfg(feature = "logging")]
pub mod logging;

// 导出模块 - 需要任何导出功能
#[cfg(any(feature = "exporter-csv", feature = "exporter-json"))]
pub mod exporter;

// 重新导出常用类型
pub use config::Config;
pub use error::{RestoreError, Result};
pub use pipeline::LogPipeline;
pub use restore::{
    ConvertedSql, DatabaseType, LineParser, LogEntry, LogType, Parameter,
    ParameterParser, SessionCorrelator, SqlRebuilder,
};
