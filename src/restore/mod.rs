//! MyBatis 日志还原模块
//!
//! 提供日志行识别、参数解析、方言识别、会话关联与 SQL 重建

pub mod correlator;
pub mod dialect;
pub mod line_parser;
pub mod params;
pub mod rebuild;
pub mod types;

// 重新导出核心类型和函数
pub use correlator::{Session, SessionCorrelator, SessionSweeper};
pub use line_parser::LineParser;
pub use params::ParameterParser;
pub use rebuild::SqlRebuilder;
pub use types::{ConvertedSql, DatabaseType, LogEntry, LogType, Parameter};
