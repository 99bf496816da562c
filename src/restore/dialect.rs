//! SQL 方言识别
//!
//! 通过固定顺序的语法指纹检查识别目标数据库家族，首个命中生效。
//! 没有任何指纹命中时默认 MySQL，空输入返回 Unknown —— 识别失败
//! 从不是错误，只会退化为安全默认值。

use crate::restore::types::DatabaseType;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LIMIT_RE: Regex = Regex::new(r"\bLIMIT\b").unwrap();
    static ref OFFSET_RE: Regex = Regex::new(r"\bOFFSET\b").unwrap();
    static ref ROWNUM_RE: Regex = Regex::new(r"\bROWNUM\b").unwrap();
    static ref DUAL_RE: Regex = Regex::new(r"\bDUAL\b").unwrap();
    static ref TOP_RE: Regex = Regex::new(r"\bTOP\b").unwrap();
    // PostgreSQL 的 `::type` 强制转换
    static ref PG_CAST_RE: Regex = Regex::new(r"::\s*\w+").unwrap();
}

impl DatabaseType {
    /// 识别 SQL 文本的目标方言
    ///
    /// 指纹顺序：反引号标识符 → MySQL；`OFFSET` 位于 `LIMIT` 之前 →
    /// PostgreSQL；`::type` 转换 → PostgreSQL；裸 `LIMIT` → MySQL；
    /// `ROWNUM`/`DUAL` → Oracle；`TOP` → SQL Server；默认 MySQL。
    pub fn detect(sql: &str) -> Self {
        let trimmed = sql.trim();
        if trimmed.is_empty() {
            return Self::Unknown;
        }

        if trimmed.contains('`') {
            return Self::MySql;
        }

        let upper = trimmed.to_uppercase();
        let limit_pos = LIMIT_RE.find(&upper).map(|m| m.start());
        let offset_pos = OFFSET_RE.find(&upper).map(|m| m.start());

        // OFFSET 在 LIMIT 之前（或只有 OFFSET）是 PostgreSQL 的分页写法
        if let Some(op) = offset_pos {
            if limit_pos.map_or(true, |lp| op < lp) {
                return Self::PostgreSql;
            }
        }
        if PG_CAST_RE.is_match(trimmed) {
            return Self::PostgreSql;
        }
        if limit_pos.is_some() {
            return Self::MySql;
        }
        if ROWNUM_RE.is_match(&upper) || DUAL_RE.is_match(&upper) {
            return Self::Oracle;
        }
        if TOP_RE.is_match(&upper) {
            return Self::SqlServer;
        }

        Self::MySql
    }
}
