//! SQL 重建
//!
//! 从左到右扫描 SQL，把第 N 个 `?` 占位符替换为第 N 个按方言格式化的
//! 参数字面量。调用前必须已通过占位符数量校验，重建本身不再校验。

use crate::error::{Result, RestoreError};
use crate::restore::types::{DatabaseType, Parameter};

/// SQL 重建器
pub struct SqlRebuilder;

impl SqlRebuilder {
    /// 把有序参数列表绑定进带占位符的 SQL
    pub fn rebuild(
        sql: &str,
        params: &[Parameter],
        database: DatabaseType,
    ) -> Result<String> {
        let mut result = String::with_capacity(sql.len() + 16 * params.len());
        let mut iter = params.iter();

        for ch in sql.chars() {
            if ch == '?' {
                match iter.next() {
                    Some(param) => result
                        .push_str(&Self::format_parameter(param, database)),
                    None => {
                        return Err(RestoreError::parse_error(format!(
                            "占位符多于参数: {sql}"
                        )));
                    }
                }
            } else {
                result.push(ch);
            }
        }

        Ok(result)
    }

    /// 按参数类型与方言格式化单个字面量
    ///
    /// 规则表：
    /// - null 值 → `NULL`
    /// - 数值类型 → 原样不加引号
    /// - Boolean → MySQL/PostgreSQL 用 `TRUE`/`FALSE`，Oracle/SQLServer 用 `1`/`0`
    /// - Timestamp → Oracle 用 `TO_TIMESTAMP`，其余单引号
    /// - LocalDateTime → PostgreSQL 加 `::timestamp`，Oracle 同 Timestamp
    /// - LocalDate/Date → PostgreSQL 加 `::date`，Oracle 用 `TO_DATE`
    /// - Unknown（无类型标注）→ 原样透传
    /// - 其余（String 等）→ 单引号包裹，内部 `'` 翻倍为 `''`
    pub fn format_parameter(
        param: &Parameter,
        database: DatabaseType,
    ) -> String {
        if param.value.eq_ignore_ascii_case("null") {
            return "NULL".to_string();
        }

        let value = param.value.as_str();
        match param.param_type.as_str() {
            "Integer" | "Long" | "Double" | "Float" | "BigDecimal"
            | "Short" | "Byte" => value.to_string(),

            "Boolean" => {
                let truthy = value.eq_ignore_ascii_case("true") || value == "1";
                match database {
                    DatabaseType::Oracle | DatabaseType::SqlServer => {
                        if truthy { "1" } else { "0" }.to_string()
                    }
                    _ => if truthy { "TRUE" } else { "FALSE" }.to_string(),
                }
            }

            "Timestamp" => match database {
                DatabaseType::Oracle => format!(
                    "TO_TIMESTAMP('{value}', 'YYYY-MM-DD HH24:MI:SS.FF')"
                ),
                _ => format!("'{value}'"),
            },

            "LocalDateTime" => match database {
                DatabaseType::PostgreSql => format!("'{value}'::timestamp"),
                DatabaseType::Oracle => format!(
                    "TO_TIMESTAMP('{value}', 'YYYY-MM-DD HH24:MI:SS.FF')"
                ),
                _ => format!("'{value}'"),
            },

            "LocalDate" | "Date" => match database {
                DatabaseType::PostgreSql => format!("'{value}'::date"),
                DatabaseType::Oracle => {
                    format!("TO_DATE('{value}', 'YYYY-MM-DD')")
                }
                _ => format!("'{value}'"),
            },

            // 无类型标注的值作为不透明文本原样透传
            "Unknown" => value.to_string(),

            _ => format!("'{}'", value.replace('\'', "''")),
        }
    }
}
