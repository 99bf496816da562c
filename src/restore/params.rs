//! 绑定参数解析
//!
//! `Parameters:` 行携带形如 `1(Integer), active(String), null` 的参数描述。
//! 只在顶层逗号处切分：值本身可能含括号（类型标注、嵌套值），
//! 通过括号深度计数避免把它们切开。

use crate::error::{Result, RestoreError};
use crate::restore::types::Parameter;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // 片段尾部的 `(Type)` 类型标注
    static ref TYPED_SEGMENT_RE: Regex =
        Regex::new(r"^(?s)(.*)\((\w+)\)$").unwrap();
}

/// 参数描述解析器
pub struct ParameterParser;

impl ParameterParser {
    /// 解析参数描述为有序的参数列表
    ///
    /// 每个片段的规则：
    /// - `value(Type)` → 按类型标注解析
    /// - 裸 `null`（大小写不敏感）→ `{ "null", "Unknown" }`
    /// - 其他无类型标注的片段 → `{ 片段原文, "Unknown" }`
    ///
    /// 空白片段被跳过。
    pub fn parse(param_string: &str) -> Vec<Parameter> {
        Self::split_top_level(param_string)
            .into_iter()
            .filter(|seg| !seg.trim().is_empty())
            .map(|seg| Self::parse_segment(seg.trim()))
            .collect()
    }

    /// 按顶层逗号切分，括号内的逗号不参与切分
    fn split_top_level(s: &str) -> Vec<String> {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut depth = 0usize;

        for ch in s.chars() {
            match ch {
                '(' => {
                    depth += 1;
                    current.push(ch);
                }
                ')' => {
                    depth = depth.saturating_sub(1);
                    current.push(ch);
                }
                ',' if depth == 0 => {
                    segments.push(std::mem::take(&mut current));
                }
                _ => current.push(ch),
            }
        }
        segments.push(current);
        segments
    }

    /// 解析单个片段
    fn parse_segment(segment: &str) -> Parameter {
        if segment.eq_ignore_ascii_case("null") {
            return Parameter::new("null", "Unknown");
        }

        if let Some(caps) = TYPED_SEGMENT_RE.captures(segment) {
            return Parameter::new(caps[1].trim(), &caps[2]);
        }

        Parameter::new(segment, "Unknown")
    }

    /// 统计 SQL 中 `?` 占位符的个数
    pub fn placeholder_count(sql: &str) -> usize {
        sql.matches('?').count()
    }

    /// 校验占位符与参数数量是否一致
    ///
    /// 不一致返回 `ParamCountMismatch`：该会话被放弃（不重试），
    /// 管线继续处理其他会话。
    pub fn validate_count(
        sql: &str,
        params: &[Parameter],
        mapper: &str,
    ) -> Result<()> {
        let expected = Self::placeholder_count(sql);
        if expected != params.len() {
            return Err(RestoreError::param_mismatch(
                expected,
                params.len(),
                mapper,
            ));
        }
        Ok(())
    }
}
