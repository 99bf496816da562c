//! 日志行识别与解析
//!
//! MyBatis 的预编译语句生命周期日志（`Preparing:` / `Parameters:` /
//! `Total:` / `Updates:`）会被各种日志框架包上不同的外层格式。
//! 本模块维护一张从最严格到最宽松排序的格式模式表，按序尝试、
//! 首个命中生效：
//!
//! 1. 双括号组格式：带时区偏移的时间戳 + `[进程号]` + `[线程名]`
//! 2. TID 关联前缀格式：`[TID:...]` + 单个 `[线程名]` 括号组
//! 3. 普通格式：时间戳 + 级别 + 点分 mapper + `-` 分隔
//! 4. 宽松兜底：只要求箭头标记后紧跟四个关键字之一
//!
//! 宽松模式在结构上是所有严格模式的超集，若先行尝试会遮蔽严格模式的
//! 字段提取，因此必须排在最后。仅宽松模式命中时，时间戳和 mapper
//! 通过第二张有序规则表尽力恢复，缺失时分别回落到进程时钟和固定占位符。
//!
//! 失败语义：没有异常路径，无法识别的输入返回 `None`/`false`。

use crate::restore::types::{LogEntry, LogType};
use lazy_static::lazy_static;
use regex::Regex;

/// mapper 无法恢复时使用的固定占位符
pub const UNKNOWN_MAPPER: &str = "UnknownMapper";

lazy_static! {
    // 格式 1：带时区偏移时间戳 + [进程号] + [线程名]
    static ref BRACKET_PAIR_RE: Regex = Regex::new(
        r"^(\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:[.,]\d{1,9})?(?:Z|[+-]\d{2}:?\d{2}))\s+\[(\d+)\]\s+\[([^\]]+)\]\s+\w+\s+([\w$.]+)\s*[-:]\s*(?:==>|<==)\s*(.*)$"
    ).unwrap();

    // 格式 2：[TID:...] 关联前缀 + 可选时间戳 + [线程名]
    static ref TID_RE: Regex = Regex::new(
        r"^\[TID\s*:\s*[^\]]*\]\s*(?:(\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:[.,]\d{1,9})?)\s+)?\[([^\]]+)\]\s+\w+\s+([\w$.]+)\s*-\s*(?:==>|<==)\s*(.*)$"
    ).unwrap();

    // 格式 3：时间戳 + 级别 + 可选 [线程名] + 点分 mapper + 破折号
    static ref PLAIN_RE: Regex = Regex::new(
        r"^(\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:[.,]\d{1,9})?)\s+\w+\s+(?:\[([^\]]+)\]\s+)?([\w$.]+)\s*-\s*(?:==>|<==)\s*(.*)$"
    ).unwrap();

    // 格式 4：宽松兜底，箭头标记后紧跟关键字
    static ref LOOSE_RE: Regex = Regex::new(
        r"(?:==>|<==)\s*((?:Preparing|Parameters|Total|Updates):.*)$"
    ).unwrap();

    // 兜底时间戳恢复规则，按序尝试：带时区偏移、不带偏移、仅时间
    static ref FB_TS_OFFSET_RE: Regex = Regex::new(
        r"\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:[.,]\d{1,9})?(?:Z|[+-]\d{2}:?\d{2})"
    ).unwrap();
    static ref FB_TS_PLAIN_RE: Regex = Regex::new(
        r"\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:[.,]\d{1,9})?"
    ).unwrap();
    static ref FB_TS_TIME_RE: Regex =
        Regex::new(r"\b\d{2}:\d{2}:\d{2}(?:[.,]\d{1,9})?\b").unwrap();

    // 兜底 mapper 恢复规则，按序尝试
    static ref FB_MAPPER_SEP_RE: Regex =
        Regex::new(r"([\w$.]+)\s*[:-]\s*(?:==>|<==)").unwrap();
    static ref FB_MAPPER_BRACKET_RE: Regex =
        Regex::new(r"\[([\w$.]+)\]\s*(?:==>|<==)").unwrap();
    static ref FB_MAPPER_PIPE_RE: Regex =
        Regex::new(r"\|([\w$.]+)\|\s*(?:==>|<==)").unwrap();
    static ref FB_MAPPER_BARE_RE: Regex =
        Regex::new(r"([\w$.]+)\s+(?:==>|<==)").unwrap();
}

/// 日志行识别器/解析器
///
/// `recognize` 与 `parse` 共用同一次模式表遍历，二者在构造上保持一致：
/// `parse` 返回 `Some` 当且仅当 `recognize` 返回 `true`。
pub struct LineParser;

impl LineParser {
    /// 判断一行是否属于 MyBatis 预编译语句日志协议
    pub fn recognize(line: &str) -> bool {
        Self::parse(line).is_some()
    }

    /// 解析一行日志，无法识别时返回 `None`
    ///
    /// 严格模式不要求关键字：箭头行即使携带未知关键字也会以
    /// `LogType::Unknown` 解析通过，由调用方忽略。
    pub fn parse(line: &str) -> Option<LogEntry> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return None;
        }

        if let Some(caps) = BRACKET_PAIR_RE.captures(line) {
            return Some(Self::make_entry(
                caps[1].to_string(),
                Some(caps[2].to_string()),
                Some(caps[3].to_string()),
                caps[4].to_string(),
                &caps[5],
                line,
            ));
        }

        if let Some(caps) = TID_RE.captures(line) {
            let timestamp = caps
                .get(1)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(Self::now_timestamp);
            return Some(Self::make_entry(
                timestamp,
                None,
                Some(caps[2].to_string()),
                caps[3].to_string(),
                &caps[4],
                line,
            ));
        }

        if let Some(caps) = PLAIN_RE.captures(line) {
            let thread_name = caps.get(2).map(|m| m.as_str().to_string());
            return Some(Self::make_entry(
                caps[1].to_string(),
                None,
                thread_name,
                caps[3].to_string(),
                &caps[4],
                line,
            ));
        }

        if let Some(caps) = LOOSE_RE.captures(line) {
            let timestamp = Self::extract_timestamp(line)
                .unwrap_or_else(Self::now_timestamp);
            let mapper = Self::extract_mapper(line)
                .unwrap_or_else(|| UNKNOWN_MAPPER.to_string());
            return Some(Self::make_entry(
                timestamp, None, None, mapper, &caps[1], line,
            ));
        }

        None
    }

    /// 构造 `LogEntry`，日志类型由 content 的首个关键字决定
    fn make_entry(
        timestamp: String,
        thread_id: Option<String>,
        thread_name: Option<String>,
        mapper: String,
        content: &str,
        raw_line: &str,
    ) -> LogEntry {
        let content = content.trim().to_string();
        LogEntry {
            log_type: LogType::from_content(&content),
            timestamp,
            thread_id,
            thread_name,
            mapper,
            content,
            raw_line: raw_line.to_string(),
        }
    }

    /// 在未知布局的行里尽力恢复时间戳
    ///
    /// 绝对时间戳形状按序尝试：带偏移的日期时间、不带偏移的日期时间、
    /// 仅时间。全部未命中返回 `None`。
    fn extract_timestamp(line: &str) -> Option<String> {
        for re in [&*FB_TS_OFFSET_RE, &*FB_TS_PLAIN_RE, &*FB_TS_TIME_RE] {
            if let Some(m) = re.find(line) {
                return Some(m.as_str().to_string());
            }
        }
        None
    }

    /// 在未知布局的行里尽力恢复语句标识
    ///
    /// 标识形状按序尝试：`name` 在 `:`/`-` 再接箭头之前、`[name]`
    /// 在箭头之前、`|name|` 在箭头之前、裸 `name` 紧邻箭头之前。
    fn extract_mapper(line: &str) -> Option<String> {
        for re in [
            &*FB_MAPPER_SEP_RE,
            &*FB_MAPPER_BRACKET_RE,
            &*FB_MAPPER_PIPE_RE,
            &*FB_MAPPER_BARE_RE,
        ] {
            if let Some(caps) = re.captures(line) {
                return Some(caps[1].to_string());
            }
        }
        None
    }

    /// 时间戳缺失时使用进程时钟（而非日志内容）作为默认值
    fn now_timestamp() -> String {
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
    }
}
