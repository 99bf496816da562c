//! 会话关联器
//!
//! 把分散到达的 Preparing / Parameters / 完成信号三类日志行按键关联为
//! 一次逻辑语句执行（会话）。关联与参数值解析刻意解耦：`Parameters`
//! 行只捕获原始参数文本，类型化的参数列表由调用方填入。
//!
//! 会话键：有线程 ID 时为 `thread:{id}:{mapper}`，否则回落到
//! `time:{timestamp}:{mapper}`。时间键是"同一瞬间、同一语句"的近似：
//! 当时间戳粒度粗于执行频率时，两次无线程标识的同语句调用可能被错误
//! 合并——这是沿袭原始语义的已知局限，不做"修复"。
//!
//! 生命周期：成功完成的会话由调用方在重建后显式移除；唯一的自动移除
//! 路径是按超时的周期清扫（`sweep_expired` / `SessionSweeper`），
//! 保证完成行永不到达的会话不会无限占用内存。

use crate::restore::types::{LogEntry, LogType, Parameter};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Preparing 行的捕获
#[derive(Debug, Clone)]
pub struct PreparingCapture {
    /// 去掉 `Preparing:` 关键字后的 SQL 文本
    pub sql: String,
    /// 该行的时间戳原文
    pub timestamp: String,
    /// 原始日志行
    pub raw_line: String,
}

/// Parameters 行的捕获
#[derive(Debug, Clone)]
pub struct ParametersCapture {
    /// 类型化参数列表，初始为空，由调用方填入
    pub params: Vec<Parameter>,
    /// 去掉 `Parameters:` 关键字后的参数描述文本
    pub text: String,
    /// 该行的时间戳原文
    pub timestamp: String,
    /// 原始日志行
    pub raw_line: String,
}

/// 一次逻辑语句执行的在途关联状态
///
/// 由 `SessionCorrelator` 独占持有：首个引用未知键的日志行创建，
/// 调用方重建成功后显式移除，或由后台清扫按不活跃时长回收。
#[derive(Debug, Clone)]
pub struct Session {
    /// 派生的会话键
    pub session_id: String,
    /// 线程 ID
    pub thread_id: Option<String>,
    /// 线程名
    pub thread_name: Option<String>,
    /// 语句标识
    pub mapper: String,
    /// Preparing 捕获
    pub preparing: Option<PreparingCapture>,
    /// Parameters 捕获
    pub parameters: Option<ParametersCapture>,
    /// 会话创建时刻，用于推导执行耗时
    pub created_at: Instant,
    /// 最近一次更新时刻，清扫依据
    pub last_activity: Instant,
}

impl Session {
    fn new(session_id: String, entry: &LogEntry, now: Instant) -> Self {
        Self {
            session_id,
            thread_id: entry.thread_id.clone(),
            thread_name: entry.thread_name.clone(),
            mapper: entry.mapper.clone(),
            preparing: None,
            parameters: None,
            created_at: now,
            last_activity: now,
        }
    }

    /// 会话是否完整（两类捕获齐备）
    ///
    /// 完整是重建的必要条件而非充分条件：参数数量校验仍可能拒绝。
    pub fn is_complete(&self) -> bool {
        self.preparing.is_some() && self.parameters.is_some()
    }
}

/// 去掉 content 开头的关键字，返回其后的正文
fn strip_keyword<'a>(content: &'a str, keyword: &str) -> &'a str {
    content.trim_start().strip_prefix(keyword).unwrap_or(content).trim()
}

/// 会话关联器
///
/// 逻辑上单线程：所有 `update` 调用与周期清扫串行执行，内部不加锁。
/// 需要从多个物理线程调度时（例如配合 `SessionSweeper`），必须在
/// 关联器整体外层加互斥。
pub struct SessionCorrelator {
    sessions: HashMap<String, Session>,
    timeout: Duration,
}

impl SessionCorrelator {
    /// 创建关联器，`timeout` 同时是不活跃回收阈值和清扫间隔
    pub fn new(timeout: Duration) -> Self {
        Self { sessions: HashMap::new(), timeout }
    }

    /// 从日志行派生会话键
    pub fn session_key(entry: &LogEntry) -> String {
        match &entry.thread_id {
            Some(id) => format!("thread:{}:{}", id, entry.mapper),
            None => format!("time:{}:{}", entry.timestamp, entry.mapper),
        }
    }

    /// 创建或取出会话并应用该日志行，永不失败
    ///
    /// - `Preparing` → 存入/覆盖 Preparing 捕获
    /// - `Parameters` → 存入/覆盖 Parameters 捕获（参数列表留空）
    /// - `Total`/`Updates` → 纯完成信号，不改动捕获
    ///
    /// 无论哪种类型都会刷新 `last_activity`。
    pub fn update(&mut self, entry: &LogEntry) -> &mut Session {
        let key = Self::session_key(entry);
        let now = Instant::now();
        let session = self
            .sessions
            .entry(key.clone())
            .or_insert_with(|| Session::new(key, entry, now));

        match entry.log_type {
            LogType::Preparing => {
                session.preparing = Some(PreparingCapture {
                    sql: strip_keyword(&entry.content, "Preparing:")
                        .to_string(),
                    timestamp: entry.timestamp.clone(),
                    raw_line: entry.raw_line.clone(),
                });
            }
            LogType::Parameters => {
                session.parameters = Some(ParametersCapture {
                    params: Vec::new(),
                    text: strip_keyword(&entry.content, "Parameters:")
                        .to_string(),
                    timestamp: entry.timestamp.clone(),
                    raw_line: entry.raw_line.clone(),
                });
            }
            LogType::Total | LogType::Updates | LogType::Unknown => {}
        }

        session.last_activity = now;
        session
    }

    /// 按键查询会话
    pub fn get(&self, session_id: &str) -> Option<&Session> {
        self.sessions.get(session_id)
    }

    /// 按键查询会话（可变）
    pub fn get_mut(&mut self, session_id: &str) -> Option<&mut Session> {
        self.sessions.get_mut(session_id)
    }

    /// 会话是否已完整
    pub fn is_complete(&self, session_id: &str) -> bool {
        self.sessions.get(session_id).is_some_and(Session::is_complete)
    }

    /// 显式移除会话，返回被移除的会话
    pub fn remove(&mut self, session_id: &str) -> Option<Session> {
        self.sessions.remove(session_id)
    }

    /// 清扫所有不活跃时长超过超时的会话，与完成状态无关
    ///
    /// 被清扫的会话不产生任何逐条诊断，仅以 debug 级别记录总数。
    pub fn sweep_expired(&mut self) -> usize {
        let before = self.sessions.len();
        let timeout = self.timeout;
        self.sessions
            .retain(|_, session| session.last_activity.elapsed() <= timeout);
        let removed = before - self.sessions.len();

        #[cfg(feature = "logging")]
        if removed > 0 {
            tracing::debug!("清扫过期会话: {} 个", removed);
        }

        removed
    }

    /// 当前在途会话数
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// 是否没有在途会话
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// 无条件丢弃所有在途会话，无排空语义
    pub fn dispose(&mut self) {
        self.sessions.clear();
    }
}

/// 周期清扫任务
///
/// 显式可调度、持有取消句柄的后台任务：按超时间隔对共享关联器执行
/// `sweep_expired`，`dispose`（或 Drop）停止线程。互斥锁即规格要求的
/// 关联器外层串行化。
pub struct SessionSweeper {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl SessionSweeper {
    /// 启动清扫线程，`interval` 通常等于会话超时
    pub fn start(
        correlator: Arc<Mutex<SessionCorrelator>>,
        interval: Duration,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            let step = Duration::from_millis(20).min(interval);
            loop {
                // 分片睡眠，保证 dispose 能及时返回
                let mut slept = Duration::ZERO;
                while slept < interval {
                    if flag.load(Ordering::Relaxed) {
                        return;
                    }
                    let nap = step.min(interval - slept);
                    thread::sleep(nap);
                    slept += nap;
                }
                if flag.load(Ordering::Relaxed) {
                    return;
                }
                let mut guard = match correlator.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                guard.sweep_expired();
            }
        });

        Self { stop, handle: Some(handle) }
    }

    /// 停止清扫线程并等待其退出
    pub fn dispose(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SessionSweeper {
    fn drop(&mut self) {
        self.dispose();
    }
}
