//! 日志还原管线
//!
//! 把各个叶子组件串成完整流程：原始行 → 行解析 → 会话关联 → 完成时
//! 参数解析 + 方言识别 + SQL 重建 → `ConvertedSql` 记录。
//!
//! 输入边界是逐行文本，来源无关；输出边界是每个完成且通过校验的会话
//! 产出零或一条记录，交由调用方处置。管线中没有致命错误：每种失败
//! 都退化为"放弃这一个会话"或"使用默认值"。

use crate::config::RestoreConfig;
use crate::restore::correlator::{
    Session, SessionCorrelator, SessionSweeper,
};
use crate::restore::line_parser::LineParser;
use crate::restore::params::ParameterParser;
use crate::restore::rebuild::SqlRebuilder;
use crate::restore::types::{
    ConvertedSql, DatabaseType, LogEntry, LogType, Parameter,
};
use std::io::BufRead;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// 日志还原管线
///
/// 持有会话关联器及其后台清扫任务。`feed_line` 假定单生产者串行调用；
/// 与清扫线程的并发由关联器外层的互斥锁串行化。
pub struct LogPipeline {
    config: RestoreConfig,
    correlator: Arc<Mutex<SessionCorrelator>>,
    sweeper: Option<SessionSweeper>,
}

impl LogPipeline {
    /// 按配置创建管线并启动周期清扫（间隔 = 会话超时）
    pub fn new(config: RestoreConfig) -> Self {
        let timeout = Duration::from_millis(config.session_timeout_ms);
        let correlator = Arc::new(Mutex::new(SessionCorrelator::new(timeout)));
        let sweeper =
            SessionSweeper::start(Arc::clone(&correlator), timeout);

        Self { config, correlator, sweeper: Some(sweeper) }
    }

    /// 送入一行原始日志，完成一次语句执行时返回还原记录
    ///
    /// 返回 `None` 的情形都不是错误：管线被禁用、行不属于协议、
    /// 关键字未知、会话尚未完整、参数数量校验失败（该会话被丢弃）。
    pub fn feed_line(&self, line: &str) -> Option<ConvertedSql> {
        if !self.config.enabled {
            return None;
        }

        let entry = LineParser::parse(line)?;
        if entry.log_type == LogType::Unknown {
            return None;
        }

        let mut correlator = self.lock_correlator();
        let session_id = correlator.update(&entry).session_id.clone();

        if !entry.log_type.is_completion() {
            return None;
        }
        if !correlator.is_complete(&session_id) {
            // 完成信号先于捕获到达：只刷新了活跃时间，残留会话交给清扫
            return None;
        }

        // 把类型化参数填回会话，再做校验与重建
        let params = {
            let session = correlator.get_mut(&session_id)?;
            let text = session.parameters.as_ref()?.text.clone();
            let params = ParameterParser::parse(&text);
            if let Some(capture) = session.parameters.as_mut() {
                capture.params = params.clone();
            }
            params
        };

        let session = correlator.get(&session_id)?.clone();
        let record = self.convert(&session, &params, &entry);
        correlator.remove(&session_id);
        record
    }

    /// 把完整会话转换为还原记录，校验或重建失败时返回 `None`
    fn convert(
        &self,
        session: &Session,
        params: &[Parameter],
        completion: &LogEntry,
    ) -> Option<ConvertedSql> {
        let preparing = session.preparing.as_ref()?;
        let parameters = session.parameters.as_ref()?;

        if let Err(err) = ParameterParser::validate_count(
            &preparing.sql,
            params,
            &session.mapper,
        ) {
            #[cfg(feature = "logging")]
            tracing::warn!("放弃会话 {}: {}", session.session_id, err);
            #[cfg(not(feature = "logging"))]
            let _ = err;
            return None;
        }

        let database = if self.config.auto_detect_database {
            DatabaseType::detect(&preparing.sql)
        } else {
            self.config.default_database_type()
        };

        let converted =
            match SqlRebuilder::rebuild(&preparing.sql, params, database) {
                Ok(sql) => sql,
                Err(err) => {
                    #[cfg(feature = "logging")]
                    tracing::warn!(
                        "重建失败，放弃会话 {}: {}",
                        session.session_id,
                        err
                    );
                    #[cfg(not(feature = "logging"))]
                    let _ = err;
                    return None;
                }
            };

        let execution_time =
            i64::try_from(session.created_at.elapsed().as_millis()).ok();

        Some(ConvertedSql {
            original_sql: preparing.sql.clone(),
            converted_sql: converted,
            database,
            parameters: params.to_vec(),
            execution_time,
            mapper: session.mapper.clone(),
            timestamp: preparing.timestamp.clone(),
            thread_info: session
                .thread_name
                .clone()
                .or_else(|| session.thread_id.clone()),
            preparing_line: preparing.raw_line.clone(),
            parameters_line: parameters.raw_line.clone(),
            completion_line: completion.raw_line.clone(),
        })
    }

    /// 流式处理一个读取器，每条还原记录回调一次
    ///
    /// 单行读取失败只跳过该行，返回成功还原的记录数。
    pub fn process_reader<R, F>(
        &self,
        reader: R,
        mut hook: F,
    ) -> crate::error::Result<usize>
    where
        R: BufRead,
        F: FnMut(&ConvertedSql),
    {
        let mut count = 0usize;
        for (line_num, line) in reader.lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    #[cfg(feature = "logging")]
                    tracing::warn!("读取行 {} 失败: {}", line_num + 1, err);
                    #[cfg(not(feature = "logging"))]
                    let _ = (line_num, err);
                    continue;
                }
            };
            if let Some(record) = self.feed_line(&line) {
                count += 1;
                hook(&record);
            }
        }
        Ok(count)
    }

    /// 流式处理一个日志文件，每条还原记录回调一次
    pub fn process_file<P, F>(
        &self,
        path: P,
        hook: F,
    ) -> crate::error::Result<usize>
    where
        P: AsRef<Path>,
        F: FnMut(&ConvertedSql),
    {
        let file = std::fs::File::open(path)?;
        self.process_reader(std::io::BufReader::new(file), hook)
    }

    /// 当前在途会话数
    pub fn pending_sessions(&self) -> usize {
        self.lock_correlator().len()
    }

    /// 停止清扫任务并无条件丢弃所有在途会话
    pub fn dispose(&mut self) {
        if let Some(mut sweeper) = self.sweeper.take() {
            sweeper.dispose();
        }
        self.lock_correlator().dispose();
    }

    fn lock_correlator(&self) -> MutexGuard<'_, SessionCorrelator> {
        match self.correlator.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Drop for LogPipeline {
    fn drop(&mut self) {
        self.dispose();
    }
}
