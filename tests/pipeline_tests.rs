//! 管线端到端测试

use mybatis_log_restore::config::RestoreConfig;
use mybatis_log_restore::pipeline::LogPipeline;
use mybatis_log_restore::restore::types::DatabaseType;
use std::io::Cursor;
use std::thread;
use std::time::Duration;

fn feed_all(pipeline: &LogPipeline, lines: &[&str]) -> Vec<String> {
    lines
        .iter()
        .filter_map(|line| pipeline.feed_line(line))
        .map(|record| record.converted_sql)
        .collect()
}

#[test]
fn test_threadless_lifecycle_restores_sql() {
    let pipeline = LogPipeline::new(RestoreConfig::default());

    // 无线程标识时按时间键关联，三行时间戳必须一致
    let lines = [
        "2025-01-15 10:30:45.123 DEBUG com.example.UserMapper.selectById - ==>  Preparing: SELECT * FROM user WHERE id = ?",
        "2025-01-15 10:30:45.123 DEBUG com.example.UserMapper.selectById - ==> Parameters: 1(Integer)",
        "2025-01-15 10:30:45.123 DEBUG com.example.UserMapper.selectById - <==      Total: 1",
    ];

    assert!(pipeline.feed_line(lines[0]).is_none());
    assert!(pipeline.feed_line(lines[1]).is_none());

    let record = pipeline.feed_line(lines[2]).expect("完成行应产出记录");
    assert_eq!(record.converted_sql, "SELECT * FROM user WHERE id = 1");
    assert_eq!(record.original_sql, "SELECT * FROM user WHERE id = ?");
    assert_eq!(record.mapper, "com.example.UserMapper.selectById");
    assert_eq!(record.database, DatabaseType::MySql);
    assert_eq!(record.parameters.len(), 1);
    assert!(!record.converted_sql.contains('?'));
    assert!(record.execution_time.is_some());

    // 成功还原后会话被移除
    assert_eq!(pipeline.pending_sessions(), 0);
}

#[test]
fn test_interleaved_threads_restore_independently() {
    let pipeline = LogPipeline::new(RestoreConfig::default());

    let lines = [
        "2025-01-15T10:30:45.100+08:00 [101] [exec-1] DEBUG com.example.UserMapper.selectById - ==> Preparing: SELECT * FROM user WHERE id = ?",
        "2025-01-15T10:30:45.101+08:00 [102] [exec-2] DEBUG com.example.UserMapper.selectById - ==> Preparing: SELECT * FROM user WHERE id = ?",
        "2025-01-15T10:30:45.102+08:00 [102] [exec-2] DEBUG com.example.UserMapper.selectById - ==> Parameters: 2(Integer)",
        "2025-01-15T10:30:45.103+08:00 [101] [exec-1] DEBUG com.example.UserMapper.selectById - ==> Parameters: 1(Integer)",
        "2025-01-15T10:30:45.104+08:00 [102] [exec-2] DEBUG com.example.UserMapper.selectById - <== Total: 1",
        "2025-01-15T10:30:45.105+08:00 [101] [exec-1] DEBUG com.example.UserMapper.selectById - <== Total: 1",
    ];

    let restored = feed_all(&pipeline, &lines);
    assert_eq!(
        restored,
        vec![
            "SELECT * FROM user WHERE id = 2".to_string(),
            "SELECT * FROM user WHERE id = 1".to_string(),
        ]
    );
    assert_eq!(pipeline.pending_sessions(), 0);
}

#[test]
fn test_param_count_mismatch_drops_session() {
    let pipeline = LogPipeline::new(RestoreConfig::default());

    let lines = [
        "2025-01-15T10:30:45.100+08:00 [7] [main] DEBUG com.example.M.a - ==> Preparing: SELECT * FROM t WHERE a = ? AND b = ?",
        "2025-01-15T10:30:45.101+08:00 [7] [main] DEBUG com.example.M.a - ==> Parameters: 1(Integer)",
        "2025-01-15T10:30:45.102+08:00 [7] [main] DEBUG com.example.M.a - <== Total: 1",
    ];

    assert!(feed_all(&pipeline, &lines).is_empty());
    // 校验失败的会话同样被丢弃，不影响后续
    assert_eq!(pipeline.pending_sessions(), 0);

    let followup = [
        "2025-01-15T10:30:45.200+08:00 [7] [main] DEBUG com.example.M.a - ==> Preparing: SELECT * FROM t WHERE a = ?",
        "2025-01-15T10:30:45.201+08:00 [7] [main] DEBUG com.example.M.a - ==> Parameters: 9(Integer)",
        "2025-01-15T10:30:45.202+08:00 [7] [main] DEBUG com.example.M.a - <== Total: 1",
    ];
    assert_eq!(
        feed_all(&pipeline, &followup),
        vec!["SELECT * FROM t WHERE a = 9".to_string()]
    );
}

#[test]
fn test_disabled_pipeline_produces_nothing() {
    let config = RestoreConfig { enabled: false, ..RestoreConfig::default() };
    let pipeline = LogPipeline::new(config);

    let line = "2025-01-15 10:30:45.123 DEBUG com.example.M.a - ==> Preparing: SELECT 1";
    assert!(pipeline.feed_line(line).is_none());
    assert_eq!(pipeline.pending_sessions(), 0);
}

#[test]
fn test_default_dialect_when_auto_detect_off() {
    let config = RestoreConfig {
        auto_detect_database: false,
        default_database: "Oracle".to_string(),
        ..RestoreConfig::default()
    };
    let pipeline = LogPipeline::new(config);

    let lines = [
        "2025-01-15T10:30:45.100+08:00 [1] [main] DEBUG com.example.M.a - ==> Preparing: UPDATE t SET active = ? WHERE id = ?",
        "2025-01-15T10:30:45.101+08:00 [1] [main] DEBUG com.example.M.a - ==> Parameters: true(Boolean), 5(Integer)",
        "2025-01-15T10:30:45.102+08:00 [1] [main] DEBUG com.example.M.a - <== Updates: 1",
    ];

    let mut records = Vec::new();
    for line in lines {
        if let Some(record) = pipeline.feed_line(line) {
            records.push(record);
        }
    }

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].database, DatabaseType::Oracle);
    // Oracle 布尔量用 1/0
    assert_eq!(
        records[0].converted_sql,
        "UPDATE t SET active = 1 WHERE id = 5"
    );
}

#[test]
fn test_unknown_keyword_lines_are_ignored() {
    let pipeline = LogPipeline::new(RestoreConfig::default());

    let line = "2025-01-15T10:30:45.100+08:00 [1] [main] DEBUG com.example.M.a - <== Columns: id, name";
    assert!(pipeline.feed_line(line).is_none());
    // 未知关键字不创建会话
    assert_eq!(pipeline.pending_sessions(), 0);
}

#[test]
fn test_process_reader_streams_records() {
    let pipeline = LogPipeline::new(RestoreConfig::default());

    let log = "\
2025-01-15 09:00:00.000 INFO Starting application
2025-01-15T10:30:45.100+08:00 [11] [exec-1] DEBUG com.example.UserMapper.list - ==> Preparing: SELECT * FROM `user` LIMIT ?
2025-01-15T10:30:45.101+08:00 [11] [exec-1] DEBUG com.example.UserMapper.list - ==> Parameters: 10(Integer)
garbage line in the middle
2025-01-15T10:30:45.102+08:00 [11] [exec-1] DEBUG com.example.UserMapper.list - <== Total: 10
";

    let mut restored = Vec::new();
    let count = pipeline
        .process_reader(Cursor::new(log), |record| {
            restored.push((record.database, record.converted_sql.clone()));
        })
        .unwrap();

    assert_eq!(count, 1);
    assert_eq!(
        restored,
        vec![(
            DatabaseType::MySql,
            "SELECT * FROM `user` LIMIT 10".to_string()
        )]
    );
}

#[test]
fn test_background_sweep_evicts_incomplete_session() {
    let config = RestoreConfig {
        session_timeout_ms: 30,
        ..RestoreConfig::default()
    };
    let pipeline = LogPipeline::new(config);

    let line = "2025-01-15T10:30:45.100+08:00 [77] [main] DEBUG com.example.M.a - ==> Preparing: SELECT 1";
    assert!(pipeline.feed_line(line).is_none());
    assert_eq!(pipeline.pending_sessions(), 1);

    // 等待后台清扫命中超时会话
    thread::sleep(Duration::from_millis(400));
    assert_eq!(pipeline.pending_sessions(), 0);
}

#[test]
fn test_dispose_drops_pending_sessions() {
    let mut pipeline = LogPipeline::new(RestoreConfig::default());

    let line = "2025-01-15T10:30:45.100+08:00 [88] [main] DEBUG com.example.M.a - ==> Preparing: SELECT 1";
    pipeline.feed_line(line);
    assert_eq!(pipeline.pending_sessions(), 1);

    pipeline.dispose();
    assert_eq!(pipeline.pending_sessions(), 0);
}
