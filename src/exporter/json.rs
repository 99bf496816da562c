//! JSON 导出器实现

use super::{ExportStats, SyncExporter};
use crate::error::Result;
use crate::restore::types::ConvertedSql;
use std::io::{BufWriter, Write};
use std::path::Path;

/// JSON 导出器，输出一个记录数组
pub struct JsonExporter {
    writer: BufWriter<std::fs::File>,
    stats: ExportStats,
    first_record: bool,
}

impl JsonExporter {
    /// 创建新的 JSON 导出器（覆盖已有文件）
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::create(path)?;
        let mut writer = BufWriter::new(file);

        // 写入 JSON 数组开始符
        writer.write_all(b"[\n")?;

        Ok(Self { writer, stats: ExportStats::new(), first_record: true })
    }
}

impl SyncExporter for JsonExporter {
    fn name(&self) -> &str {
        "JSON"
    }

    fn export_record(&mut self, record: &ConvertedSql) -> Result<()> {
        if !self.first_record {
            self.writer.write_all(b",\n")?;
        } else {
            self.first_record = false;
        }

        let json_str = serde_json::to_string_pretty(record)?;

        // 数组元素统一缩进
        let indented = json_str
            .lines()
            .map(|line| format!("  {line}"))
            .collect::<Vec<_>>()
            .join("\n");

        self.writer.write_all(indented.as_bytes())?;
        self.stats.exported_records += 1;

        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        // 写入 JSON 数组结束符
        self.writer.write_all(b"\n]\n")?;
        self.writer.flush()?;
        self.stats.finish();

        #[cfg(feature = "logging")]
        tracing::info!("JSON导出完成: {} 条记录", self.stats.exported_records);

        Ok(())
    }

    fn get_stats(&self) -> ExportStats {
        self.stats.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::restore::types::{DatabaseType, Parameter};
    use std::io::Read;
    use tempfile::NamedTempFile;

    fn sample_record(mapper: &str) -> ConvertedSql {
        ConvertedSql {
            original_sql: "SELECT 1 WHERE a = ?".to_string(),
            converted_sql: "SELECT 1 WHERE a = 'x'".to_string(),
            database: DatabaseType::MySql,
            parameters: vec![Parameter::new("x", "String")],
            execution_time: None,
            mapper: mapper.to_string(),
            timestamp: "2025-01-15 10:30:45.123".to_string(),
            thread_info: None,
            preparing_line: "p".to_string(),
            parameters_line: "a".to_string(),
            completion_line: "t".to_string(),
        }
    }

    #[test]
    fn test_json_array_delimiters() {
        let tmp = NamedTempFile::new().unwrap();
        let mut exporter = JsonExporter::new(tmp.path()).unwrap();

        exporter.export_record(&sample_record("m1")).unwrap();
        exporter.export_record(&sample_record("m2")).unwrap();
        exporter.finalize().unwrap();

        let mut content = String::new();
        tmp.reopen().unwrap().read_to_string(&mut content).unwrap();
        assert!(content.starts_with("[\n"));
        assert!(content.contains(",\n  {"));
        assert!(content.ends_with("\n]\n"));
        assert!(content.contains("m1"));
        assert!(content.contains("m2"));
    }

    #[test]
    fn test_json_empty_export_still_valid_array() {
        let tmp = NamedTempFile::new().unwrap();
        let mut exporter = JsonExporter::new(tmp.path()).unwrap();
        exporter.finalize().unwrap();

        let mut content = String::new();
        tmp.reopen().unwrap().read_to_string(&mut content).unwrap();
        assert!(content.starts_with("[\n"));
        assert!(content.ends_with("\n]\n"));
    }

    #[test]
    fn test_json_stats_counts_records() {
        let tmp = NamedTempFile::new().unwrap();
        let mut exporter = JsonExporter::new(tmp.path()).unwrap();
        exporter
            .export_batch(&[sample_record("a"), sample_record("b")])
            .unwrap();
        exporter.finalize().unwrap();
        assert_eq!(exporter.get_stats().exported_records, 2);
    }
}
