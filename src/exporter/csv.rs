//! CSV 导出器实现

use super::{ExportStats, SyncExporter};
use crate::error::Result;
use crate::restore::types::ConvertedSql;
use std::io::{BufWriter, Write};
use std::path::Path;

/// CSV 导出器
pub struct CsvExporter {
    writer: BufWriter<std::fs::File>,
    stats: ExportStats,
    header_written: bool,
}

impl CsvExporter {
    /// 创建新的 CSV 导出器（覆盖已有文件）
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);

        Ok(Self { writer, stats: ExportStats::new(), header_written: false })
    }

    /// 写入 CSV 头部
    fn write_header(&mut self) -> Result<()> {
        let header = "timestamp,mapper,thread_info,database,original_sql,converted_sql,parameter_count,execution_time\n";
        self.writer.write_all(header.as_bytes())?;
        self.header_written = true;
        Ok(())
    }

    /// 转义 CSV 字段
    fn escape_csv_field(field: &str) -> String {
        if field.contains(',')
            || field.contains('"')
            || field.contains('\n')
            || field.contains('\r')
        {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    /// 格式化记录为 CSV 行
    fn format_record(record: &ConvertedSql) -> String {
        let fields = [
            Self::escape_csv_field(&record.timestamp),
            Self::escape_csv_field(&record.mapper),
            Self::escape_csv_field(
                record.thread_info.as_deref().unwrap_or_default(),
            ),
            Self::escape_csv_field(&record.database.to_string()),
            Self::escape_csv_field(&record.original_sql),
            Self::escape_csv_field(&record.converted_sql),
            record.parameters.len().to_string(),
            record.execution_time.map(|t| t.to_string()).unwrap_or_default(),
        ];

        format!("{}\n", fields.join(","))
    }
}

impl SyncExporter for CsvExporter {
    fn name(&self) -> &str {
        "CSV"
    }

    fn export_record(&mut self, record: &ConvertedSql) -> Result<()> {
        if !self.header_written {
            self.write_header()?;
        }

        let line = Self::format_record(record);
        self.writer.write_all(line.as_bytes())?;
        self.stats.exported_records += 1;

        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        if !self.header_written {
            self.write_header()?;
        }
        self.writer.flush()?;
        self.stats.finish();

        #[cfg(feature = "logging")]
        tracing::info!("CSV导出完成: {} 条记录", self.stats.exported_records);

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

    fn sample_record() -> ConvertedSql {
        ConvertedSql {
            original_sql: "SELECT * FROM user WHERE id = ?".to_string(),
            converted_sql: "SELECT * FROM user WHERE id = 1".to_string(),
            database: DatabaseType::MySql,
            parameters: vec![Parameter::new("1", "Integer")],
            execution_time: Some(2),
            mapper: "com.example.UserMapper.selectById".to_string(),
            timestamp: "2025-01-15 10:30:45.123".to_string(),
            thread_info: Some("main".to_string()),
            preparing_line: "p".to_string(),
            parameters_line: "a".to_string(),
            completion_line: "t".to_string(),
        }
    }

    #[test]
    fn test_csv_export_with_header() {
        let tmp = NamedTempFile::new().unwrap();
        let mut exporter = CsvExporter::new(tmp.path()).unwrap();

        exporter.export_record(&sample_record()).unwrap();
        exporter.finalize().unwrap();

        let mut content = String::new();
        tmp.reopen().unwrap().read_to_string(&mut content).unwrap();
        assert!(content.starts_with("timestamp,mapper"));
        assert!(content.contains("com.example.UserMapper.selectById"));
        assert!(content.contains("MySQL"));
    }

    #[test]
    fn test_csv_escaping() {
        // 含逗号的字段必须加引号
        let escaped = CsvExporter::escape_csv_field("SELECT a, b");
        assert_eq!(escaped, "\"SELECT a, b\"");

        // 内部引号翻倍
        let escaped = CsvExporter::escape_csv_field("say \"hi\"");
        assert_eq!(escaped, "\"say \"\"hi\"\"\"");

        let plain = CsvExporter::escape_csv_field("plain");
        assert_eq!(plain, "plain");
    }

    #[test]
    fn test_csv_header_only_on_empty_export() {
        let tmp = NamedTempFile::new().unwrap();
        let mut exporter = CsvExporter::new(tmp.path()).unwrap();
        exporter.finalize().unwrap();

        let mut content = String::new();
        tmp.reopen().unwrap().read_to_string(&mut content).unwrap();
        assert!(content.starts_with("timestamp,"));
        assert_eq!(content.lines().count(), 1);
    }
}
