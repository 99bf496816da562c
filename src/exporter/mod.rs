//! 还原记录导出模块
//!
//! 持久化由外部负责，这里只提供最常用的文件导出器

use crate::error::Result;
use crate::restore::types::ConvertedSql;

pub mod stats;
pub use stats::ExportStats;

#[cfg(feature = "exporter-csv")]
pub mod csv;
#[cfg(feature = "exporter-json")]
pub mod json;

#[cfg(feature = "exporter-csv")]
pub use csv::CsvExporter;
#[cfg(feature = "exporter-json")]
pub use json::JsonExporter;

/// 还原记录导出器的统一接口
pub trait SyncExporter: Send {
    /// 导出器名称
    fn name(&self) -> &str;

    /// 导出单条还原记录
    fn export_record(&mut self, record: &ConvertedSql) -> Result<()>;

    /// 批量导出记录
    fn export_batch(&mut self, records: &[ConvertedSql]) -> Result<()> {
        for record in records {
            self.export_record(record)?;
        }
        Ok(())
    }

    /// 完成导出，清理资源
    fn finalize(&mut self) -> Result<()> {
        Ok(())
    }

    /// 获取导出统计信息
    fn get_stats(&self) -> ExportStats {
        ExportStats::default()
    }
}
