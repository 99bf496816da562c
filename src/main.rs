use anyhow::{Context, Result, bail};
use mybatis_log_restore::config::Config;
use mybatis_log_restore::pipeline::LogPipeline;
use mybatis_log_restore::restore::types::ConvertedSql;
use std::env;
use std::io::BufReader;

#[cfg(any(feature = "exporter-csv", feature = "exporter-json"))]
use mybatis_log_restore::exporter::SyncExporter;

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let Some(input) = args.next() else {
        eprintln!("用法: mybatis-log-cli <日志文件|-> [配置文件.toml]");
        bail!("缺少日志文件参数");
    };

    let config = match args.next() {
        Some(path) => Config::from_file(&path)
            .with_context(|| format!("读取配置文件失败: {path}"))?,
        None => Config::default(),
    };

    #[cfg(feature = "logging")]
    init_logging(&config)?;

    let mut exporters = build_exporters(&config)?;
    let pipeline = LogPipeline::new(config.restore.clone());

    let mut restored = 0usize;
    let mut handle = |record: &ConvertedSql| {
        restored += 1;
        println!("-- {} [{}]", record.mapper, record.database);
        println!("{};", record.converted_sql);
        for exporter in exporters.iter_mut() {
            if let Err(err) = exporter.export_record(record) {
                eprintln!("{} 导出失败: {err}", exporter.name());
            }
        }
    };

    if input == "-" {
        let stdin = std::io::stdin();
        pipeline.process_reader(stdin.lock(), &mut handle)?;
    } else {
        pipeline
            .process_file(&input, &mut handle)
            .with_context(|| format!("解析日志文件失败: {input}"))?;
    }

    for exporter in exporters.iter_mut() {
        exporter.finalize()?;
    }

    println!(
        "\n还原完成，共 {restored} 条 SQL，未完成会话 {} 个。",
        pipeline.pending_sessions()
    );
    Ok(())
}

#[cfg(feature = "logging")]
fn init_logging(config: &Config) -> Result<()> {
    use mybatis_log_restore::logging::{self, LogConfig};
    use tracing::Level;

    let level =
        logging::parse_level(&config.log.level).unwrap_or(Level::INFO);
    let log_config = LogConfig::new()
        .level(level)
        .enable_stdout(config.log.enable_stdout)
        .log_dir(config.log.log_dir.clone());
    logging::init_logging(log_config)?;
    Ok(())
}

#[cfg(any(feature = "exporter-csv", feature = "exporter-json"))]
fn build_exporters(config: &Config) -> Result<Vec<Box<dyn SyncExporter>>> {
    let mut exporters: Vec<Box<dyn SyncExporter>> = Vec::new();

    #[cfg(feature = "exporter-csv")]
    for csv in &config.export.csv {
        let exporter =
            mybatis_log_restore::exporter::CsvExporter::new(&csv.out_path)
                .with_context(|| {
                    format!("创建 CSV 导出器失败: {}", csv.out_path)
                })?;
        exporters.push(Box::new(exporter));
    }

    #[cfg(feature = "exporter-json")]
    for json in &config.export.json {
        let exporter =
            mybatis_log_restore::exporter::JsonExporter::new(&json.out_path)
                .with_context(|| {
                    format!("创建 JSON 导出器失败: {}", json.out_path)
                })?;
        exporters.push(Box::new(exporter));
    }

    Ok(exporters)
}

#[cfg(not(any(feature = "exporter-csv", feature = "exporter-json")))]
fn build_exporters(config: &Config) -> Result<Vec<NoopExporter>> {
    if !config.export.csv.is_empty() || !config.export.json.is_empty() {
        eprintln!("配置了导出项，但未启用任何 exporter-* feature");
    }
    Ok(Vec::new())
}

/// 未启用导出功能时的占位类型，保持主流程一致
#[cfg(not(any(feature = "exporter-csv", feature = "exporter-json")))]
struct NoopExporter;

#[cfg(not(any(feature = "exporter-csv", feature = "exporter-json")))]
impl NoopExporter {
    fn name(&self) -> &str {
        "noop"
    }

    fn export_record(
        &mut self,
        _record: &ConvertedSql,
    ) -> mybatis_log_restore::Result<()> {
        Ok(())
    }

    fn finalize(&mut self) -> mybatis_log_restore::Result<()> {
        Ok(())
    }
}
