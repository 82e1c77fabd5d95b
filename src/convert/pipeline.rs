//! 转换流水线
//!
//! 状态: `Idle → Listing → Dispatching → AllComplete → Reported`。
//! 单个文件解析失败不会阻止流水线到达终态；写入失败会中止运行。

use super::dispatcher::Dispatcher;
use super::types::{ConversionSummary, WorkerReport};
use crate::config::ConvertConfig;
use crate::error::Result;
use crate::error_writer::ErrorWriter;
use crate::writer::{CsvOutputWriter, RowSink};
use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// 流水线状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Listing,
    Dispatching,
    AllComplete,
    Reported,
}

/// 已完成列目录、尚未调度的一次运行
struct PendingRun {
    started_at: DateTime<Local>,
    start: Instant,
    files: Vec<PathBuf>,
}

/// XML 转 CSV 流水线
#[derive(Debug)]
pub struct Pipeline {
    config: ConvertConfig,
    state: PipelineState,
}

impl Pipeline {
    pub fn new(config: ConvertConfig) -> Self {
        #[cfg(feature = "logging")]
        tracing::debug!("创建转换流水线，配置: {:?}", config);

        Self { config, state: PipelineState::Idle }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// 打开配置的 CSV 输出文件并运行
    ///
    /// 先列出输入目录再创建输出文件：输入目录无效时不会留下空的输出文件，
    /// 输出不可写时仍在解析任何文件之前失败。
    pub fn run(&mut self) -> Result<ConversionSummary> {
        let pending = self.list_inputs()?;
        let writer = CsvOutputWriter::open(
            self.config.output_path(),
            self.config.overwrite,
        )?;
        self.execute(pending, Arc::new(writer))
    }

    /// 使用给定的写入器运行
    pub fn run_with_writer<W>(
        &mut self,
        writer: Arc<W>,
    ) -> Result<ConversionSummary>
    where
        W: RowSink + ?Sized + 'static,
    {
        let pending = self.list_inputs()?;
        self.execute(pending, writer)
    }

    fn list_inputs(&mut self) -> Result<PendingRun> {
        let started_at = Local::now();
        let start = Instant::now();

        #[cfg(feature = "logging")]
        tracing::info!(
            "开始转换 {} -> {}，开始时间: {}",
            self.config.input_dir,
            self.config.output_path,
            started_at
        );

        self.transition(PipelineState::Listing);
        let files = Dispatcher::new(&self.config).list_input_files()?;
        Ok(PendingRun { started_at, start, files })
    }

    fn execute<W>(
        &mut self,
        pending: PendingRun,
        writer: Arc<W>,
    ) -> Result<ConversionSummary>
    where
        W: RowSink + ?Sized + 'static,
    {
        let PendingRun { started_at, start, files } = pending;
        let dispatcher = Dispatcher::new(&self.config);
        let files_total = files.len();
        let chunks = Dispatcher::partition(files, dispatcher.chunk_size());
        let chunks_total = chunks.len();

        self.transition(PipelineState::Dispatching);
        #[cfg(feature = "logging")]
        tracing::debug!("写入器: {}", writer.name());
        let reports = dispatcher.dispatch(chunks, Arc::clone(&writer))?;
        let workers = reports.len();
        writer.finish()?;

        self.transition(PipelineState::AllComplete);
        let mut report = WorkerReport::default();
        for worker_report in reports {
            report.merge(worker_report);
        }

        if self.config.write_errors {
            self.write_failure_report(&report);
        }

        let summary = ConversionSummary {
            started_at,
            finished_at: Local::now(),
            total_duration: start.elapsed(),
            files_total,
            chunks_total,
            workers,
            report,
            write_stats: writer.stats(),
        };
        self.transition(PipelineState::Reported);

        #[cfg(feature = "logging")]
        tracing::info!(
            "转换完成，共处理 {} 个文件，成功 {} 个，失败 {} 个，写入 {} 行，总耗时: {:.2?}",
            summary.files_total,
            summary.report.files_ok,
            summary.report.failures.len(),
            summary.rows_written(),
            summary.total_duration
        );

        Ok(summary)
    }

    fn transition(&mut self, next: PipelineState) {
        #[cfg(feature = "logging")]
        tracing::debug!("流水线状态: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// 失败报告只是诊断信息，写入失败时记录日志后继续
    fn write_failure_report(&self, report: &WorkerReport) {
        let result = ErrorWriter::new(&self.config.errors_out_path)
            .and_then(|writer| writer.write_failures(&report.failures));

        if let Err(_e) = result {
            #[cfg(feature = "logging")]
            tracing::error!(
                "写入解析失败报告 {} 失败: {}",
                self.config.errors_out_path,
                _e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_pipeline_reaches_reported() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in");
        fs::create_dir(&input).unwrap();
        fs::write(input.join("a.xml"), "<Items/>").unwrap();

        let config = ConvertConfig {
            input_dir: input.to_string_lossy().into_owned(),
            output_path: dir
                .path()
                .join("out.csv")
                .to_string_lossy()
                .into_owned(),
            thread_count: 2,
            ..Default::default()
        };

        let mut pipeline = Pipeline::new(config);
        assert_eq!(pipeline.state(), PipelineState::Idle);

        let summary = pipeline.run().unwrap();
        assert_eq!(pipeline.state(), PipelineState::Reported);
        assert_eq!(summary.files_total, 1);
        assert_eq!(summary.workers, 1);
        assert!(summary.finished_at >= summary.started_at);
    }

    #[test]
    fn test_failed_listing_stops_in_listing() {
        let dir = TempDir::new().unwrap();
        let config = ConvertConfig {
            input_dir: dir.path().join("missing").to_string_lossy().into_owned(),
            output_path: dir
                .path()
                .join("out.csv")
                .to_string_lossy()
                .into_owned(),
            ..Default::default()
        };

        let mut pipeline = Pipeline::new(config);
        assert!(pipeline.run().is_err());
        assert_eq!(pipeline.state(), PipelineState::Listing);
    }

    #[test]
    fn test_missing_input_dir_creates_no_output() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("csv_files").join("out.csv");
        let config = ConvertConfig {
            input_dir: dir.path().join("missing").to_string_lossy().into_owned(),
            output_path: output.to_string_lossy().into_owned(),
            ..Default::default()
        };

        let err = Pipeline::new(config).run().unwrap_err();
        assert!(err.is_config_error());
        assert!(!output.exists());
        assert!(!dir.path().join("csv_files").exists());
    }
}
