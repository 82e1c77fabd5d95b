//! 并发转换相关的数据类型定义

use crate::error::ConvertError;
use crate::writer::WriteStats;
use crate::xml::Record;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 分块：作为一个工作单元分配给线程池的连续文件列表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 分块ID，按提交顺序递增
    pub id: usize,
    pub files: Vec<PathBuf>,
}

/// 工作线程本地的记录批次，达到容量后整体交给写入器
#[derive(Debug)]
pub struct Batch {
    records: Vec<Record>,
    capacity: usize,
}

impl Batch {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { records: Vec::with_capacity(capacity), capacity }
    }

    /// 追加一条记录，返回批次是否已满
    pub fn push(&mut self, record: Record) -> bool {
        self.records.push(record);
        self.is_full()
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 取出全部记录并清空批次
    pub fn take(&mut self) -> Vec<Record> {
        std::mem::replace(&mut self.records, Vec::with_capacity(self.capacity))
    }
}

/// 单个文件解析失败
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    /// 源文件路径
    pub path: PathBuf,
    /// 错误信息
    pub error: String,
}

impl FileFailure {
    pub fn new(path: &Path, error: &ConvertError) -> Self {
        Self { path: path.to_path_buf(), error: error.to_string() }
    }
}

/// 工作线程处理结果
#[derive(Debug, Default, Clone)]
pub struct WorkerReport {
    pub worker_id: usize,
    /// 处理的分块数
    pub chunks_processed: usize,
    /// 成功解析的文件数
    pub files_ok: usize,
    /// 交给写入器的行数
    pub rows_flushed: usize,
    /// append 调用次数
    pub flushes: usize,
    /// 解析失败的文件
    pub failures: Vec<FileFailure>,
}

impl WorkerReport {
    pub fn new(worker_id: usize) -> Self {
        Self { worker_id, ..Default::default() }
    }

    /// 合并其他工作线程的结果
    pub fn merge(&mut self, other: WorkerReport) {
        self.chunks_processed += other.chunks_processed;
        self.files_ok += other.files_ok;
        self.rows_flushed += other.rows_flushed;
        self.flushes += other.flushes;
        self.failures.extend(other.failures);
    }
}

/// 一次完整运行的总结
#[derive(Debug, Clone)]
pub struct ConversionSummary {
    /// 开始时间
    pub started_at: DateTime<Local>,
    /// 结束时间
    pub finished_at: DateTime<Local>,
    /// 总耗时
    pub total_duration: Duration,
    /// 输入文件总数
    pub files_total: usize,
    /// 分块总数
    pub chunks_total: usize,
    /// 实际使用的工作线程数
    pub workers: usize,
    /// 汇总的工作线程结果
    pub report: WorkerReport,
    /// 写入器统计
    pub write_stats: WriteStats,
}

impl ConversionSummary {
    pub fn rows_written(&self) -> usize {
        self.report.rows_flushed
    }

    pub fn failures(&self) -> &[FileFailure] {
        &self.report.failures
    }
}

impl std::fmt::Display for ConversionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "开始时间: {}", self.started_at.format("%Y-%m-%d %H:%M:%S%.3f"))?;
        writeln!(f, "结束时间: {}", self.finished_at.format("%Y-%m-%d %H:%M:%S%.3f"))?;
        writeln!(f, "总耗时: {:.2?}", self.total_duration)?;
        write!(
            f,
            "共处理 {} 个文件（{} 个分块，{} 个线程），成功 {} 个，失败 {} 个，写入 {} 行（{} 次写入）",
            self.files_total,
            self.chunks_total,
            self.workers,
            self.report.files_ok,
            self.report.failures.len(),
            self.report.rows_flushed,
            self.report.flushes
        )
    }
}
