//! 文件工作者
//!
//! 依次解析分块中的文件，把提取出的记录累积到本地批次，
//! 批次满时整体交给共享写入器。单个文件解析失败只记录、不中断；
//! 写入失败直接向上返回。

use super::types::{Batch, Chunk, FileFailure, WorkerReport};
use crate::error::Result;
use crate::writer::RowSink;
use crate::xml::{RecordExtractor, parse_document};
use std::path::Path;
use std::sync::Arc;

pub struct FileWorker<W: RowSink + ?Sized> {
    writer: Arc<W>,
    batch: Batch,
    report: WorkerReport,
}

impl<W: RowSink + ?Sized> FileWorker<W> {
    pub fn new(id: usize, writer: Arc<W>, batch_size: usize) -> Self {
        Self {
            writer,
            batch: Batch::with_capacity(batch_size),
            report: WorkerReport::new(id),
        }
    }

    /// 处理一个分块，结束时刷新剩余的部分批次
    pub fn process_chunk(&mut self, chunk: &Chunk) -> Result<()> {
        #[cfg(feature = "logging")]
        tracing::debug!(
            "工作线程 {} 开始处理分块 {}: {:?}",
            self.report.worker_id,
            chunk.id,
            chunk.files
        );

        for path in &chunk.files {
            self.process_file(path)?;
        }
        self.flush()?;
        self.report.chunks_processed += 1;

        Ok(())
    }

    /// 解析单个文件；返回的错误只可能来自写入器
    pub fn process_file(&mut self, path: &Path) -> Result<()> {
        let doc = match parse_document(path) {
            Ok(doc) => doc,
            Err(e) => {
                #[cfg(feature = "logging")]
                tracing::error!("处理文件 {} 失败: {}", path.display(), e);
                self.report.failures.push(FileFailure::new(path, &e));
                return Ok(());
            }
        };

        #[cfg(feature = "logging")]
        let rows_before = self.pending_rows();

        for record in RecordExtractor::records(&doc) {
            if self.batch.push(record) {
                self.flush()?;
            }
        }
        self.report.files_ok += 1;

        #[cfg(feature = "logging")]
        tracing::trace!(
            "工作线程 {} 完成文件 {}: {} 条记录",
            self.report.worker_id,
            path.display(),
            self.pending_rows() - rows_before
        );

        Ok(())
    }

    /// 把当前批次交给写入器，空批次不调用写入器
    pub fn flush(&mut self) -> Result<()> {
        if self.batch.is_empty() {
            return Ok(());
        }

        let rows = self.batch.take();
        self.writer.append(&rows)?;
        self.report.rows_flushed += rows.len();
        self.report.flushes += 1;

        #[cfg(feature = "logging")]
        tracing::debug!(
            "工作线程 {} 写入批次: {} 行，累计 {} 行",
            self.report.worker_id,
            rows.len(),
            self.report.rows_flushed
        );

        Ok(())
    }

    /// 已写出和仍在批次中的行数
    #[cfg(feature = "logging")]
    fn pending_rows(&self) -> usize {
        self.report.rows_flushed + self.batch.len()
    }

    pub fn report(&self) -> &WorkerReport {
        &self.report
    }

    pub fn into_report(self) -> WorkerReport {
        self.report
    }
}
