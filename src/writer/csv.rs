//! CSV 输出写入器
//!
//! 输出文件只打开一次，默认以追加模式打开（不存在时创建）。
//! 表头标志与 csv 写入器放在同一把互斥锁后面，检查和写表头是原子的。

use super::{RowSink, WriteStats};
use crate::error::{ConvertError, Result};
use crate::xml::Record;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// 锁内的可变状态
struct OutputState {
    writer: ::csv::Writer<File>,
    /// 表头是否已写入
    header_written: bool,
    stats: WriteStats,
}

impl OutputState {
    fn ensure_header(&mut self) -> ::csv::Result<()> {
        if !self.header_written {
            self.writer.write_record(Record::HEADER)?;
            self.header_written = true;
        }
        Ok(())
    }
}

/// 线程安全的 CSV 输出写入器
pub struct CsvOutputWriter {
    path: PathBuf,
    state: Mutex<OutputState>,
}

impl CsvOutputWriter {
    /// 打开输出文件
    ///
    /// `overwrite` 为 false 时追加写入；追加到非空文件时认为表头已经存在。
    pub fn open<P: AsRef<Path>>(path: P, overwrite: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // 确保父目录存在
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConvertError::write_error(&path, e))?;
            }
        }

        let mut options = OpenOptions::new();
        if overwrite {
            options.write(true).create(true).truncate(true);
        } else {
            options.append(true).create(true);
        }
        let file = options
            .open(&path)
            .map_err(|e| ConvertError::write_error(&path, e))?;
        let existing_len = file
            .metadata()
            .map_err(|e| ConvertError::write_error(&path, e))?
            .len();

        #[cfg(feature = "logging")]
        tracing::debug!(
            "打开输出文件 {}，模式: {}，已有 {} 字节",
            path.display(),
            if overwrite { "覆盖" } else { "追加" },
            existing_len
        );

        let writer =
            ::csv::WriterBuilder::new().has_headers(false).from_writer(file);

        Ok(Self {
            path,
            state: Mutex::new(OutputState {
                writer,
                header_written: existing_len > 0,
                stats: WriteStats::new(),
            }),
        })
    }

    /// 表头是否已存在
    pub fn header_written(&self) -> bool {
        self.lock().map(|state| state.header_written).unwrap_or(false)
    }

    fn lock(&self) -> Result<MutexGuard<'_, OutputState>> {
        self.state
            .lock()
            .map_err(|_| ConvertError::write_error(&self.path, "输出锁已中毒"))
    }

    fn write_err(&self, e: impl std::fmt::Display) -> ConvertError {
        ConvertError::write_error(&self.path, e)
    }
}

impl RowSink for CsvOutputWriter {
    fn name(&self) -> &str {
        "CSV"
    }

    fn append(&self, rows: &[Record]) -> Result<()> {
        let mut state = self.lock()?;

        state.ensure_header().map_err(|e| self.write_err(e))?;
        for row in rows {
            state
                .writer
                .write_record(row.as_row())
                .map_err(|e| self.write_err(e))?;
        }
        state.writer.flush().map_err(|e| self.write_err(e))?;
        state.stats.record_append(rows.len());

        #[cfg(feature = "logging")]
        tracing::trace!("CSV 追加 {} 行", rows.len());

        Ok(())
    }

    fn finish(&self) -> Result<()> {
        let mut state = self.lock()?;

        // 没有任何数据时仍然需要表头
        state.ensure_header().map_err(|e| self.write_err(e))?;
        state.writer.flush().map_err(|e| self.write_err(e))?;
        state.stats.finish();

        #[cfg(feature = "logging")]
        tracing::info!(
            "CSV 写入完成: {} ({})",
            self.path.display(),
            state.stats
        );

        Ok(())
    }

    fn stats(&self) -> WriteStats {
        self.lock().map(|state| state.stats.clone()).unwrap_or_default()
    }
}
