//! 分块与线程池调度
//!
//! 输入文件按名称排序后切成连续的分块，放入共享队列；
//! 固定数量的工作线程从队列中取分块，直到队列为空。

use super::types::{Chunk, WorkerReport};
use super::worker::FileWorker;
use crate::config::ConvertConfig;
use crate::error::{ConvertError, Result};
use crate::writer::RowSink;
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

/// 调度器
#[derive(Debug, Clone)]
pub struct Dispatcher {
    input_dir: PathBuf,
    extension: String,
    chunk_size: usize,
    batch_size: usize,
    pool_size: usize,
}

impl Dispatcher {
    pub fn new(config: &ConvertConfig) -> Self {
        Self {
            input_dir: config.input_dir(),
            extension: config.extension.clone(),
            chunk_size: config.chunk_size.max(1),
            batch_size: config.batch_size.max(1),
            pool_size: config.effective_thread_count(),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// 列出输入目录中扩展名匹配的文件（不递归），按名称排序
    pub fn list_input_files(&self) -> Result<Vec<PathBuf>> {
        if !self.input_dir.is_dir() {
            return Err(ConvertError::config_error(format!(
                "输入目录不存在: {}",
                self.input_dir.display()
            )));
        }

        // 目录级别的 IO 错误不属于单个文件的解析失败
        let dir_err = |e: std::io::Error| {
            ConvertError::config_error(format!(
                "读取输入目录 {} 失败: {e}",
                self.input_dir.display()
            ))
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.input_dir).map_err(dir_err)? {
            let path = entry.map_err(dir_err)?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().is_some_and(|ext| ext == self.extension.as_str())
            {
                files.push(path);
            }
        }
        files.sort();

        #[cfg(feature = "logging")]
        tracing::info!(
            "在 {} 中找到 {} 个 .{} 文件",
            self.input_dir.display(),
            files.len(),
            self.extension
        );

        Ok(files)
    }

    /// 把文件列表切成连续的分块，最后一个分块可能不满
    pub fn partition(files: Vec<PathBuf>, chunk_size: usize) -> Vec<Chunk> {
        files
            .chunks(chunk_size.max(1))
            .enumerate()
            .map(|(id, files)| Chunk { id, files: files.to_vec() })
            .collect()
    }

    /// 把所有分块交给线程池处理，等待全部完成
    ///
    /// 解析失败记录在各自的 [`WorkerReport`] 中；写入失败或线程 panic 在
    /// 所有线程结束后作为错误返回。出现写入失败后，空闲线程不再领取新分块。
    pub fn dispatch<W>(
        &self,
        chunks: Vec<Chunk>,
        writer: Arc<W>,
    ) -> Result<Vec<WorkerReport>>
    where
        W: RowSink + ?Sized + 'static,
    {
        if chunks.is_empty() {
            #[cfg(feature = "logging")]
            tracing::warn!("没有需要处理的分块");
            return Ok(Vec::new());
        }

        let worker_count = self.pool_size.min(chunks.len()).max(1);

        #[cfg(feature = "logging")]
        tracing::info!(
            "启动 {} 个工作线程处理 {} 个分块",
            worker_count,
            chunks.len()
        );

        let queue = Arc::new(Mutex::new(VecDeque::from(chunks)));
        let aborted = Arc::new(AtomicBool::new(false));

        let mut handles = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let queue = Arc::clone(&queue);
            let aborted = Arc::clone(&aborted);
            let writer = Arc::clone(&writer);
            let batch_size = self.batch_size;

            let handle = thread::Builder::new()
                .name(format!("xml-worker-{worker_id}"))
                .spawn(move || -> Result<WorkerReport> {
                    #[cfg(feature = "logging")]
                    tracing::debug!("工作线程 {} 启动", worker_id);

                    let mut worker =
                        FileWorker::new(worker_id, writer, batch_size);
                    while !aborted.load(Ordering::SeqCst) {
                        let next = match queue.lock() {
                            Ok(mut queue) => queue.pop_front(),
                            Err(poisoned) => poisoned.into_inner().pop_front(),
                        };
                        let Some(chunk) = next else { break };

                        if let Err(e) = worker.process_chunk(&chunk) {
                            aborted.store(true, Ordering::SeqCst);
                            return Err(e);
                        }
                    }

                    #[cfg(feature = "logging")]
                    tracing::debug!(
                        "工作线程 {} 完成，处理了 {} 个分块",
                        worker_id,
                        worker.report().chunks_processed
                    );

                    Ok(worker.into_report())
                })
                .map_err(|e| {
                    ConvertError::other(format!("创建工作线程失败: {e}"))
                })?;
            handles.push(handle);
        }

        let mut reports = Vec::with_capacity(handles.len());
        let mut first_error = None;
        for (i, handle) in handles.into_iter().enumerate() {
            match handle.join() {
                Ok(Ok(report)) => reports.push(report),
                Ok(Err(e)) => {
                    #[cfg(feature = "logging")]
                    tracing::error!("工作线程 {} 返回错误: {}", i, e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
                Err(_) => {
                    #[cfg(feature = "logging")]
                    tracing::error!("工作线程 {} 异常退出", i);
                    if first_error.is_none() {
                        first_error = Some(ConvertError::other(format!(
                            "工作线程 {i} 异常退出"
                        )));
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(reports),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_partition_contiguous_chunks() {
        let chunks =
            Dispatcher::partition(paths(&["a", "b", "c", "d", "e"]), 2);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].files, paths(&["a", "b"]));
        assert_eq!(chunks[1].files, paths(&["c", "d"]));
        assert_eq!(chunks[2].files, paths(&["e"]));
        assert_eq!(chunks[2].id, 2);
    }

    #[test]
    fn test_partition_empty_and_zero_size() {
        assert!(Dispatcher::partition(Vec::new(), 1).is_empty());
        assert_eq!(Dispatcher::partition(paths(&["a", "b"]), 0).len(), 2);
    }

    #[test]
    fn test_list_input_files_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        for name in ["b.xml", "a.xml", "notes.txt", "c.XML"] {
            fs::write(dir.path().join(name), "<x/>").unwrap();
        }
        fs::create_dir(dir.path().join("nested.xml")).unwrap();

        let config = ConvertConfig {
            input_dir: dir.path().to_string_lossy().into_owned(),
            ..Default::default()
        };
        let files = Dispatcher::new(&config).list_input_files().unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.xml", "b.xml"]);
    }

    #[test]
    fn test_input_dir_that_is_a_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.xml");
        fs::write(&file, "<x/>").unwrap();

        let config = ConvertConfig {
            input_dir: file.to_string_lossy().into_owned(),
            ..Default::default()
        };
        let err = Dispatcher::new(&config).list_input_files().unwrap_err();
        assert!(err.is_config_error());
        assert!(!err.is_parse_failure());
    }

    #[test]
    fn test_missing_input_dir_is_config_error() {
        let config = ConvertConfig {
            input_dir: "/definitely/not/here".to_string(),
            ..Default::default()
        };
        let err = Dispatcher::new(&config).list_input_files().unwrap_err();
        assert!(err.is_config_error());
    }
}
