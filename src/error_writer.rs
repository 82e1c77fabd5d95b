//! 解析失败报告写入模块
//!
//! 将解析失败的文件以 JSONL 格式（每行一个 JSON 对象）追加到报告文件：
//!
//! ```json
//! {"path":"xml_files/b.xml","error":"文档结构错误: 根元素之外存在文本内容"}
//! ```

use crate::convert::FileFailure;
use crate::error::{ConvertError, Result};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

/// 错误写入器，线程安全地将解析失败写入 JSONL 文件
pub struct ErrorWriter {
    writer: Mutex<BufWriter<std::fs::File>>,
}

impl ErrorWriter {
    /// 创建新的错误写入器，父目录不存在时自动创建
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let report_err = |e: std::io::Error| {
            ConvertError::other(format!(
                "打开失败报告 {} 失败: {e}",
                path.display()
            ))
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(report_err)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(report_err)?;

        Ok(Self { writer: Mutex::new(BufWriter::new(file)) })
    }

    /// 写入一组解析失败，写完立即刷新
    pub fn write_failures(&self, failures: &[FileFailure]) -> Result<()> {
        if failures.is_empty() {
            return Ok(());
        }

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| ConvertError::other("获取错误写入器锁失败"))?;

        let io_err = |e: std::io::Error| {
            ConvertError::other(format!("写入失败报告出错: {e}"))
        };
        for failure in failures {
            let line = serde_json::to_string(failure)?;
            writeln!(writer, "{line}").map_err(io_err)?;
        }
        writer.flush().map_err(io_err)?;

        #[cfg(feature = "logging")]
        tracing::debug!("写入 {} 条解析失败记录", failures.len());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_error_writer_basic() {
        let temp_dir = tempdir().unwrap();
        let error_file = temp_dir.path().join("reports").join("errors.jsonl");

        let writer = ErrorWriter::new(&error_file).unwrap();
        let failures = vec![
            FileFailure {
                path: PathBuf::from("/data/b.xml"),
                error: "XML解析错误".to_string(),
            },
            FileFailure {
                path: PathBuf::from("/data/c.xml"),
                error: "IO错误".to_string(),
            },
        ];

        writer.write_failures(&failures).unwrap();
        writer.write_failures(&[]).unwrap();

        let content = fs::read_to_string(&error_file).unwrap();
        let lines: Vec<&str> = content.trim().split('\n').collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["path"], "/data/b.xml");
        assert_eq!(first["error"], "XML解析错误");

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["path"], "/data/c.xml");
    }

    #[test]
    fn test_unopenable_report_is_not_a_parse_failure() {
        let temp_dir = tempdir().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "a regular file").unwrap();

        let err = ErrorWriter::new(blocker.join("errors.jsonl"))
            .err()
            .unwrap();
        assert!(!err.is_parse_failure());
        assert!(!err.is_io_error());
        assert!(err.to_string().contains("blocker"));
    }
}
