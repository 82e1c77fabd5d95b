//! 多线程 XML 转 CSV 批量转换库
//!
//! 目录中的每个 XML 文件包含若干 `<Item>` 记录，多个工作线程并发解析，
//! 所有记录合并写入同一个 CSV 文件，表头只写一次。

pub mod config;
pub mod convert;
pub mod error;
pub mod error_writer;
pub mod input_path;
pub mod writer;
pub mod xml;

// 日志模块（仅在启用 logging feature 时可用）
#[cfg(feature = "logging")]
pub mod logging;

pub use config::{Config, ConvertConfig};
pub use convert::{ConversionSummary, Pipeline};
pub use error::{ConvertError, ErrorKind, Result};
pub use writer::{CsvOutputWriter, RowSink};
pub use xml::Record;
