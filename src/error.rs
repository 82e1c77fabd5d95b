//! 错误类型定义
//!
//! 这个模块定义了库中使用的所有错误类型，使用 thiserror 提供丰富的错误信息。
//!
//! 错误按影响范围分为两类：
//! - 解析失败（文件不可读或不是合法 XML）：只影响当前文件，由工作线程记录后跳过
//! - 写入失败（输出文件无法打开或追加）：对整个运行是致命的，向上传播
//!
//! 缺少字段的 `<Item>` 不是错误，见 [`crate::xml::MalformedItem`]。

use std::path::{Path, PathBuf};

/// 转换器的结果类型
pub type Result<T> = std::result::Result<T, ConvertError>;

/// 错误分类，用于决定错误是局部恢复还是终止运行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 单个文件解析失败，可隔离
    ParseFailure,
    /// 输出目标写入失败，致命
    WriteFailure,
    /// 配置错误
    Config,
    /// 其他错误
    Other,
}

/// XML 转 CSV 错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8编码错误
    #[error("UTF-8编码错误: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// XML 语法错误
    #[error("XML解析错误: {0}")]
    Xml(#[from] quick_xml::Error),

    /// 文档结构错误（无根元素、元素未闭合等）
    #[error("文档结构错误: {message}")]
    Document { message: String },

    /// 输出写入错误
    #[error("写入错误 ({}): {}", .path.display(), .message)]
    Write { path: PathBuf, message: String },

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 配置文件反序列化错误
    #[error("配置解析错误: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// 配置文件序列化错误
    #[error("配置序列化错误: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// JSON 序列化错误
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 其他错误
    #[error("未知错误: {0}")]
    Other(String),
}

impl ConvertError {
    /// 创建一个文档结构错误
    pub fn document_error<S: Into<String>>(message: S) -> Self {
        Self::Document { message: message.into() }
    }

    /// 创建一个写入错误
    pub fn write_error<P: AsRef<Path>, E: std::fmt::Display>(
        path: P,
        cause: E,
    ) -> Self {
        let path = path.as_ref().to_path_buf();
        let message = cause.to_string();
        #[cfg(feature = "logging")]
        tracing::error!("写入 {} 失败: {}", path.display(), message);
        Self::Write { path, message }
    }

    /// 创建一个配置错误
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        let message = message.into();
        #[cfg(feature = "logging")]
        tracing::error!("配置错误: {}", message);
        Self::Config(message)
    }

    /// 创建一个其他类型错误
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other(message.into())
    }

    /// 错误分类
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) | Self::Utf8(_) | Self::Xml(_) | Self::Document { .. } => {
                ErrorKind::ParseFailure
            }
            Self::Write { .. } => ErrorKind::WriteFailure,
            Self::Config(_) | Self::TomlDe(_) | Self::TomlSer(_) => {
                ErrorKind::Config
            }
            Self::Json(_) | Self::Other(_) => ErrorKind::Other,
        }
    }

    /// 检查是否为解析失败
    pub fn is_parse_failure(&self) -> bool {
        self.kind() == ErrorKind::ParseFailure
    }

    /// 检查是否为写入失败
    pub fn is_write_error(&self) -> bool {
        matches!(self, Self::Write { .. })
    }

    /// 检查是否为配置错误
    pub fn is_config_error(&self) -> bool {
        self.kind() == ErrorKind::Config
    }

    /// 检查是否为 IO 错误
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_creation() {
        let doc_err = ConvertError::document_error("no root");
        assert!(doc_err.is_parse_failure());

        let write_err = ConvertError::write_error("out.csv", "disk full");
        assert!(write_err.is_write_error());
        assert_eq!(write_err.kind(), ErrorKind::WriteFailure);

        let config_err = ConvertError::config_error("batch_size 为 0");
        assert!(config_err.is_config_error());
        assert!(!config_err.is_io_error());
    }

    #[test]
    fn test_error_from() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: ConvertError = io_err.into();
        assert!(err.is_io_error());
        // 读取输入文件的 IO 错误属于单文件解析失败
        assert_eq!(err.kind(), ErrorKind::ParseFailure);
    }

    #[test]
    fn test_error_display() {
        let err = ConvertError::Write {
            path: PathBuf::from("csv_files/out.csv"),
            message: "permission denied".to_string(),
        };

        let display = format!("{}", err);
        assert!(display.contains("out.csv"));
        assert!(display.contains("permission denied"));
    }
}
