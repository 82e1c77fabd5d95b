//! 配置管理模块
//!
//! 提供统一的配置文件读取和管理功能

use crate::error::{ConvertError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 主配置结构体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
    /// 转换配置
    #[serde(default)]
    pub convert: ConvertConfig,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// 是否启用控制台输出
    pub enable_stdout: bool,
    /// 日志输出目录，为空时不写日志文件
    pub log_dir: String,
    /// 日志级别 (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enable_stdout: true,
            log_dir: "logs".to_string(),
            level: "info".to_string(),
        }
    }
}

/// XML 转 CSV 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// XML 文件目录（不递归）
    pub input_dir: String,
    /// 输出 CSV 文件路径
    pub output_path: String,
    /// 输入文件扩展名
    pub extension: String,
    /// 每个分块包含的文件数
    pub chunk_size: usize,
    /// 每次写入的行数阈值
    pub batch_size: usize,
    /// 并发线程数，0 表示使用 CPU 核数
    pub thread_count: usize,
    /// 是否覆盖现有输出文件（默认追加）
    pub overwrite: bool,
    /// 是否写入解析失败报告
    pub write_errors: bool,
    /// 解析失败报告路径
    pub errors_out_path: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            input_dir: "./xml_files/".to_string(),
            output_path: "./csv_files/new_csv_file.csv".to_string(),
            extension: "xml".to_string(),
            chunk_size: 1,
            batch_size: 100,
            thread_count: 0,
            overwrite: false,
            write_errors: false,
            errors_out_path: "parse_errors.jsonl".to_string(),
        }
    }
}

impl ConvertConfig {
    /// 实际使用的线程数
    pub fn effective_thread_count(&self) -> usize {
        if self.thread_count > 0 {
            return self.thread_count;
        }
        std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4)
    }

    pub fn input_dir(&self) -> PathBuf {
        PathBuf::from(&self.input_dir)
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.output_path)
    }
}

impl Config {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConvertError::config_error(format!(
                "读取配置文件 {} 失败: {e}",
                path.display()
            ))
        })?;
        Self::from_str(&content)
    }

    /// 从字符串加载配置
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        let path = path.as_ref();
        std::fs::write(path, content).map_err(|e| {
            ConvertError::config_error(format!(
                "保存配置文件 {} 失败: {e}",
                path.display()
            ))
        })?;
        Ok(())
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        match self.log.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConvertError::config_error(format!(
                    "无效的日志级别: {}",
                    self.log.level
                )));
            }
        }

        let convert = &self.convert;
        if convert.chunk_size == 0 {
            return Err(ConvertError::config_error("chunk_size 不能为0"));
        }
        if convert.batch_size == 0 {
            return Err(ConvertError::config_error("batch_size 不能为0"));
        }
        if convert.input_dir.trim().is_empty() {
            return Err(ConvertError::config_error("input_dir 不能为空"));
        }
        if convert.output_path.trim().is_empty() {
            return Err(ConvertError::config_error("output_path 不能为空"));
        }
        if convert.write_errors && convert.errors_out_path.trim().is_empty() {
            #[cfg(feature = "logging")]
            tracing::warn!("启用了 write_errors 但 errors_out_path 为空");
        }

        Ok(())
    }
}
