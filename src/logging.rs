//! 日志初始化和配置模块
//!
//! 这个模块提供了统一的日志初始化功能，使用 tracing 库。
//! 控制台输出写入 stderr（诊断流），文件输出按天滚动写入 `log_dir`。

use crate::config::LogConfig;
use std::io;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, time::SystemTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("IO错误: {0}")]
    Io(#[from] io::Error),
    #[error("日志配置错误: {0}")]
    Config(String),
}

/// 日志初始化结果
pub type LogResult<T> = Result<T, LogError>;

/// 初始化日志系统
///
/// - `RUST_LOG` 环境变量优先，否则使用配置的级别
/// - `enable_stdout` 控制是否输出到控制台
/// - `log_dir` 非空时按天滚动写入日志文件
///
/// 返回文件写入器的 guard，调用方需要持有它直到程序结束，
/// 否则缓冲中的日志可能丢失。重复初始化不视为错误，返回 `None`。
///
/// # Examples
///
/// ```no_run
/// use xml_csv_merge::config::LogConfig;
/// use xml_csv_merge::logging::init_logging;
///
/// let _guard = init_logging(&LogConfig::default()).unwrap();
/// ```
pub fn init_logging(config: &LogConfig) -> LogResult<Option<WorkerGuard>> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| LogError::Config(e.to_string()))?,
    };

    let console_layer = config.enable_stdout.then(|| {
        fmt::layer()
            .with_writer(io::stderr)
            .with_timer(SystemTime)
            .with_target(true)
            .with_thread_names(true)
            .with_ansi(true)
    });

    let mut guard = None;
    let file_layer = if config.log_dir.trim().is_empty() {
        None
    } else {
        std::fs::create_dir_all(&config.log_dir)?;
        let file_appender =
            tracing_appender::rolling::daily(&config.log_dir, "xml2csv");
        let (non_blocking, file_guard) =
            tracing_appender::non_blocking(file_appender);
        guard = Some(file_guard);

        Some(
            fmt::layer()
                .with_writer(non_blocking)
                .with_timer(SystemTime)
                .with_target(true)
                .with_thread_names(true)
                .with_ansi(false), // 文件中不使用颜色
        )
    };

    let subscriber = Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer);

    // 已经初始化过了，这不是错误
    match subscriber.try_init() {
        Ok(()) => {
            tracing::info!("日志系统初始化完成，级别: {}", config.level);
            Ok(guard)
        }
        Err(_) => Ok(None),
    }
}
