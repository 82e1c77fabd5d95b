//! 并发转换模块
//!
//! 提供分块调度、文件工作者和顶层流水线

pub mod dispatcher;
pub mod pipeline;
pub mod types;
pub mod worker;

// 重新导出主要类型和接口
pub use dispatcher::Dispatcher;
pub use pipeline::{Pipeline, PipelineState};
pub use types::{Batch, Chunk, ConversionSummary, FileFailure, WorkerReport};
pub use worker::FileWorker;
