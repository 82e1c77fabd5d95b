//! 输出写入模块
//!
//! 所有工作线程共享同一个输出目标。写入器内部持有互斥锁，
//! 表头检查与行写入在同一个临界区内完成。

pub mod csv;
pub mod stats;

pub use self::csv::CsvOutputWriter;
pub use stats::WriteStats;

use crate::error::Result;
use crate::xml::Record;

/// 共享输出目标的统一接口
pub trait RowSink: Send + Sync {
    /// 写入器名称
    fn name(&self) -> &str;

    /// 追加一批记录
    ///
    /// 首次调用时先写表头。一次调用内的行不会与其他调用交错。
    fn append(&self, rows: &[Record]) -> Result<()>;

    /// 完成写入，保证表头存在并刷新缓冲区
    fn finish(&self) -> Result<()> {
        Ok(())
    }

    /// 获取写入统计信息
    fn stats(&self) -> WriteStats {
        WriteStats::default()
    }
}
