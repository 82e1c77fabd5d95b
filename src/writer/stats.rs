//! 写入统计信息模块

use std::time::{Duration, Instant};

/// 写入统计信息
#[derive(Debug, Default, Clone)]
pub struct WriteStats {
    /// 已写入的数据行数（不含表头）
    pub rows_written: usize,
    /// append 调用次数
    pub append_calls: usize,
    /// 写入开始时间
    pub start_time: Option<Instant>,
    /// 写入完成时间
    pub end_time: Option<Instant>,
}

impl WriteStats {
    /// 创建新的统计信息，记录开始时间
    pub fn new() -> Self {
        Self { start_time: Some(Instant::now()), ..Default::default() }
    }

    /// 记录一次 append
    pub fn record_append(&mut self, rows: usize) {
        self.rows_written += rows;
        self.append_calls += 1;
    }

    /// 标记写入完成，记录结束时间
    pub fn finish(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// 计算写入持续时间
    pub fn duration(&self) -> Option<Duration> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(end.duration_since(start)),
            _ => None,
        }
    }

    /// 计算每秒写入行数
    pub fn rows_per_second(&self) -> Option<f64> {
        self.duration().map(|d| {
            if d.as_secs_f64() > 0.0 {
                self.rows_written as f64 / d.as_secs_f64()
            } else {
                0.0
            }
        })
    }
}

impl std::fmt::Display for WriteStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "写入: {} 行, 批次: {}",
            self.rows_written, self.append_calls
        )?;

        if let Some(duration) = self.duration() {
            write!(f, ", 耗时: {:.2}s", duration.as_secs_f64())?;

            if let Some(rps) = self.rows_per_second() {
                write!(f, ", 速度: {:.2} 行/秒", rps)?;
            }
        }

        Ok(())
    }
}
