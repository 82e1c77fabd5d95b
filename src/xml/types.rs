//! 记录类型定义

use serde::Serialize;

/// 从一个 `<Item>` 元素提取出的记录
///
/// 字段保留原始文本，不做数值解析。
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Record {
    pub product_name: String,
    pub quantity: String,
    pub price: String,
    pub comment: String,
}

impl Record {
    /// 输出表头，同时也是 `<Item>` 必需的子元素名
    pub const HEADER: [&'static str; 4] =
        ["ProductName", "Quantity", "Price", "Comment"];

    pub fn new(
        product_name: impl Into<String>,
        quantity: impl Into<String>,
        price: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            product_name: product_name.into(),
            quantity: quantity.into(),
            price: price.into(),
            comment: comment.into(),
        }
    }

    /// 按表头顺序返回字段
    pub fn as_row(&self) -> [&str; 4] {
        [&self.product_name, &self.quantity, &self.price, &self.comment]
    }
}

/// 缺少必需子元素的 `<Item>`
///
/// 这不是错误：提取器会静默跳过这类元素，既不计数也不记录日志。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MalformedItem {
    /// 第一个缺失的子元素名
    pub missing: &'static str,
}
