//! XML 解析与记录提取模块
//!
//! 提供文档树构建、`<Item>` 记录提取和记录类型定义

pub mod document;
pub mod extractor;
pub mod types;

// 重新导出核心类型和函数
pub use document::{Document, Element, parse_document, parse_str};
pub use extractor::{ITEM_ELEMENT, RecordExtractor};
pub use types::{MalformedItem, Record};
