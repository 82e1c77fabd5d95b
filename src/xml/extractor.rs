//! 记录提取
//!
//! 在文档中任意深度查找 `<Item>` 元素，读取四个必需子元素的原始文本。
//! 任何一个子元素缺失时整条 `<Item>` 被静默跳过；子元素存在但文本为空时
//! 对应字段为空字符串，不会跳过。

use super::document::{Descendants, Document, Element};
use super::types::{MalformedItem, Record};

/// 记录元素名
pub const ITEM_ELEMENT: &str = "Item";

/// 记录提取器，无状态
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordExtractor;

impl RecordExtractor {
    /// 按文档顺序惰性产出所有合法 `<Item>` 对应的记录
    pub fn records(doc: &Document) -> Records<'_> {
        Records { items: doc.root().descendants() }
    }

    /// 判断单个 `<Item>` 是否完整
    pub fn classify(item: &Element) -> Result<Record, MalformedItem> {
        let [name, quantity, price, comment] = Record::HEADER;
        Ok(Record {
            product_name: field(item, name)?,
            quantity: field(item, quantity)?,
            price: field(item, price)?,
            comment: field(item, comment)?,
        })
    }
}

fn field(item: &Element, name: &'static str) -> Result<String, MalformedItem> {
    item.child(name)
        .map(|child| child.text().unwrap_or_default().to_string())
        .ok_or(MalformedItem { missing: name })
}

/// [`RecordExtractor::records`] 返回的迭代器
pub struct Records<'a> {
    items: Descendants<'a>,
}

impl Iterator for Records<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        self.items
            .by_ref()
            .filter(|element| element.name == ITEM_ELEMENT)
            .find_map(|item| RecordExtractor::classify(item).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::document::parse_str;

    #[test]
    fn test_classify_reports_missing_child() {
        let doc = parse_str(
            "<Item><ProductName>A</ProductName><Quantity>1</Quantity>\
             <Price>2</Price></Item>",
        )
        .unwrap();

        let err = RecordExtractor::classify(doc.root()).unwrap_err();
        assert_eq!(err, MalformedItem { missing: "Comment" });
    }

    #[test]
    fn test_empty_child_is_not_absent() {
        let doc = parse_str(
            "<Item><ProductName>A</ProductName><Quantity>1</Quantity>\
             <Price>2</Price><Comment/></Item>",
        )
        .unwrap();

        let record = RecordExtractor::classify(doc.root()).unwrap();
        assert_eq!(record, Record::new("A", "1", "2", ""));
    }

    #[test]
    fn test_records_skip_malformed_and_keep_order() {
        let doc = parse_str(
            r#"<Orders>
  <Item><ProductName>first</ProductName><Quantity>1</Quantity><Price>1.0</Price><Comment>c1</Comment></Item>
  <Item><ProductName>broken</ProductName><Quantity>2</Quantity></Item>
  <Group>
    <Item><ProductName>deep</ProductName><Quantity>3</Quantity><Price>3.5</Price><Comment>c3</Comment></Item>
  </Group>
</Orders>"#,
        )
        .unwrap();

        let records: Vec<Record> = RecordExtractor::records(&doc).collect();
        assert_eq!(
            records,
            vec![
                Record::new("first", "1", "1.0", "c1"),
                Record::new("deep", "3", "3.5", "c3"),
            ]
        );
    }

    #[test]
    fn test_root_item_is_not_searched() {
        let doc = parse_str(
            "<Item><ProductName>A</ProductName><Quantity>1</Quantity>\
             <Price>2</Price><Comment>x</Comment></Item>",
        )
        .unwrap();
        assert_eq!(RecordExtractor::records(&doc).count(), 0);
    }
}
