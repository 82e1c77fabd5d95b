//! XML 文档树
//!
//! 基于 quick-xml 的事件流构建一棵最小的元素树，只保留提取记录需要的信息：
//! 元素本地名（去掉命名空间前缀）、第一个子元素之前的文本、子元素列表。

use crate::error::{ConvertError, Result};
use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::borrow::Cow;
use std::fs;
use std::io::BufRead;
use std::path::Path;

/// 元素节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// 本地名
    pub name: String,
    /// 第一个子元素之前的字符数据，没有字符数据时为 `None`
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), text: None, children: Vec::new() }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// 第一个名为 `name` 的直接子元素
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// 按文档顺序（先序）遍历所有后代元素，不包含自身
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self.children.iter()] }
    }

    fn push_text(&mut self, text: &str) {
        // 子元素之后的尾随文本不属于本元素的 text
        if self.children.is_empty() {
            self.text.get_or_insert_with(String::new).push_str(text);
        }
    }
}

/// 后代元素迭代器
pub struct Descendants<'a> {
    stack: Vec<std::slice::Iter<'a, Element>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let iter = self.stack.last_mut()?;
            match iter.next() {
                Some(element) => {
                    self.stack.push(element.children.iter());
                    return Some(element);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// 解析后的文档
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Element,
}

impl Document {
    pub fn root(&self) -> &Element {
        &self.root
    }
}

/// 读取并解析一个 XML 文件
///
/// 编码按 BOM、UTF-16 特征字节、XML 声明的顺序确定，缺省为 UTF-8。
/// 内容先整体转成 UTF-8 再交给解析器。
pub fn parse_document<P: AsRef<Path>>(path: P) -> Result<Document> {
    let bytes = fs::read(path.as_ref())?;
    let text = decode_input(&bytes)?;
    parse_str(&text)
}

/// 从字符串解析 XML
pub fn parse_str(xml: &str) -> Result<Document> {
    // from_str 固定按 UTF-8 解码，忽略声明中的 encoding
    build_tree(Reader::from_str(xml))
}

/// 按检测到的编码把原始字节转成 UTF-8，BOM 会被去掉
pub fn decode_input(bytes: &[u8]) -> Result<Cow<'_, str>> {
    let encoding = sniff_encoding(bytes);
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(ConvertError::document_error(format!(
            "内容不是合法的 {} 编码",
            used.name()
        )));
    }
    Ok(text)
}

fn sniff_encoding(bytes: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }
    match bytes {
        [b'<', 0, b'?', 0, ..] => UTF_16LE,
        [0, b'<', 0, b'?', ..] => UTF_16BE,
        // 字节与 ASCII 兼容时声明为 UTF-16 没有意义
        _ => declared_encoding(bytes)
            .filter(|e| *e != UTF_16LE && *e != UTF_16BE)
            .unwrap_or(UTF_8),
    }
}

/// XML 声明中的 encoding 属性
fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let encoding = match reader.read_event_into(&mut buf) {
        Ok(Event::Decl(decl)) => match decl.encoding() {
            Some(Ok(label)) => Encoding::for_label(&label),
            _ => None,
        },
        _ => None,
    };
    encoding
}

fn build_tree<R: BufRead>(mut reader: Reader<R>) -> Result<Document> {
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let local = e.local_name();
                let name = std::str::from_utf8(local.as_ref())?;
                ensure_single_root(&root, &stack, name)?;
                stack.push(Element::new(name));
            }
            Event::Empty(e) => {
                let local = e.local_name();
                let name = std::str::from_utf8(local.as_ref())?;
                ensure_single_root(&root, &stack, name)?;
                attach(&mut stack, &mut root, Element::new(name));
            }
            Event::End(e) => {
                let element = stack.pop().ok_or_else(|| {
                    ConvertError::document_error(format!(
                        "多余的结束标签 </{}>",
                        String::from_utf8_lossy(e.local_name().as_ref())
                    ))
                })?;
                attach(&mut stack, &mut root, element);
            }
            Event::Text(e) => {
                let text = e.unescape()?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(e) => {
                let text = std::str::from_utf8(&e)?;
                push_text(&mut stack, text)?;
            }
            Event::Eof => break,
            // 声明、注释、处理指令、DOCTYPE 不影响记录
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(ConvertError::document_error(format!(
            "元素 <{}> 未闭合",
            open.name
        )));
    }

    root.map(|root| Document { root })
        .ok_or_else(|| ConvertError::document_error("文档没有根元素"))
}

fn ensure_single_root(
    root: &Option<Element>,
    stack: &[Element],
    name: &str,
) -> Result<()> {
    if stack.is_empty() && root.is_some() {
        return Err(ConvertError::document_error(format!(
            "根元素之后出现了元素 <{name}>"
        )));
    }
    Ok(())
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

fn push_text(stack: &mut [Element], text: &str) -> Result<()> {
    match stack.last_mut() {
        Some(current) => {
            current.push_text(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(ConvertError::document_error("根元素之外存在文本内容")),
    }
}
