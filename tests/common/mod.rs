//! 集成测试公共模块

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use xml_csv_merge::config::ConvertConfig;

/// 创建测试用的 XML 文件
#[allow(dead_code)]
pub fn create_xml_file(dir: &Path, filename: &str, content: &str) -> PathBuf {
    let file_path = dir.join(filename);
    fs::write(&file_path, content).expect("Failed to write test file");
    file_path
}

/// 生成一个完整的 `<Item>` 元素
#[allow(dead_code)]
pub fn item(name: &str, quantity: &str, price: &str, comment: &str) -> String {
    format!(
        "<Item><ProductName>{name}</ProductName><Quantity>{quantity}</Quantity>\
         <Price>{price}</Price><Comment>{comment}</Comment></Item>"
    )
}

/// 把若干 `<Item>` 包装成文档
#[allow(dead_code)]
pub fn document(items: &[String]) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Order>\n{}\n</Order>\n",
        items.join("\n")
    )
}

/// 输入目录和输出路径位于同一个临时目录下的测试环境
#[allow(dead_code)]
pub struct Workspace {
    pub dir: TempDir,
}

#[allow(dead_code)]
impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir(dir.path().join("xml_files")).unwrap();
        Self { dir }
    }

    pub fn input_dir(&self) -> PathBuf {
        self.dir.path().join("xml_files")
    }

    pub fn output_path(&self) -> PathBuf {
        self.dir.path().join("csv_files").join("out.csv")
    }

    pub fn add_file(&self, filename: &str, content: &str) -> PathBuf {
        create_xml_file(&self.input_dir(), filename, content)
    }

    pub fn config(&self) -> ConvertConfig {
        ConvertConfig {
            input_dir: self.input_dir().to_string_lossy().into_owned(),
            output_path: self.output_path().to_string_lossy().into_owned(),
            ..Default::default()
        }
    }
}

/// 读取 CSV 输出，返回 (表头, 数据行)
#[allow(dead_code)]
pub fn read_output(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .expect("应该能读取 CSV 文件");

    let mut rows: Vec<Vec<String>> = reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect();
    assert!(!rows.is_empty(), "输出至少应该包含表头");
    let header = rows.remove(0);
    (header, rows)
}

/// 输出中表头出现的次数
#[allow(dead_code)]
pub fn header_count(path: &Path) -> usize {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|line| *line == "ProductName,Quantity,Price,Comment")
        .count()
}
