use anyhow::Result;
use xml_csv_merge::config::Config;
use xml_csv_merge::convert::Pipeline;
use xml_csv_merge::input_path::get_config_path;

fn main() -> Result<()> {
    let config = match get_config_path() {
        Some(path) => Config::from_file(&path)?,
        None => Config::default(),
    };

    #[cfg(feature = "logging")]
    let _guard = xml_csv_merge::logging::init_logging(&config.log)?;

    let mut pipeline = Pipeline::new(config.convert);
    let summary = pipeline.run()?;

    // 启用 logging 时失败已经写入日志
    #[cfg(not(feature = "logging"))]
    for failure in summary.failures() {
        eprintln!("处理文件 {} 失败: {}", failure.path.display(), failure.error);
    }

    println!("{summary}");
    Ok(())
}
