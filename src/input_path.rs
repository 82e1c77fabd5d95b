use std::env;
use std::path::PathBuf;

/// 获取配置文件路径：命令行第一个参数，未提供时使用默认配置
pub fn get_config_path() -> Option<PathBuf> {
    env::args_os().nth(1).map(PathBuf::from)
}
