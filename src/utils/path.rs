//! # 路径工具函数
//!
//! 提供应用数据文件的路径定位：
//! - 应用数据目录（`<data_dir>/ai-prompt-gen/`）
//! - 持久化存储文件 `ai-prompt-gen-storage.json`
//! - 可选配置文件 `config.json`

use std::path::PathBuf;

/// 应用数据目录名
pub const APP_DIR_NAME: &str = "ai-prompt-gen";

/// 持久化存储文件名（对应前端 persist 的存储键 `ai-prompt-gen-storage`）
pub const STORAGE_FILE_NAME: &str = "ai-prompt-gen-storage.json";

/// 配置文件名
pub const CONFIG_FILE_NAME: &str = "config.json";

/// 获取应用数据目录的绝对路径
///
/// 使用 `dirs` crate 获取跨平台的数据目录。
///
/// # 错误
/// 如果无法确定系统数据目录（极端情况，如无 HOME 环境变量），返回错误信息。
///
/// # 示例
/// - Windows: `C:\Users\username\AppData\Roaming\ai-prompt-gen`
/// - macOS: `/Users/username/Library/Application Support/ai-prompt-gen`
/// - Linux: `/home/username/.local/share/ai-prompt-gen`
pub fn get_app_data_path() -> Result<PathBuf, String> {
    let data = dirs::data_dir().ok_or_else(|| "无法获取系统数据目录".to_string())?;
    Ok(data.join(APP_DIR_NAME))
}

/// 获取持久化存储文件路径
pub fn get_storage_path() -> Result<PathBuf, String> {
    Ok(get_app_data_path()?.join(STORAGE_FILE_NAME))
}

/// 获取配置文件路径
pub fn get_config_path() -> Result<PathBuf, String> {
    Ok(get_app_data_path()?.join(CONFIG_FILE_NAME))
}
