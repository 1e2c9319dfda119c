//! # 应用配置
//!
//! 从 `<data_dir>/ai-prompt-gen/config.json` 加载可选配置。
//! 文件不存在或解析失败时使用默认值，缺失的字段同样回退到默认值。
//!
//! ```json
//! {
//!   "apiEndpoint": "https://yunwu.ai/v1/chat/completions",
//!   "model": "gpt-4o",
//!   "updateRecheckIntervalSecs": 14400
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::utils::path;

/// 默认 chat-completion 接口地址
pub const DEFAULT_API_ENDPOINT: &str = "https://yunwu.ai/v1/chat/completions";

/// 默认模型
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// 历史记录上限
pub const HISTORY_LIMIT: usize = 100;

/// 应用配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// chat-completion 接口完整地址
    pub api_endpoint: String,

    /// 固定模型标识
    pub model: String,

    pub temperature: f32,

    pub max_tokens: u32,

    /// 启动后首次检查更新的延迟（秒）
    pub update_check_delay_secs: u64,

    /// 之后定期检查更新的间隔（秒），0 表示只在启动时检查一次
    pub update_recheck_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 1500,
            update_check_delay_secs: 5,
            update_recheck_interval_secs: 4 * 60 * 60,
        }
    }
}

impl AppConfig {
    /// 从默认位置加载配置
    pub fn load() -> Self {
        match path::get_config_path() {
            Ok(config_path) => Self::load_from(&config_path),
            Err(e) => {
                log::warn!("{}，使用默认配置", e);
                Self::default()
            }
        }
    }

    /// 从指定文件加载配置，读取失败时静默返回默认配置
    pub fn load_from(config_path: &Path) -> Self {
        if !config_path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(config_path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("解析配置文件失败，使用默认配置: {}", e);
                Self::default()
            }),
            Err(e) => {
                log::warn!("读取配置文件失败，使用默认配置: {}", e);
                Self::default()
            }
        }
    }

    pub fn update_check_delay(&self) -> Duration {
        Duration::from_secs(self.update_check_delay_secs)
    }

    /// 定期检查间隔，配置为 0 时返回 None
    pub fn update_recheck_interval(&self) -> Option<Duration> {
        (self.update_recheck_interval_secs > 0)
            .then(|| Duration::from_secs(self.update_recheck_interval_secs))
    }
}
