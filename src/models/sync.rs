//! # 跨窗口同步数据模型
//!
//! `StoreUpdate` 是窗口之间通过宿主进程转发的增量消息，
//! `PersistedState` 是写入磁盘的单个 JSON 对象。

use serde::{Deserialize, Serialize};

use crate::models::history::HistoryEntry;
use crate::models::settings::{AppSettings, SettingsPatch};

/// 跨窗口状态增量
///
/// 对应前端 TypeScript 接口：
/// ```typescript
/// interface StoreUpdate {
///   settings?: Partial<AppSettings>;
///   history?: GeneratedPrompt[];
/// }
/// ```
///
/// 接收方合并规则：settings 逐字段浅合并，history 整体替换。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<SettingsPatch>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<HistoryEntry>>,
}

impl StoreUpdate {
    pub fn settings(patch: SettingsPatch) -> Self {
        Self {
            settings: Some(patch),
            history: None,
        }
    }

    pub fn history(history: Vec<HistoryEntry>) -> Self {
        Self {
            settings: None,
            history: Some(history),
        }
    }

    /// 两个字段都缺失时视为空消息，不需要转发
    pub fn is_empty(&self) -> bool {
        self.settings.is_none() && self.history.is_none()
    }
}

/// 持久化到磁盘的应用状态：`{history, settings}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub history: Vec<HistoryEntry>,

    #[serde(default)]
    pub settings: AppSettings,
}
