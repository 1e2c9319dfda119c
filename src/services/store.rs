//! # 持久化状态存储
//!
//! 保存设置和生成历史，每次修改后立即写入磁盘，启动时重新加载。
//!
//! ## 持久化语义
//! - 单个 JSON 文件 `{history, settings}`，每次修改整体覆写
//! - 没有事务：修改与落盘之间崩溃会丢失最后一次写入
//! - 写入失败只记录日志，不影响内存中的状态
//!
//! ## 同步语义
//! 每个修改方法都返回需要转发给其他窗口的 `StoreUpdate`：
//! - 设置修改携带合并后的完整设置
//! - 历史修改携带完整的新历史列表（接收方整体替换）

use std::path::{Path, PathBuf};

use crate::config::HISTORY_LIMIT;
use crate::models::history::{HistoryEntry, NewHistoryEntry, clamp_rating};
use crate::models::settings::{AppSettings, SettingsPatch};
use crate::models::sync::{PersistedState, StoreUpdate};

/// 持久化状态容器
///
/// 宿主进程中作为 Tauri managed state 注册（外层 `Mutex`），
/// 测试中也可以为每个模拟窗口各创建一份。
#[derive(Debug)]
pub struct PersistedStore {
    state: PersistedState,
    /// 存储文件路径：为 None 时仅保存在内存中
    path: Option<PathBuf>,
}

impl PersistedStore {
    /// 创建不落盘的存储（默认设置、空历史）
    pub fn in_memory() -> Self {
        Self {
            state: PersistedState::default(),
            path: None,
        }
    }

    /// 从文件加载存储
    ///
    /// - 文件不存在：使用默认状态
    /// - 文件损坏：记录警告并使用默认状态
    ///
    /// 加载后重新应用历史上限并钳制评分，防止手工编辑的文件破坏不变量。
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut state = read_state(&path);

        state.history.truncate(HISTORY_LIMIT);
        for entry in &mut state.history {
            entry.rating = entry.rating.map(|r| clamp_rating(r as i64));
        }

        log::info!(
            "已加载存储 {}: {} 条历史记录",
            path.display(),
            state.history.len()
        );

        Self {
            state,
            path: Some(path),
        }
    }

    pub fn settings(&self) -> &AppSettings {
        &self.state.settings
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.state.history
    }

    /// 当前完整状态的副本，供新就绪的窗口初始化
    pub fn snapshot(&self) -> PersistedState {
        self.state.clone()
    }

    // ======== 设置 ========

    /// 浅合并设置补丁
    ///
    /// # 返回值
    /// 携带合并后完整设置的增量消息
    pub fn update_settings(&mut self, patch: &SettingsPatch) -> StoreUpdate {
        self.state.settings.merge(patch);
        self.persist();
        StoreUpdate::settings(self.state.settings.to_patch())
    }

    // ======== 历史记录 ========

    /// 新增一条历史记录到列表头部，超过上限时淘汰最旧的记录
    pub fn add_to_history(&mut self, new: NewHistoryEntry) -> (HistoryEntry, StoreUpdate) {
        let entry = HistoryEntry::create(new);
        self.state.history.insert(0, entry.clone());
        self.state.history.truncate(HISTORY_LIMIT);
        self.persist();
        (entry, self.history_update())
    }

    /// 删除指定 ID 的历史记录，ID 不存在时列表保持不变
    pub fn remove_from_history(&mut self, id: &str) -> StoreUpdate {
        self.state.history.retain(|item| item.id != id);
        self.persist();
        self.history_update()
    }

    /// 为历史记录评分，评分钳制到 1–5
    pub fn rate_prompt(&mut self, id: &str, rating: i64) -> StoreUpdate {
        let rating = clamp_rating(rating);
        if let Some(item) = self.state.history.iter_mut().find(|item| item.id == id) {
            item.rating = Some(rating);
        }
        self.persist();
        self.history_update()
    }

    /// 清空所有历史记录
    pub fn clear_history(&mut self) -> StoreUpdate {
        self.state.history.clear();
        self.persist();
        self.history_update()
    }

    // ======== 远端增量 ========

    /// 合并其他窗口转发来的增量
    ///
    /// settings 逐字段合并，history 整体替换（同样受上限约束）。
    /// 空消息直接忽略，不触发写盘。
    pub fn apply_update(&mut self, update: &StoreUpdate) {
        if update.is_empty() {
            return;
        }
        if let Some(patch) = &update.settings {
            self.state.settings.merge(patch);
        }
        if let Some(history) = &update.history {
            self.state.history = history
                .iter()
                .take(HISTORY_LIMIT)
                .cloned()
                .map(|mut entry| {
                    entry.rating = entry.rating.map(|r| clamp_rating(r as i64));
                    entry
                })
                .collect();
        }
        self.persist();
    }

    fn history_update(&self) -> StoreUpdate {
        StoreUpdate::history(self.state.history.clone())
    }

    /// 将当前状态写入磁盘，失败只记录日志
    fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = write_state(path, &self.state) {
            log::error!("保存存储失败 {}: {}", path.display(), e);
        }
    }
}

fn read_state(path: &Path) -> PersistedState {
    if !path.exists() {
        return PersistedState::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("解析存储文件失败，使用默认状态: {}", e);
            PersistedState::default()
        }),
        Err(e) => {
            log::warn!("读取存储文件失败，使用默认状态: {}", e);
            PersistedState::default()
        }
    }
}

fn write_state(path: &Path, state: &PersistedState) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| format!("创建数据目录失败: {}", e))?;
        }
    }

    let content =
        serde_json::to_string_pretty(state).map_err(|e| format!("序列化存储失败: {}", e))?;

    std::fs::write(path, content).map_err(|e| format!("写入存储文件失败: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::{GenerationStyle, Theme};

    fn new_entry(input: &str) -> NewHistoryEntry {
        NewHistoryEntry {
            user_input: input.to_string(),
            generated_prompt: format!("prompt for {input}"),
            category: None,
            rating: None,
        }
    }

    #[test]
    fn test_history_capped_newest_first() {
        let mut store = PersistedStore::in_memory();
        for i in 0..130 {
            store.add_to_history(new_entry(&i.to_string()));
            assert!(store.history().len() <= HISTORY_LIMIT);
        }

        let history = store.history();
        assert_eq!(history.len(), HISTORY_LIMIT);
        // 最新在前，最旧的 30 条已被淘汰
        assert_eq!(history[0].user_input, "129");
        assert_eq!(history[HISTORY_LIMIT - 1].user_input, "30");
        for pair in history.windows(2) {
            let newer: u32 = pair[0].user_input.parse().unwrap();
            let older: u32 = pair[1].user_input.parse().unwrap();
            assert_eq!(newer, older + 1);
        }
    }

    #[test]
    fn test_mutations_return_full_history() {
        let mut store = PersistedStore::in_memory();
        let (first, _) = store.add_to_history(new_entry("a"));
        let (second, update) = store.add_to_history(new_entry("b"));
        assert_eq!(update.history.as_ref().unwrap().len(), 2);
        assert!(update.settings.is_none());

        let update = store.remove_from_history(&first.id);
        let history = update.history.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, second.id);

        let update = store.clear_history();
        assert_eq!(update.history, Some(vec![]));
        assert!(store.history().is_empty());
    }

    #[test]
    fn test_rating_is_clamped() {
        let mut store = PersistedStore::in_memory();
        let (entry, _) = store.add_to_history(new_entry("a"));

        store.rate_prompt(&entry.id, 42);
        assert_eq!(store.history()[0].rating, Some(5));

        store.rate_prompt(&entry.id, 0);
        assert_eq!(store.history()[0].rating, Some(1));

        // 不存在的 ID 不影响现有记录
        store.rate_prompt("missing", 3);
        assert_eq!(store.history()[0].rating, Some(1));
    }

    #[test]
    fn test_apply_update_clamps_incoming_ratings() {
        let mut store = PersistedStore::in_memory();
        let mut entry = HistoryEntry::create(new_entry("a"));
        entry.rating = Some(9);

        store.apply_update(&StoreUpdate::history(vec![entry]));
        assert_eq!(store.history()[0].rating, Some(5));
        assert_eq!(store.snapshot().history[0].rating, Some(5));
    }

    #[test]
    fn test_apply_update_accepts_negative_rating_from_window() {
        let raw = r#"{"history":[{"id":"a","userInput":"x","generatedPrompt":"y",
            "timestamp":"2025-01-02T03:04:05Z","rating":-1}]}"#;
        let update: StoreUpdate = serde_json::from_str(raw).unwrap();

        let mut store = PersistedStore::in_memory();
        store.apply_update(&update);
        assert_eq!(store.history()[0].rating, Some(1));
    }

    #[test]
    fn test_update_settings_broadcasts_merged_settings() {
        let mut store = PersistedStore::in_memory();
        store.update_settings(&SettingsPatch {
            api_key: Some("sk-test".into()),
            ..Default::default()
        });
        let update = store.update_settings(&SettingsPatch {
            generation_style: Some(GenerationStyle::Concise),
            ..Default::default()
        });

        let patch = update.settings.unwrap();
        assert_eq!(patch.api_key.as_deref(), Some("sk-test"));
        assert_eq!(patch.generation_style, Some(GenerationStyle::Concise));
        assert!(update.history.is_none());
    }

    #[test]
    fn test_apply_update_merges_settings_and_replaces_history() {
        let mut store = PersistedStore::in_memory();
        store.add_to_history(new_entry("local"));
        store.update_settings(&SettingsPatch {
            api_key: Some("sk-local".into()),
            ..Default::default()
        });

        store.apply_update(&StoreUpdate {
            settings: Some(SettingsPatch {
                theme: Some(Theme::Dark),
                ..Default::default()
            }),
            history: Some(vec![]),
        });

        assert_eq!(store.settings().theme, Theme::Dark);
        assert_eq!(store.settings().api_key, "sk-local");
        assert!(store.history().is_empty());
    }

    #[test]
    fn test_reload_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ai-prompt-gen-storage.json");

        let mut store = PersistedStore::load(&path);
        store.add_to_history(new_entry("写一篇文章"));
        store.update_settings(&SettingsPatch {
            theme: Some(Theme::Auto),
            ..Default::default()
        });

        let reloaded = PersistedStore::load(&path);
        assert_eq!(reloaded.snapshot(), store.snapshot());

        // 磁盘上是单个 {history, settings} 对象
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw["history"].is_array());
        assert_eq!(raw["settings"]["theme"], "auto");
    }

    #[test]
    fn test_load_keeps_store_with_out_of_range_rating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ai-prompt-gen-storage.json");
        std::fs::write(
            &path,
            r#"{"history":[{"id":"a","userInput":"x","generatedPrompt":"y",
                "timestamp":"2025-01-02T03:04:05Z","rating":300}],
               "settings":{"apiKey":"sk-keep"}}"#,
        )
        .unwrap();

        let store = PersistedStore::load(&path);
        assert_eq!(store.history().len(), 1);
        assert_eq!(store.history()[0].rating, Some(5));
        assert_eq!(store.settings().api_key, "sk-keep");
    }

    #[test]
    fn test_corrupt_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ai-prompt-gen-storage.json");
        std::fs::write(&path, "{{{").unwrap();

        let store = PersistedStore::load(&path);
        assert!(store.history().is_empty());
        assert_eq!(store.settings().generation_style, GenerationStyle::Detailed);
    }
}
