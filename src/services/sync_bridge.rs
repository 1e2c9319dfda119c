//! # 跨窗口同步桥
//!
//! 宿主进程是唯一的转发点：某个窗口修改共享状态后把 `StoreUpdate` 发给宿主，
//! 宿主原样转发给除发送者以外的所有窗口（`store-update` 事件）。
//!
//! ## 投递语义
//! - 无确认、无重试，只保证同一对发送者/接收者之间的 FIFO
//! - 已注册但尚未就绪的窗口收不到消息（静默丢弃，debug 日志）；
//!   窗口就绪时通过 `window_ready` 取得宿主的完整快照，补齐丢失的部分
//! - 接收方按到达顺序合并，后到者覆盖先到者
//!
//! ## 运行时解耦
//! 实际投递通过 `WindowSink` trait 完成。宿主使用 Tauri 的 `emit_to` 实现，
//! 测试使用内存中的模拟窗口。

use std::sync::Mutex;

use serde::Serialize;

use crate::models::sync::StoreUpdate;

/// 跨窗口状态同步事件名
pub const STORE_UPDATE_EVENT: &str = "store-update";

/// 消息投递目标
pub trait WindowSink {
    /// 向指定窗口投递一条事件
    fn deliver(&self, label: &str, event: &str, update: &StoreUpdate) -> Result<(), String>;
}

/// 一次转发的结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayReport {
    /// 成功投递的窗口
    pub delivered: Vec<String>,
    /// 因未就绪或投递失败而丢弃的窗口
    pub dropped: Vec<String>,
}

/// 已注册窗口
#[derive(Debug, Clone)]
struct WindowSlot {
    label: String,
    ready: bool,
}

/// 同步桥
///
/// 维护窗口注册表，负责把增量转发给除发送者以外的窗口。
/// 通过 Tauri 的 `manage()` 注册为应用状态。
#[derive(Debug, Default)]
pub struct SyncBridge {
    windows: Mutex<Vec<WindowSlot>>,
}

impl SyncBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册新创建的窗口（初始为未就绪），重复注册会重置为未就绪
    pub fn register(&self, label: &str) {
        if let Ok(mut windows) = self.windows.lock() {
            windows.retain(|slot| slot.label != label);
            windows.push(WindowSlot {
                label: label.to_string(),
                ready: false,
            });
        }
    }

    /// 标记窗口已就绪；未注册的窗口会被自动注册
    pub fn mark_ready(&self, label: &str) {
        if let Ok(mut windows) = self.windows.lock() {
            match windows.iter_mut().find(|slot| slot.label == label) {
                Some(slot) => slot.ready = true,
                None => windows.push(WindowSlot {
                    label: label.to_string(),
                    ready: true,
                }),
            }
        }
    }

    /// 窗口销毁后移除
    pub fn unregister(&self, label: &str) {
        if let Ok(mut windows) = self.windows.lock() {
            windows.retain(|slot| slot.label != label);
        }
    }

    pub fn is_ready(&self, label: &str) -> bool {
        self.windows
            .lock()
            .map(|windows| windows.iter().any(|slot| slot.label == label && slot.ready))
            .unwrap_or(false)
    }

    /// 已注册窗口的标签列表（按注册顺序）
    pub fn labels(&self) -> Vec<String> {
        self.windows
            .lock()
            .map(|windows| windows.iter().map(|slot| slot.label.clone()).collect())
            .unwrap_or_default()
    }

    /// 把增量转发给除 `sender` 以外的所有窗口
    ///
    /// 注册表锁在投递前释放，投递过程中可以安全地再次访问同步桥。
    ///
    /// # 参数
    /// - `sink` - 投递实现
    /// - `sender` - 发送者窗口标签
    /// - `update` - 原样转发的增量
    pub fn relay(&self, sink: &dyn WindowSink, sender: &str, update: &StoreUpdate) -> RelayReport {
        let mut report = RelayReport::default();
        if update.is_empty() {
            return report;
        }

        let targets: Vec<WindowSlot> = match self.windows.lock() {
            Ok(windows) => windows
                .iter()
                .filter(|slot| slot.label != sender)
                .cloned()
                .collect(),
            Err(_) => return report,
        };

        for slot in targets {
            if !slot.ready {
                log::debug!("窗口 {} 尚未就绪，丢弃同步消息", slot.label);
                report.dropped.push(slot.label);
                continue;
            }

            match sink.deliver(&slot.label, STORE_UPDATE_EVENT, update) {
                Ok(()) => {
                    log::debug!("同步消息已转发: {} -> {}", sender, slot.label);
                    report.delivered.push(slot.label);
                }
                Err(e) => {
                    log::warn!("转发同步消息到窗口 {} 失败: {}", slot.label, e);
                    report.dropped.push(slot.label);
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::models::history::NewHistoryEntry;
    use crate::models::settings::{GenerationStyle, Language, SettingsPatch, Theme};
    use crate::services::store::PersistedStore;

    /// 模拟窗口：每个窗口持有一份独立的存储副本，收到事件后立即合并
    struct SimulatedWindows {
        stores: Mutex<HashMap<String, PersistedStore>>,
    }

    impl SimulatedWindows {
        fn new(labels: &[&str]) -> Self {
            let stores = labels
                .iter()
                .map(|label| (label.to_string(), PersistedStore::in_memory()))
                .collect();
            Self {
                stores: Mutex::new(stores),
            }
        }

        /// 在某个窗口本地执行修改并取得需要广播的增量
        fn mutate<F>(&self, label: &str, f: F) -> StoreUpdate
        where
            F: FnOnce(&mut PersistedStore) -> StoreUpdate,
        {
            let mut stores = self.stores.lock().unwrap();
            f(stores.get_mut(label).unwrap())
        }

        fn with<T>(&self, label: &str, f: impl FnOnce(&PersistedStore) -> T) -> T {
            let stores = self.stores.lock().unwrap();
            f(stores.get(label).unwrap())
        }
    }

    impl WindowSink for SimulatedWindows {
        fn deliver(&self, label: &str, event: &str, update: &StoreUpdate) -> Result<(), String> {
            assert_eq!(event, STORE_UPDATE_EVENT);
            let mut stores = self.stores.lock().unwrap();
            let store = stores.get_mut(label).ok_or("窗口不存在")?;
            store.apply_update(update);
            Ok(())
        }
    }

    fn ready_bridge(labels: &[&str]) -> SyncBridge {
        let bridge = SyncBridge::new();
        for label in labels {
            bridge.register(label);
            bridge.mark_ready(label);
        }
        bridge
    }

    fn entry(input: &str) -> NewHistoryEntry {
        NewHistoryEntry {
            user_input: input.into(),
            generated_prompt: "p".into(),
            category: None,
            rating: None,
        }
    }

    #[test]
    fn test_settings_update_is_field_merged_in_other_window() {
        let windows = SimulatedWindows::new(&["main", "settings"]);
        let bridge = ready_bridge(&["main", "settings"]);

        // main 窗口本地先改了语言，随后 settings 窗口改主题和风格
        windows.mutate("main", |s| {
            s.update_settings(&SettingsPatch {
                language: Some(Language::En),
                ..Default::default()
            })
        });
        let update = windows.mutate("settings", |s| {
            s.update_settings(&SettingsPatch {
                theme: Some(Theme::Dark),
                generation_style: Some(GenerationStyle::Professional),
                ..Default::default()
            })
        });
        let report = bridge.relay(&windows, "settings", &update);
        assert_eq!(report.delivered, vec!["main".to_string()]);

        windows.with("main", |s| {
            assert_eq!(s.settings().theme, Theme::Dark);
            assert_eq!(s.settings().generation_style, GenerationStyle::Professional);
        });
        // 两个窗口的设置收敛到发送方合并后的结果
        let main = windows.with("main", |s| s.settings().clone());
        let settings = windows.with("settings", |s| s.settings().clone());
        assert_eq!(main, settings);
    }

    #[test]
    fn test_clear_history_empties_every_window() {
        let windows = SimulatedWindows::new(&["main", "settings"]);
        let bridge = ready_bridge(&["main", "settings"]);

        for input in ["a", "b", "c"] {
            let update = windows.mutate("main", |s| s.add_to_history(entry(input)).1);
            bridge.relay(&windows, "main", &update);
        }
        windows.with("settings", |s| assert_eq!(s.history().len(), 3));

        let update = windows.mutate("settings", |s| s.clear_history());
        bridge.relay(&windows, "settings", &update);

        windows.with("main", |s| assert!(s.history().is_empty()));
        windows.with("settings", |s| assert!(s.history().is_empty()));
    }

    #[test]
    fn test_sender_is_excluded() {
        let windows = SimulatedWindows::new(&["main", "settings"]);
        let bridge = ready_bridge(&["main", "settings"]);

        let update = windows.mutate("main", |s| s.add_to_history(entry("x")).1);
        let report = bridge.relay(&windows, "main", &update);
        assert_eq!(report.delivered, vec!["settings".to_string()]);
        assert!(report.dropped.is_empty());
    }

    #[test]
    fn test_not_ready_window_drops_message() {
        let windows = SimulatedWindows::new(&["main", "settings"]);
        let bridge = SyncBridge::new();
        bridge.register("main");
        bridge.mark_ready("main");
        bridge.register("settings");

        let update = windows.mutate("main", |s| s.add_to_history(entry("x")).1);
        let report = bridge.relay(&windows, "main", &update);

        assert_eq!(report.dropped, vec!["settings".to_string()]);
        windows.with("settings", |s| assert!(s.history().is_empty()));

        // 就绪后之后的消息正常投递
        bridge.mark_ready("settings");
        let update = windows.mutate("main", |s| s.add_to_history(entry("y")).1);
        bridge.relay(&windows, "main", &update);
        windows.with("settings", |s| assert_eq!(s.history().len(), 2));
    }

    #[test]
    fn test_unregistered_window_receives_nothing() {
        let windows = SimulatedWindows::new(&["main", "settings"]);
        let bridge = ready_bridge(&["main", "settings"]);
        bridge.unregister("settings");

        let update = windows.mutate("main", |s| s.clear_history());
        let report = bridge.relay(&windows, "main", &update);
        assert_eq!(report, RelayReport::default());
        assert_eq!(bridge.labels(), vec!["main".to_string()]);
    }

    #[test]
    fn test_empty_update_is_not_relayed() {
        let windows = SimulatedWindows::new(&["main", "settings"]);
        let bridge = ready_bridge(&["main", "settings"]);
        let report = bridge.relay(&windows, "main", &StoreUpdate::default());
        assert!(report.delivered.is_empty());
    }

    #[test]
    fn test_late_window_catches_up_from_host_snapshot() {
        let windows = SimulatedWindows::new(&["main", "settings"]);
        let mut host = PersistedStore::in_memory();
        let bridge = SyncBridge::new();
        bridge.register("main");
        bridge.mark_ready("main");
        bridge.register("settings");

        // settings 窗口页面尚未就绪，这两条消息都被丢弃
        let updates = [
            windows.mutate("main", |s| s.add_to_history(entry("x")).1),
            windows.mutate("main", |s| {
                s.update_settings(&SettingsPatch {
                    theme: Some(Theme::Dark),
                    ..Default::default()
                })
            }),
        ];
        for update in &updates {
            host.apply_update(update);
            let report = bridge.relay(&windows, "main", update);
            assert_eq!(report.dropped, vec!["settings".to_string()]);
        }
        windows.with("settings", |s| assert!(s.history().is_empty()));

        // 就绪时取得宿主快照并整体载入
        bridge.mark_ready("settings");
        let snapshot = host.snapshot();
        windows.mutate("settings", |s| {
            let catch_up = StoreUpdate {
                settings: Some(snapshot.settings.to_patch()),
                history: Some(snapshot.history.clone()),
            };
            s.apply_update(&catch_up);
            catch_up
        });

        let main = windows.with("main", |s| s.snapshot());
        let settings = windows.with("settings", |s| s.snapshot());
        assert_eq!(settings, main);
        assert_eq!(settings.settings.theme, Theme::Dark);
    }

    #[test]
    fn test_reloaded_window_stays_registered_once() {
        let bridge = ready_bridge(&["main", "settings"]);
        assert!(bridge.is_ready("settings"));
        bridge.mark_ready("settings");
        assert!(bridge.is_ready("settings"));
        assert_eq!(bridge.labels(), vec!["main".to_string(), "settings".to_string()]);
    }

    #[test]
    fn test_register_resets_readiness() {
        let bridge = ready_bridge(&["settings"]);
        assert!(bridge.is_ready("settings"));
        bridge.register("settings");
        assert!(!bridge.is_ready("settings"));
    }
}
