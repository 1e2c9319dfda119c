//! # 共享状态 Tauri Commands
//!
//! 宿主进程持有权威的 `PersistedStore`，窗口通过这里的 commands 读写：
//! - `store_snapshot` - 读取完整状态
//! - `window_ready` - 窗口页面就绪，开始接收同步消息，并取得完整状态
//! - `store_update` - 转发窗口自行合并过的增量（`store-update` 通道）
//! - `update_settings` / `add_history` / `remove_history` / `rate_history` /
//!   `clear_history` - 在宿主修改状态后转发给其他窗口
//! - `search_history` / `history_categories` - 历史面板查询
//!
//! 所有修改都先落到宿主存储（并持久化），再经同步桥发给除调用窗口之外的窗口。

use std::sync::Mutex;

use tauri::{AppHandle, Emitter, Runtime, State, WebviewWindow};

use crate::models::history::{HistoryEntry, NewHistoryEntry};
use crate::models::settings::{AppSettings, SettingsPatch};
use crate::models::sync::{PersistedState, StoreUpdate};
use crate::services::history_query;
use crate::services::store::PersistedStore;
use crate::services::sync_bridge::{RelayReport, SyncBridge, WindowSink};

/// 宿主进程中的权威存储
///
/// 锁只在同步代码中持有，不跨越 `.await`。
pub struct HostStore(Mutex<PersistedStore>);

impl HostStore {
    pub fn new(store: PersistedStore) -> Self {
        Self(Mutex::new(store))
    }

    /// 在锁内访问存储
    pub fn with<T>(&self, f: impl FnOnce(&mut PersistedStore) -> T) -> Result<T, String> {
        let mut store = self
            .0
            .lock()
            .map_err(|_| "存储状态不可用".to_string())?;
        Ok(f(&mut store))
    }
}

/// 通过 Tauri 事件系统向指定窗口投递同步消息
impl<R: Runtime> WindowSink for AppHandle<R> {
    fn deliver(&self, label: &str, event: &str, update: &StoreUpdate) -> Result<(), String> {
        self.emit_to(label, event, update).map_err(|e| e.to_string())
    }
}

/// 把宿主产生的增量转发给除 `sender` 以外的窗口
pub fn relay<R: Runtime>(
    app: &AppHandle<R>,
    bridge: &SyncBridge,
    sender: &str,
    update: &StoreUpdate,
) -> RelayReport {
    let report = bridge.relay(app, sender, update);
    if !report.dropped.is_empty() {
        log::debug!("同步消息未送达: {:?}", report.dropped);
    }
    report
}

/// 读取完整状态
#[tauri::command]
pub fn store_snapshot(store: State<'_, HostStore>) -> Result<PersistedState, String> {
    store.with(|s| s.snapshot())
}

/// 窗口页面就绪
///
/// 从此刻起窗口开始接收 `store-update` 消息。未就绪期间被丢弃的消息
/// 通过返回的完整状态补齐。
///
/// # 返回值
/// 宿主当前的完整状态
#[tauri::command]
pub fn window_ready(
    window: WebviewWindow,
    store: State<'_, HostStore>,
    bridge: State<'_, SyncBridge>,
) -> Result<PersistedState, String> {
    if bridge.is_ready(window.label()) {
        // 页面刷新后再次就绪
        log::debug!("窗口 {} 重新加载", window.label());
    }
    bridge.mark_ready(window.label());
    log::info!(
        "窗口 {} 已就绪，已注册窗口: {:?}",
        window.label(),
        bridge.labels()
    );
    store.with(|s| s.snapshot())
}

/// 转发窗口发来的增量
///
/// 调用窗口已在本地合并过该增量；宿主同样合并一份并持久化，
/// 然后原样转发给其他窗口。
///
/// # 返回值
/// 本次转发的投递结果
#[tauri::command]
pub fn store_update(
    app: AppHandle,
    window: WebviewWindow,
    update: StoreUpdate,
    store: State<'_, HostStore>,
    bridge: State<'_, SyncBridge>,
) -> Result<RelayReport, String> {
    if update.is_empty() {
        return Ok(RelayReport::default());
    }
    store.with(|s| s.apply_update(&update))?;
    Ok(relay(&app, &bridge, window.label(), &update))
}

/// 合并部分设置
///
/// # 返回值
/// 合并后的完整设置
#[tauri::command]
pub fn update_settings(
    app: AppHandle,
    window: WebviewWindow,
    patch: SettingsPatch,
    store: State<'_, HostStore>,
    bridge: State<'_, SyncBridge>,
) -> Result<AppSettings, String> {
    let (settings, update) = store.with(|s| {
        let update = s.update_settings(&patch);
        (s.settings().clone(), update)
    })?;
    relay(&app, &bridge, window.label(), &update);
    Ok(settings)
}

/// 新增一条历史记录（插入到最前面，超出上限时丢弃最旧的）
///
/// # 返回值
/// 分配了 id 和时间戳的新记录
#[tauri::command]
pub fn add_history(
    app: AppHandle,
    window: WebviewWindow,
    entry: NewHistoryEntry,
    store: State<'_, HostStore>,
    bridge: State<'_, SyncBridge>,
) -> Result<HistoryEntry, String> {
    let (entry, update) = store.with(|s| s.add_to_history(entry))?;
    relay(&app, &bridge, window.label(), &update);
    Ok(entry)
}

/// 按 id 删除历史记录，id 不存在时不做任何修改
#[tauri::command]
pub fn remove_history(
    app: AppHandle,
    window: WebviewWindow,
    id: String,
    store: State<'_, HostStore>,
    bridge: State<'_, SyncBridge>,
) -> Result<Vec<HistoryEntry>, String> {
    let (history, update) = store.with(|s| {
        let update = s.remove_from_history(&id);
        (s.history().to_vec(), update)
    })?;
    relay(&app, &bridge, window.label(), &update);
    Ok(history)
}

/// 评分（超出 1-5 的值被钳制到范围内）
#[tauri::command]
pub fn rate_history(
    app: AppHandle,
    window: WebviewWindow,
    id: String,
    rating: i64,
    store: State<'_, HostStore>,
    bridge: State<'_, SyncBridge>,
) -> Result<Vec<HistoryEntry>, String> {
    let (history, update) = store.with(|s| {
        let update = s.rate_prompt(&id, rating);
        (s.history().to_vec(), update)
    })?;
    relay(&app, &bridge, window.label(), &update);
    Ok(history)
}

/// 清空历史记录，所有窗口随之清空
#[tauri::command]
pub fn clear_history(
    app: AppHandle,
    window: WebviewWindow,
    store: State<'_, HostStore>,
    bridge: State<'_, SyncBridge>,
) -> Result<(), String> {
    let update = store.with(|s| s.clear_history())?;
    relay(&app, &bridge, window.label(), &update);
    log::info!("历史记录已清空");
    Ok(())
}

/// 搜索历史记录
///
/// # 参数
/// - `query` - 搜索词，对输入和生成结果做不区分大小写的匹配
/// - `category` - 分类，"全部" 或缺省时不过滤
#[tauri::command]
pub fn search_history(
    query: String,
    category: Option<String>,
    store: State<'_, HostStore>,
) -> Result<Vec<HistoryEntry>, String> {
    store.with(|s| history_query::filter_history(s.history(), &query, category.as_deref()))
}

/// 历史记录中出现过的分类（"全部" 在首位）
#[tauri::command]
pub fn history_categories(store: State<'_, HostStore>) -> Result<Vec<String>, String> {
    store.with(|s| history_query::categories(s.history()))
}
