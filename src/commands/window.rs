//! # 窗口管理
//!
//! - 启动时创建主窗口，macOS 上点击 Dock 图标且无可见窗口时重新创建
//! - 设置窗口按需创建（`open_settings` command 或 `open-settings` 事件），
//!   已存在时只聚焦
//! - 主窗口关闭时级联关闭设置窗口
//!
//! 窗口的开关状态由 `WindowManager` 决定，这里只负责执行；
//! 同时维护同步桥的窗口注册表。

use std::sync::Mutex;

use tauri::webview::PageLoadEvent;
use tauri::{
    AppHandle, Emitter, Manager, Runtime, WebviewUrl, WebviewWindow, WebviewWindowBuilder, Window,
    WindowEvent,
};

use crate::services::sync_bridge::SyncBridge;
use crate::services::window_manager::{OpenAction, WindowKind, WindowManager, MAIN_WINDOW};

/// 请求打开设置窗口的事件
pub const OPEN_SETTINGS_EVENT: &str = "open-settings";

/// 主页面加载完成后发给主窗口的事件，负载为本地时间字符串
pub const MAIN_PROCESS_MESSAGE_EVENT: &str = "main-process-message";

const MAIN_TITLE: &str = "AI Prompt Generator";
const SETTINGS_TITLE: &str = "个人信息设置";

/// 在锁内访问窗口管理器
///
/// 锁中毒时继续使用内部数据：两个布尔值不存在半更新状态。
fn with_manager<R: Runtime, T>(app: &AppHandle<R>, f: impl FnOnce(&mut WindowManager) -> T) -> T {
    let state = app.state::<Mutex<WindowManager>>();
    let mut manager = state.lock().unwrap_or_else(|e| e.into_inner());
    f(&mut manager)
}

/// 打开主窗口（不存在则创建，存在则聚焦）
pub fn create_main_window<R: Runtime>(app: &AppHandle<R>) -> tauri::Result<()> {
    open_window(app, WindowKind::Main)
}

/// 打开设置窗口（不存在则创建，存在则聚焦）
pub fn open_settings_window<R: Runtime>(app: &AppHandle<R>) -> tauri::Result<()> {
    open_window(app, WindowKind::Settings)
}

fn open_window<R: Runtime>(app: &AppHandle<R>, kind: WindowKind) -> tauri::Result<()> {
    let action = with_manager(app, |m| m.open(kind));

    if action == OpenAction::Focus {
        if let Some(window) = app.get_webview_window(kind.label()) {
            window.show()?;
            window.set_focus()?;
            return Ok(());
        }
        // 状态与实际窗口不一致（例如窗口被外部销毁），按新建处理
        log::warn!("窗口 {} 已记录为打开但不存在，重新创建", kind.label());
    }

    // 先注册：页面可能在 build() 返回前就调用 window_ready
    let bridge = app.state::<SyncBridge>();
    bridge.register(kind.label());

    let result = match kind {
        WindowKind::Main => build_main_window(app),
        WindowKind::Settings => build_settings_window(app),
    };

    match result {
        Ok(_) => {
            log::info!("窗口 {} 已创建", kind.label());
            Ok(())
        }
        Err(e) => {
            log::error!("创建窗口 {} 失败: {}", kind.label(), e);
            bridge.unregister(kind.label());
            with_manager(app, |m| m.creation_failed(kind));
            Err(e)
        }
    }
}

fn build_main_window<R: Runtime>(app: &AppHandle<R>) -> tauri::Result<WebviewWindow<R>> {
    WebviewWindowBuilder::new(app, MAIN_WINDOW, WebviewUrl::App("index.html#/".into()))
        .title(MAIN_TITLE)
        .inner_size(1200.0, 800.0)
        .min_inner_size(800.0, 600.0)
        .on_page_load(|window, payload| {
            if payload.event() != PageLoadEvent::Finished {
                return;
            }
            if let Err(e) = window.set_title(MAIN_TITLE) {
                log::warn!("设置主窗口标题失败: {}", e);
            }
            let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
            if let Err(e) = window.emit_to(window.label(), MAIN_PROCESS_MESSAGE_EVENT, now) {
                log::warn!("发送 {} 失败: {}", MAIN_PROCESS_MESSAGE_EVENT, e);
            }
        })
        .build()
}

fn build_settings_window<R: Runtime>(app: &AppHandle<R>) -> tauri::Result<WebviewWindow<R>> {
    let mut builder = WebviewWindowBuilder::new(
        app,
        WindowKind::Settings.label(),
        WebviewUrl::App("index.html#/settings".into()),
    )
    .title(SETTINGS_TITLE)
    .inner_size(800.0, 600.0)
    .min_inner_size(600.0, 500.0);

    if let Some(main) = app.get_webview_window(MAIN_WINDOW) {
        builder = builder.parent(&main)?;
    }

    builder.build()
}

/// 窗口事件处理：窗口销毁后更新开关状态并注销同步桥
///
/// 主窗口销毁时级联销毁设置窗口。
pub fn handle_window_event<R: Runtime>(window: &Window<R>, event: &WindowEvent) {
    if !matches!(event, WindowEvent::Destroyed) {
        return;
    }

    let label = window.label();
    let app = window.app_handle();
    app.state::<SyncBridge>().unregister(label);
    log::info!("窗口 {} 已关闭", label);

    let Some(kind) = WindowKind::from_label(label) else {
        return;
    };

    let (children, all_closed) = with_manager(app, |m| {
        // 级联销毁的窗口已在主窗口关闭时记为关闭
        if !m.is_open(kind) {
            return (Vec::new(), m.all_closed());
        }
        let children = m.closed(kind);
        (children, m.all_closed())
    });

    for child in children {
        if let Some(child_window) = app.get_webview_window(child.label()) {
            if let Err(e) = child_window.destroy() {
                log::warn!("关闭窗口 {} 失败: {}", child.label(), e);
            }
        }
    }

    if all_closed {
        log::info!("所有窗口已关闭");
    }
}

/// 打开设置窗口
///
/// Windows 上同步 command 中创建窗口会死锁，因此必须是 async。
#[tauri::command]
pub async fn open_settings(app: AppHandle) -> Result<(), String> {
    open_settings_window(&app).map_err(|e| e.to_string())
}
