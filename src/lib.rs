//! # AI Prompt Generator - Tauri 应用核心初始化模块
//!
//! 本模块负责 Tauri 应用的完整初始化流程，包括：
//! - 注册 Tauri 官方插件（日志、外链打开、自动更新）
//! - 注册自定义 Tauri commands（共享状态、提示词生成、窗口、更新）
//! - 初始化应用全局状态（宿主存储、同步桥、窗口管理器、生成客户端、更新状态）
//! - 创建主窗口并启动事件循环
//!
//! ## 架构说明
//! 宿主进程是唯一的状态转发点：各窗口修改共享状态后经宿主转发给其他窗口，
//! 宿主同时持有一份权威存储并写入磁盘。
//!
//! ## 模块结构
//! - `commands/` - Tauri command 处理函数与窗口/更新的运行时胶水（需要 `gui` feature）
//! - `models/` - 数据模型（对应前端 TypeScript 类型）
//! - `services/` - 核心业务逻辑（存储、同步、窗口状态、生成、更新状态机）
//! - `config` - 可选的 `config.json` 应用配置
//! - `error` - 用户可见的错误类型
//! - `utils/` - 通用工具函数

#[cfg(feature = "gui")]
mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
mod utils;

#[cfg(feature = "gui")]
use std::sync::Mutex;

#[cfg(feature = "gui")]
use tauri::{Listener, Manager};

#[cfg(feature = "gui")]
use commands::store::HostStore;
#[cfg(feature = "gui")]
use config::AppConfig;
#[cfg(feature = "gui")]
use services::generator::PromptGenerator;
#[cfg(feature = "gui")]
use services::store::PersistedStore;
#[cfg(feature = "gui")]
use services::sync_bridge::SyncBridge;
#[cfg(feature = "gui")]
use services::window_manager::WindowManager;

/// 加载宿主存储，无法定位数据目录时退化为仅内存
#[cfg(feature = "gui")]
fn load_host_store() -> PersistedStore {
    match utils::path::get_storage_path() {
        Ok(path) => PersistedStore::load(path),
        Err(e) => {
            log::error!("{}，历史记录与设置将不会保存", e);
            PersistedStore::in_memory()
        }
    }
}

#[cfg(feature = "gui")]
fn log_plugin<R: tauri::Runtime>() -> tauri::plugin::TauriPlugin<R> {
    use tauri_plugin_log::{Target, TargetKind};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    tauri_plugin_log::Builder::default()
        .clear_targets()
        .target(Target::new(TargetKind::Stdout))
        .target(Target::new(TargetKind::LogDir { file_name: None }))
        .level(level)
        // 更新插件在每次检查时输出大量请求细节
        .level_for("tauri_plugin_updater", log::LevelFilter::Warn)
        .build()
}

// `#[cfg_attr(mobile, tauri::mobile_entry_point)]`：移动端入口标记，
// 桌面端编译时不生效，`run()` 由 `main.rs` 直接调用。
#[cfg(feature = "gui")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
/// Tauri 应用启动函数
///
/// 1. 注册日志与外链插件
/// 2. 初始化全局状态（存储从磁盘加载，配置从 `config.json` 加载）
/// 3. 注册所有自定义 Tauri commands
/// 4. 在 `setup` 钩子中注册更新插件、监听前端事件、创建主窗口、安排自动检查更新
/// 5. 启动事件循环；macOS 上关闭所有窗口后应用保持运行
///
/// # Panics
/// 如果 Tauri 应用启动失败（例如配置文件缺失），将通过 `.expect()` 触发 panic。
pub fn run() {
    let config = AppConfig::load();

    let app = tauri::Builder::default()
        // === 官方插件注册 ===
        .plugin(log_plugin())
        // 设置窗口中的外部链接使用系统浏览器打开
        .plugin(tauri_plugin_opener::init())
        // === 应用全局状态初始化 ===
        .manage(HostStore::new(load_host_store()))
        .manage(SyncBridge::new())
        .manage(Mutex::new(WindowManager::new()))
        .manage(PromptGenerator::new(&config))
        // === 自定义 Tauri Commands 注册 ===
        .invoke_handler(tauri::generate_handler![
            // 共享状态与同步
            commands::store::store_snapshot,
            commands::store::window_ready,
            commands::store::store_update,
            commands::store::update_settings,
            commands::store::add_history,
            commands::store::remove_history,
            commands::store::rate_history,
            commands::store::clear_history,
            commands::store::search_history,
            commands::store::history_categories,
            // 提示词生成
            commands::generate::generate_prompt,
            // 窗口
            commands::window::open_settings,
            // 自动更新
            commands::update::update_check,
            commands::update::update_download,
            commands::update::update_install,
        ])
        .on_window_event(commands::window::handle_window_event)
        .setup(move |app| {
            let handle = app.handle().clone();

            if let Err(e) = app
                .handle()
                .plugin(tauri_plugin_updater::Builder::new().build())
            {
                log::error!("更新插件初始化失败: {}", e);
            }
            app.manage(commands::update::UpdaterState::default());
            commands::update::listen_update_requests(&handle);
            commands::update::spawn_update_schedule(handle.clone(), &config);

            let settings_handle = handle.clone();
            app.listen_any(commands::window::OPEN_SETTINGS_EVENT, move |_| {
                let settings_handle = settings_handle.clone();
                // 与 open_settings command 一样不能在事件回调线程上同步创建窗口
                tauri::async_runtime::spawn(async move {
                    if let Err(e) = commands::window::open_settings_window(&settings_handle) {
                        log::error!("打开设置窗口失败: {}", e);
                    }
                });
            });

            commands::window::create_main_window(&handle)?;
            log::info!("应用已启动");
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(|app_handle, event| {
        // macOS：关闭所有窗口后保持运行，点击 Dock 图标时重新创建主窗口
        #[cfg(target_os = "macos")]
        match event {
            tauri::RunEvent::ExitRequested { api, code, .. } => {
                if code.is_none() {
                    api.prevent_exit();
                }
            }
            tauri::RunEvent::Reopen {
                has_visible_windows,
                ..
            } => {
                if !has_visible_windows {
                    if let Err(e) = commands::window::create_main_window(app_handle) {
                        log::error!("重新创建主窗口失败: {}", e);
                    }
                }
            }
            _ => {}
        }

        #[cfg(not(target_os = "macos"))]
        let _ = (app_handle, event);
    });
}
