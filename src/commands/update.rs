//! # 自动更新 Tauri Commands
//!
//! 通过 `tauri-plugin-updater` 完成检查、下载和安装，状态迁移交给
//! `UpdateTracker`，每次迁移产生的通知发给主窗口（`update:*` 事件）。
//!
//! - 启动后延迟一段时间自动检查，之后按固定间隔重新检查（开发模式跳过）
//! - 下载和安装只在用户请求时进行（`update_download` / `update_install`
//!   command，或同名的 `update:download` / `update:install` 事件）
//! - macOS 上 ZIP 格式的更新包走自定义安装（替换 `Resources`），
//!   其余情况使用插件自带的安装流程，安装后重启

use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use tauri::{AppHandle, Emitter, Listener, Manager, Runtime};
use tauri_plugin_updater::{Update, UpdaterExt};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::update::{ProgressInfo, UpdateInfo};
use crate::services::updater::{UpdateNotice, UpdateTracker};
use crate::services::window_manager::MAIN_WINDOW;

/// 前端请求检查更新的事件
pub const UPDATE_CHECK_EVENT: &str = "update:check";
/// 前端请求下载更新的事件
pub const UPDATE_DOWNLOAD_EVENT: &str = "update:download";
/// 前端请求安装更新的事件
pub const UPDATE_INSTALL_EVENT: &str = "update:install";

/// 更新流程的运行时状态
#[derive(Default)]
pub struct UpdaterState {
    tracker: Mutex<UpdateTracker>,
    /// 最近一次检查发现的更新
    pending: Mutex<Option<Update>>,
    /// 已下载完成的更新包
    package: Mutex<Option<Vec<u8>>>,
}

/// 锁中毒时继续使用内部数据
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// 把通知发给主窗口，主窗口不存在时只记录日志
fn notify<R: Runtime>(app: &AppHandle<R>, notice: &UpdateNotice) {
    if let Err(e) = app.emit_to(MAIN_WINDOW, notice.event(), notice.payload()) {
        log::debug!("发送 {} 失败: {}", notice.event(), e);
    }
}

/// 标记失败并通知前端
fn report_failure<R: Runtime>(app: &AppHandle<R>, state: &UpdaterState, error: &AppError) {
    log::error!("{}", error);
    let notice = lock(&state.tracker).fail(error.to_string());
    notify(app, &notice);
}

/// 检查更新
///
/// # 返回值
/// 有新版本时返回其信息，否则返回 None
///
/// # 错误
/// 当前状态不允许检查（下载/安装中），或检查请求失败
pub async fn check_for_updates<R: Runtime>(
    app: &AppHandle<R>,
) -> Result<Option<UpdateInfo>, AppError> {
    let state = app.state::<UpdaterState>();
    let notice = lock(&state.tracker).begin_check()?;
    notify(app, &notice);
    log::info!("开始检查更新");

    let checked = match app.updater() {
        Ok(updater) => updater.check().await,
        Err(e) => Err(e),
    };

    match checked {
        Ok(Some(update)) => {
            let info = UpdateInfo {
                version: update.version.clone(),
                current_version: update.current_version.clone(),
                release_notes: update.body.clone(),
            };
            log::info!("发现新版本: {} -> {}", info.current_version, info.version);
            *lock(&state.pending) = Some(update);
            let notice = lock(&state.tracker).found(info.clone())?;
            notify(app, &notice);
            Ok(Some(info))
        }
        Ok(None) => {
            log::info!("当前已是最新版本");
            *lock(&state.pending) = None;
            let notice = lock(&state.tracker).not_found()?;
            notify(app, &notice);
            Ok(None)
        }
        Err(e) => {
            let error = AppError::Update(format!("检查更新失败: {}", e));
            report_failure(app, &state, &error);
            Err(error)
        }
    }
}

/// 下载最近一次检查发现的更新，期间持续发送 `update:progress`
pub async fn download_update<R: Runtime>(app: &AppHandle<R>) -> Result<(), AppError> {
    let state = app.state::<UpdaterState>();
    let update = lock(&state.pending)
        .clone()
        .ok_or_else(|| AppError::Update("没有可下载的更新".to_string()))?;
    lock(&state.tracker).begin_download()?;
    log::info!("开始下载更新 {}", update.version);

    let started = Instant::now();
    let mut transferred: u64 = 0;
    let downloaded = update
        .download(
            |chunk, total| {
                transferred += chunk as u64;
                let progress = ProgressInfo::compute(
                    chunk as u64,
                    transferred,
                    total,
                    started.elapsed().as_secs_f64(),
                );
                let notice = lock(&state.tracker).progress(progress);
                if let Some(notice) = notice {
                    notify(app, &notice);
                }
            },
            || log::info!("更新包下载完成"),
        )
        .await;

    match downloaded {
        Ok(bytes) => {
            *lock(&state.package) = Some(bytes);
            let notice = lock(&state.tracker).downloaded()?;
            notify(app, &notice);
            Ok(())
        }
        Err(e) => {
            let error = AppError::Update(format!("下载更新失败: {}", e));
            report_failure(app, &state, &error);
            Err(error)
        }
    }
}

/// 安装已下载的更新并重启应用
///
/// 成功时不会返回。
pub fn install_update<R: Runtime>(app: &AppHandle<R>) -> Result<(), AppError> {
    let state = app.state::<UpdaterState>();
    let version = {
        let mut tracker = lock(&state.tracker);
        tracker.begin_install()?;
        tracker.info().map(|info| info.version.clone())
    };
    log::info!("开始安装更新 {}", version.as_deref().unwrap_or("unknown"));

    let update = lock(&state.pending).clone();
    let package = lock(&state.package).take();
    let installed = match (update, package) {
        (Some(update), Some(bytes)) => install_package(&update, &bytes),
        _ => Err(AppError::Install("缺少已下载的更新包".to_string())),
    };

    match installed {
        Ok(()) => {
            log::info!("更新已安装，重启应用");
            app.restart()
        }
        Err(error) => {
            report_failure(app, &state, &error);
            Err(error)
        }
    }
}

/// ZIP 文件头
#[cfg(target_os = "macos")]
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

#[cfg(target_os = "macos")]
fn install_package(update: &Update, bytes: &[u8]) -> Result<(), AppError> {
    if !bytes.starts_with(ZIP_MAGIC) {
        return update
            .install(bytes)
            .map_err(|e| AppError::Install(e.to_string()));
    }

    let download_dir = std::env::temp_dir().join("ai-prompt-gen-update");
    std::fs::create_dir_all(&download_dir)
        .map_err(|e| AppError::Install(format!("创建下载目录失败: {}", e)))?;
    let zip_path = download_dir.join(format!("ai-prompt-gen-{}.zip", update.version));
    std::fs::write(&zip_path, bytes)
        .map_err(|e| AppError::Install(format!("写入更新包失败: {}", e)))?;

    let app_path = std::env::current_exe()
        .map_err(|e| AppError::Install(format!("无法获取应用路径: {}", e)))?;
    crate::services::installer::install_from_archive(&zip_path, &app_path)?;
    Ok(())
}

#[cfg(not(target_os = "macos"))]
fn install_package(update: &Update, bytes: &[u8]) -> Result<(), AppError> {
    update
        .install(bytes)
        .map_err(|e| AppError::Install(e.to_string()))
}

/// 启动自动检查：延迟后检查一次，之后按间隔重新检查
///
/// 开发模式下不检查；下载或安装进行中时跳过本轮。
pub fn spawn_update_schedule<R: Runtime>(app: AppHandle<R>, config: &AppConfig) {
    if cfg!(debug_assertions) {
        log::info!("开发模式，跳过自动检查更新");
        return;
    }

    let delay = config.update_check_delay();
    let interval = config.update_recheck_interval();
    tauri::async_runtime::spawn(async move {
        tokio::time::sleep(delay).await;
        loop {
            let busy = lock(&app.state::<UpdaterState>().tracker).phase().is_busy();
            if busy {
                log::debug!("更新流程进行中，跳过本轮自动检查");
            } else if let Err(e) = check_for_updates(&app).await {
                log::warn!("自动检查更新失败: {}", e);
            }

            match interval {
                Some(interval) => tokio::time::sleep(interval).await,
                None => break,
            }
        }
    });
}

/// 监听前端通过事件发出的更新请求
pub fn listen_update_requests<R: Runtime>(app: &AppHandle<R>) {
    let handle = app.clone();
    app.listen_any(UPDATE_CHECK_EVENT, move |_| {
        let handle = handle.clone();
        tauri::async_runtime::spawn(async move {
            if let Err(e) = check_for_updates(&handle).await {
                log::warn!("检查更新失败: {}", e);
            }
        });
    });

    let handle = app.clone();
    app.listen_any(UPDATE_DOWNLOAD_EVENT, move |_| {
        let handle = handle.clone();
        tauri::async_runtime::spawn(async move {
            if let Err(e) = download_update(&handle).await {
                log::warn!("下载更新失败: {}", e);
            }
        });
    });

    let handle = app.clone();
    app.listen_any(UPDATE_INSTALL_EVENT, move |_| {
        let handle = handle.clone();
        tauri::async_runtime::spawn(async move {
            if let Err(e) = install_update(&handle) {
                log::warn!("安装更新失败: {}", e);
            }
        });
    });
}

/// 手动检查更新
#[tauri::command]
pub async fn update_check(app: AppHandle) -> Result<Option<UpdateInfo>, String> {
    check_for_updates(&app).await.map_err(|e| e.to_string())
}

/// 下载更新
#[tauri::command]
pub async fn update_download(app: AppHandle) -> Result<(), String> {
    download_update(&app).await.map_err(|e| e.to_string())
}

/// 安装更新并重启
#[tauri::command]
pub async fn update_install(app: AppHandle) -> Result<(), String> {
    install_update(&app).map_err(|e| e.to_string())
}
