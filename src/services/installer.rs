//! # macOS 自定义安装
//!
//! 用下载好的 ZIP 更新包原地替换 `.app` 包内的 `Contents/Resources` 目录：
//! 1. 从当前可执行文件路径中定位 `.app` 包与安装目录
//! 2. 把 ZIP 解压到下载目录
//! 3. 删除旧的 `Resources`
//! 4. 把新包中的 `Resources` 移动到原位置
//!
//! 没有原子性保证，也没有回滚：第 3、4 步之间失败会导致安装损坏，只记录日志并返回
//! `AppError::Install`。重启由调用方负责。

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::AppError;

/// 匹配路径中的 `.app` 包名（如 `AI Prompt Generator.app`）
static APP_BUNDLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^/]+\.app)(?:/|$)").unwrap());

/// `.app` 包的位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleLocation {
    /// `.app` 所在目录（如 `/Applications`）
    pub install_dir: PathBuf,
    /// 包名（如 `AI Prompt Generator.app`）
    pub app_file: String,
}

impl BundleLocation {
    /// 完整安装路径
    pub fn install_path(&self) -> PathBuf {
        self.install_dir.join(&self.app_file)
    }

    pub fn resources_path(&self) -> PathBuf {
        self.install_path().join("Contents").join("Resources")
    }
}

/// 从应用内部任意路径定位 `.app` 包
///
/// 例如 `/Applications/AI Prompt Generator.app/Contents/MacOS/ai-prompt-gen`
/// → 安装目录 `/Applications`，包名 `AI Prompt Generator.app`
pub fn locate_bundle(app_path: &Path) -> Result<BundleLocation, AppError> {
    let path_str = app_path.to_string_lossy();
    let captures = APP_BUNDLE_RE
        .captures(&path_str)
        .ok_or_else(|| AppError::Install("无法提取应用名称".to_string()))?;
    let bundle = captures
        .get(1)
        .ok_or_else(|| AppError::Install("无法提取应用名称".to_string()))?;

    let app_file = bundle.as_str().to_string();
    let install_dir = PathBuf::from(&path_str[..bundle.start()]);

    Ok(BundleLocation {
        install_dir,
        app_file,
    })
}

/// 解压 ZIP 到目标目录（覆盖同名文件）
pub fn extract_archive(zip_path: &Path, destination: &Path) -> Result<(), AppError> {
    log::info!("开始解压: {} 到 {}", zip_path.display(), destination.display());

    let file = File::open(zip_path)
        .map_err(|e| AppError::Install(format!("打开更新包失败: {}", e)))?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| AppError::Install(format!("读取更新包失败: {}", e)))?;
    archive
        .extract(destination)
        .map_err(|e| AppError::Install(format!("解压失败: {}", e)))?;

    log::info!("解压完成");
    Ok(())
}

/// 用下载目录中新包的 `Resources` 替换已安装包的 `Resources`
pub fn replace_resources(location: &BundleLocation, download_dir: &Path) -> Result<(), AppError> {
    let old_resources = location.resources_path();
    let new_resources = download_dir
        .join(&location.app_file)
        .join("Contents")
        .join("Resources");

    if !new_resources.exists() {
        return Err(AppError::Install(format!(
            "更新包中缺少 Resources 目录: {}",
            new_resources.display()
        )));
    }

    log::info!(
        "替换 Resources 目录: {} -> {}",
        new_resources.display(),
        old_resources.display()
    );

    if old_resources.exists() {
        std::fs::remove_dir_all(&old_resources)
            .map_err(|e| AppError::Install(format!("删除旧 Resources 失败: {}", e)))?;
    }

    if let Err(e) = std::fs::rename(&new_resources, &old_resources) {
        // rename 不能跨文件系统，退回逐个复制
        log::warn!("移动 Resources 失败，改为复制: {}", e);
        copy_dir_all(&new_resources, &old_resources)
            .map_err(|e| AppError::Install(format!("移动新 Resources 失败: {}", e)))?;
    }

    Ok(())
}

/// 完整安装流程：定位、解压、替换
///
/// # 参数
/// - `zip_path` - 下载完成的 ZIP 更新包
/// - `app_path` - 当前运行程序在 `.app` 包内的路径
///
/// # 返回值
/// 被替换的 `.app` 完整路径
pub fn install_from_archive(zip_path: &Path, app_path: &Path) -> Result<PathBuf, AppError> {
    log::info!("开始自定义 macOS 安装, 当前应用路径: {}", app_path.display());

    let location = locate_bundle(app_path)?;
    let download_dir = zip_path
        .parent()
        .ok_or_else(|| AppError::Install("无法确定下载目录".to_string()))?;

    let result = extract_archive(zip_path, download_dir)
        .and_then(|_| replace_resources(&location, download_dir));

    match result {
        Ok(()) => {
            log::info!("安装完成: {}", location.install_path().display());
            Ok(location.install_path())
        }
        Err(e) => {
            log::error!("macOS 自定义安装失败: {}", e);
            Err(e)
        }
    }
}

fn copy_dir_all(from: &Path, to: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(to)?;
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
