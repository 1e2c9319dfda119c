//! # 自动更新状态机
//!
//! ```text
//! idle → checking → available → downloading → downloaded → installing
//!                 ↘ not-available
//!        (任意状态) → error
//! ```
//!
//! 每次合法迁移产生一条发往前端的通知（`update:*` 事件）；
//! 非法迁移返回 `AppError::Update`，状态保持不变。
//! `installing` 没有对应的事件通道，进入该状态时不产生通知。
//!
//! 实际的检查、下载、安装由 command 层通过 `tauri-plugin-updater` 完成，
//! 这里只负责状态与通知，便于脱离运行时测试。

use serde::Serialize;

use crate::error::AppError;
use crate::models::update::{ProgressInfo, UpdateInfo};

pub const UPDATE_CHECKING_EVENT: &str = "update:checking";
pub const UPDATE_AVAILABLE_EVENT: &str = "update:available";
pub const UPDATE_NOT_AVAILABLE_EVENT: &str = "update:not-available";
pub const UPDATE_ERROR_EVENT: &str = "update:error";
pub const UPDATE_PROGRESS_EVENT: &str = "update:progress";
pub const UPDATE_DOWNLOADED_EVENT: &str = "update:downloaded";

/// 更新流程所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdatePhase {
    Idle,
    Checking,
    Available,
    NotAvailable,
    Downloading,
    Downloaded,
    Installing,
    Error,
}

impl UpdatePhase {
    /// 下载或安装进行中，此时不应再次检查
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            UpdatePhase::Checking
                | UpdatePhase::Downloading
                | UpdatePhase::Downloaded
                | UpdatePhase::Installing
        )
    }
}

/// 发往前端的更新通知
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateNotice {
    Checking,
    Available(UpdateInfo),
    NotAvailable,
    Progress(ProgressInfo),
    Downloaded(UpdateInfo),
    Error(String),
}

impl UpdateNotice {
    /// 通知对应的事件名
    pub fn event(&self) -> &'static str {
        match self {
            UpdateNotice::Checking => UPDATE_CHECKING_EVENT,
            UpdateNotice::Available(_) => UPDATE_AVAILABLE_EVENT,
            UpdateNotice::NotAvailable => UPDATE_NOT_AVAILABLE_EVENT,
            UpdateNotice::Progress(_) => UPDATE_PROGRESS_EVENT,
            UpdateNotice::Downloaded(_) => UPDATE_DOWNLOADED_EVENT,
            UpdateNotice::Error(_) => UPDATE_ERROR_EVENT,
        }
    }

    /// 事件负载
    pub fn payload(&self) -> serde_json::Value {
        match self {
            UpdateNotice::Checking | UpdateNotice::NotAvailable => serde_json::Value::Null,
            UpdateNotice::Available(info) | UpdateNotice::Downloaded(info) => {
                serde_json::to_value(info).unwrap_or_default()
            }
            UpdateNotice::Progress(progress) => serde_json::to_value(progress).unwrap_or_default(),
            UpdateNotice::Error(message) => serde_json::Value::String(message.clone()),
        }
    }
}

/// 更新状态跟踪器
#[derive(Debug)]
pub struct UpdateTracker {
    phase: UpdatePhase,
    info: Option<UpdateInfo>,
}

impl Default for UpdateTracker {
    fn default() -> Self {
        Self {
            phase: UpdatePhase::Idle,
            info: None,
        }
    }
}

impl UpdateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> UpdatePhase {
        self.phase
    }

    /// 最近一次发现的可用更新
    pub fn info(&self) -> Option<&UpdateInfo> {
        self.info.as_ref()
    }

    pub fn begin_check(&mut self) -> Result<UpdateNotice, AppError> {
        self.require_phase(
            &[
                UpdatePhase::Idle,
                UpdatePhase::Available,
                UpdatePhase::NotAvailable,
                UpdatePhase::Error,
            ],
            "检查更新",
        )?;
        self.phase = UpdatePhase::Checking;
        Ok(UpdateNotice::Checking)
    }

    pub fn found(&mut self, info: UpdateInfo) -> Result<UpdateNotice, AppError> {
        self.require_phase(&[UpdatePhase::Checking], "发现更新")?;
        self.phase = UpdatePhase::Available;
        self.info = Some(info.clone());
        Ok(UpdateNotice::Available(info))
    }

    pub fn not_found(&mut self) -> Result<UpdateNotice, AppError> {
        self.require_phase(&[UpdatePhase::Checking], "没有可用更新")?;
        self.phase = UpdatePhase::NotAvailable;
        self.info = None;
        Ok(UpdateNotice::NotAvailable)
    }

    pub fn begin_download(&mut self) -> Result<(), AppError> {
        self.require_phase(&[UpdatePhase::Available], "下载更新")?;
        self.phase = UpdatePhase::Downloading;
        Ok(())
    }

    /// 下载进度不改变状态，只在下载中产生通知
    pub fn progress(&self, progress: ProgressInfo) -> Option<UpdateNotice> {
        (self.phase == UpdatePhase::Downloading).then_some(UpdateNotice::Progress(progress))
    }

    pub fn downloaded(&mut self) -> Result<UpdateNotice, AppError> {
        self.require_phase(&[UpdatePhase::Downloading], "下载完成")?;
        let info = self
            .info
            .clone()
            .ok_or_else(|| AppError::Update("缺少更新信息".to_string()))?;
        self.phase = UpdatePhase::Downloaded;
        Ok(UpdateNotice::Downloaded(info))
    }

    pub fn begin_install(&mut self) -> Result<(), AppError> {
        self.require_phase(&[UpdatePhase::Downloaded], "安装更新")?;
        self.phase = UpdatePhase::Installing;
        Ok(())
    }

    /// 任意状态都可以进入 error
    pub fn fail(&mut self, message: impl Into<String>) -> UpdateNotice {
        self.phase = UpdatePhase::Error;
        UpdateNotice::Error(message.into())
    }

    fn require_phase(&self, allowed: &[UpdatePhase], action: &str) -> Result<(), AppError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(AppError::Update(format!(
                "当前状态 {:?} 下无法{}",
                self.phase, action
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> UpdateInfo {
        UpdateInfo {
            version: "0.4.0".into(),
            current_version: "0.3.0".into(),
            release_notes: None,
        }
    }

    #[test]
    fn test_full_happy_path_emits_one_notice_per_step() {
        let mut tracker = UpdateTracker::new();
        assert_eq!(tracker.begin_check().unwrap().event(), UPDATE_CHECKING_EVENT);
        assert_eq!(tracker.found(info()).unwrap().event(), UPDATE_AVAILABLE_EVENT);
        tracker.begin_download().unwrap();

        let progress = ProgressInfo::compute(5, 5, Some(10), 1.0);
        let notice = tracker.progress(progress).unwrap();
        assert_eq!(notice.event(), UPDATE_PROGRESS_EVENT);
        assert_eq!(notice.payload()["percent"], 50.0);

        let notice = tracker.downloaded().unwrap();
        assert_eq!(notice.event(), UPDATE_DOWNLOADED_EVENT);
        assert_eq!(notice.payload()["version"], "0.4.0");

        tracker.begin_install().unwrap();
        assert_eq!(tracker.phase(), UpdatePhase::Installing);
    }

    #[test]
    fn test_install_keeps_found_version() {
        let mut tracker = UpdateTracker::new();
        assert!(tracker.info().is_none());
        tracker.begin_check().unwrap();
        tracker.found(info()).unwrap();
        tracker.begin_download().unwrap();
        tracker.downloaded().unwrap();
        tracker.begin_install().unwrap();
        assert_eq!(tracker.info().map(|i| i.version.as_str()), Some("0.4.0"));
    }

    #[test]
    fn test_not_available_allows_recheck() {
        let mut tracker = UpdateTracker::new();
        tracker.begin_check().unwrap();
        assert_eq!(tracker.not_found().unwrap(), UpdateNotice::NotAvailable);
        assert!(tracker.begin_check().is_ok());
    }

    #[test]
    fn test_illegal_transitions_are_rejected() {
        let mut tracker = UpdateTracker::new();
        assert!(matches!(tracker.begin_download(), Err(AppError::Update(_))));
        assert!(tracker.begin_install().is_err());
        assert!(tracker.downloaded().is_err());
        assert_eq!(tracker.phase(), UpdatePhase::Idle);

        tracker.begin_check().unwrap();
        // 检查进行中不能重复检查
        assert!(tracker.begin_check().is_err());
        assert!(tracker.phase().is_busy());
    }

    #[test]
    fn test_progress_ignored_outside_download() {
        let tracker = UpdateTracker::new();
        assert!(tracker.progress(ProgressInfo::compute(1, 1, None, 1.0)).is_none());
    }

    #[test]
    fn test_error_from_any_phase_then_recheck() {
        let mut tracker = UpdateTracker::new();
        tracker.begin_check().unwrap();
        tracker.found(info()).unwrap();
        tracker.begin_download().unwrap();

        let notice = tracker.fail("网络中断");
        assert_eq!(notice.event(), UPDATE_ERROR_EVENT);
        assert_eq!(notice.payload(), serde_json::json!("网络中断"));
        assert_eq!(tracker.phase(), UpdatePhase::Error);
        assert!(tracker.begin_check().is_ok());
    }
}
