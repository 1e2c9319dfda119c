//! # 窗口生命周期管理
//!
//! 只跟踪两件事：主窗口是否存在、设置窗口是否存在。
//! 真正的窗口创建/聚焦/关闭由 command 层根据这里返回的动作执行。
//!
//! | 操作 | 结果 |
//! |------|------|
//! | 打开主窗口 | 不存在则创建，存在则聚焦 |
//! | 打开设置窗口 | 不存在则创建，存在则聚焦（不会重复创建） |
//! | 主窗口关闭 | 级联关闭设置窗口 |
//! | 设置窗口关闭 | 仅自身 |

use serde::Serialize;

/// 主窗口标签
pub const MAIN_WINDOW: &str = "main";

/// 设置窗口标签
pub const SETTINGS_WINDOW: &str = "settings";

/// 窗口种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    Main,
    Settings,
}

impl WindowKind {
    pub fn label(self) -> &'static str {
        match self {
            WindowKind::Main => MAIN_WINDOW,
            WindowKind::Settings => SETTINGS_WINDOW,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            MAIN_WINDOW => Some(WindowKind::Main),
            SETTINGS_WINDOW => Some(WindowKind::Settings),
            _ => None,
        }
    }
}

/// 打开窗口请求的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAction {
    /// 需要新建窗口
    Create,
    /// 窗口已存在，聚焦即可
    Focus,
}

/// 窗口存在状态
#[derive(Debug, Default)]
pub struct WindowManager {
    main_open: bool,
    settings_open: bool,
}

impl WindowManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self, kind: WindowKind) -> bool {
        match kind {
            WindowKind::Main => self.main_open,
            WindowKind::Settings => self.settings_open,
        }
    }

    /// 请求打开窗口，返回应执行的动作并把窗口记为存在
    pub fn open(&mut self, kind: WindowKind) -> OpenAction {
        let slot = match kind {
            WindowKind::Main => &mut self.main_open,
            WindowKind::Settings => &mut self.settings_open,
        };
        if *slot {
            OpenAction::Focus
        } else {
            *slot = true;
            OpenAction::Create
        }
    }

    /// 窗口创建失败时回滚状态
    pub fn creation_failed(&mut self, kind: WindowKind) {
        match kind {
            WindowKind::Main => self.main_open = false,
            WindowKind::Settings => self.settings_open = false,
        }
    }

    /// 窗口已关闭
    ///
    /// # 返回值
    /// 需要级联关闭的其他窗口（主窗口关闭时包含仍然打开的设置窗口）
    pub fn closed(&mut self, kind: WindowKind) -> Vec<WindowKind> {
        match kind {
            WindowKind::Main => {
                self.main_open = false;
                if self.settings_open {
                    self.settings_open = false;
                    vec![WindowKind::Settings]
                } else {
                    vec![]
                }
            }
            WindowKind::Settings => {
                self.settings_open = false;
                vec![]
            }
        }
    }

    /// 是否所有窗口都已关闭
    pub fn all_closed(&self) -> bool {
        !self.main_open && !self.settings_open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_window_is_reused() {
        let mut manager = WindowManager::new();
        assert_eq!(manager.open(WindowKind::Main), OpenAction::Create);
        assert_eq!(manager.open(WindowKind::Settings), OpenAction::Create);
        assert_eq!(manager.open(WindowKind::Settings), OpenAction::Focus);
        assert!(manager.is_open(WindowKind::Settings));
    }

    #[test]
    fn test_closing_main_cascades() {
        let mut manager = WindowManager::new();
        manager.open(WindowKind::Main);
        manager.open(WindowKind::Settings);

        assert_eq!(manager.closed(WindowKind::Main), vec![WindowKind::Settings]);
        assert!(manager.all_closed());

        // 级联关闭后设置窗口再次触发的关闭事件不产生额外动作
        assert!(manager.closed(WindowKind::Settings).is_empty());
    }

    #[test]
    fn test_closing_settings_keeps_main() {
        let mut manager = WindowManager::new();
        manager.open(WindowKind::Main);
        manager.open(WindowKind::Settings);

        assert!(manager.closed(WindowKind::Settings).is_empty());
        assert!(manager.is_open(WindowKind::Main));
        assert_eq!(manager.open(WindowKind::Settings), OpenAction::Create);
    }

    #[test]
    fn test_destroy_after_cascade_is_ignored() {
        let mut manager = WindowManager::new();
        manager.open(WindowKind::Main);
        manager.open(WindowKind::Settings);
        manager.closed(WindowKind::Main);

        // 级联销毁的设置窗口随后送达的销毁事件
        assert!(!manager.is_open(WindowKind::Settings));
        assert!(manager.all_closed());

        // 之后重新打开的主窗口不受影响
        assert_eq!(manager.open(WindowKind::Main), OpenAction::Create);
        assert!(!manager.all_closed());
    }

    #[test]
    fn test_creation_failure_rolls_back() {
        let mut manager = WindowManager::new();
        manager.open(WindowKind::Settings);
        manager.creation_failed(WindowKind::Settings);
        assert_eq!(manager.open(WindowKind::Settings), OpenAction::Create);
    }

    #[test]
    fn test_label_roundtrip() {
        for kind in [WindowKind::Main, WindowKind::Settings] {
            assert_eq!(WindowKind::from_label(kind.label()), Some(kind));
        }
        assert_eq!(WindowKind::from_label("region_capture"), None);
    }
}
