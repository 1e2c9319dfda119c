//! # Tauri Command 处理模块
//!
//! 本模块包含所有注册到 Tauri 的 command 处理函数以及窗口/更新的运行时胶水代码。
//! 每个子模块对应一个功能域：
//! - `store` - 共享状态的读写与跨窗口同步
//! - `generate` - 提示词生成
//! - `window` - 主窗口/设置窗口的创建、聚焦与级联关闭
//! - `update` - 自动更新的检查、下载与安装

pub mod generate;
pub mod store;
pub mod update;
pub mod window;
