//! # 数据模型模块
//!
//! 定义了与前端 TypeScript 类型一一对应的 Rust 数据结构。
//! 所有结构体均派生 `Serialize` 和 `Deserialize`，用于 Tauri IPC 传输和 JSON 文件读写。
//! - `settings` - 应用设置及其部分更新
//! - `history` - 生成历史记录
//! - `sync` - 跨窗口同步增量与持久化状态
//! - `update` - 自动更新事件负载

pub mod history;
pub mod settings;
pub mod sync;
pub mod update;
