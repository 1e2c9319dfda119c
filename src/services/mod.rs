//! # 业务逻辑服务模块
//!
//! 包含核心业务逻辑的实现，与 Tauri command 层解耦，不依赖运行时即可测试：
//! - `store` - 持久化存储：设置 + 历史记录（上限 100 条）
//! - `sync_bridge` - 跨窗口同步桥：把状态增量转发给其他窗口
//! - `window_manager` - 主窗口/设置窗口的开关状态
//! - `generator` - 调用补全接口生成提示词
//! - `category` - 按关键词给任务分类
//! - `history_query` - 历史记录搜索与分类筛选
//! - `updater` - 自动更新状态机
//! - `installer` - macOS 下替换 `.app` 资源目录的自定义安装

pub mod category;
pub mod generator;
pub mod history_query;
pub mod installer;
pub mod store;
pub mod sync_bridge;
pub mod updater;
pub mod window_manager;
