//! # AI Prompt Generator - Tauri Cargo 构建脚本
//!
//! 在编译主项目之前生成 Tauri 运行时所需的上下文：读取 `tauri.conf.json`、
//! 处理应用图标与 `capabilities/` 权限清单、在 Windows 上生成资源文件。
//!
//! 关闭 `gui` feature 时不需要 Tauri 上下文，脚本不做任何事。

fn main() {
    #[cfg(feature = "gui")]
    tauri_build::build();
}
