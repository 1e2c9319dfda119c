//! # AI Prompt Generator - Tauri 桌面应用原生入口点
//!
//! `main.rs` 仅负责启动应用，插件注册、窗口创建、事件循环等逻辑均在 `lib.rs` 中。

// Prevents additional console window on Windows in release, DO NOT REMOVE!!
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

fn main() {
    app_lib::run();
}
