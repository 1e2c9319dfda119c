//! # 提示词生成 Tauri Command
//!
//! `generate_prompt` 使用宿主存储中的设置（API Key、风格、语言）调用补全接口，
//! 成功后写入一条历史记录并同步到其他窗口。

use serde::Serialize;
use tauri::{AppHandle, State, WebviewWindow};

use crate::commands::store::{relay, HostStore};
use crate::models::history::{HistoryEntry, NewHistoryEntry};
use crate::models::settings::{GenerationStyle, Language};
use crate::services::category::detect_category;
use crate::services::generator::{GenerateRequest, PromptGenerator};
use crate::services::sync_bridge::SyncBridge;

/// 生成结果
///
/// 对应前端 TypeScript 接口：
/// ```typescript
/// interface GeneratePromptResponse {
///   success: boolean;
///   prompt?: string;
///   error?: string;
///   entry?: GeneratedPrompt;
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResult {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// 成功时写入历史的记录
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<HistoryEntry>,
}

/// 生成提示词
///
/// # 参数
/// - `user_input` - 任务描述
/// - `style` / `language` - 缺省时使用当前设置
///
/// # 返回值
/// 失败也通过 `success: false` + `error` 返回，不走 `Err`，
/// 前端可以直接展示错误文案
#[tauri::command]
pub async fn generate_prompt(
    app: AppHandle,
    window: WebviewWindow,
    user_input: String,
    style: Option<GenerationStyle>,
    language: Option<Language>,
    store: State<'_, HostStore>,
    bridge: State<'_, SyncBridge>,
    generator: State<'_, PromptGenerator>,
) -> Result<GenerateResult, String> {
    let settings = store.with(|s| s.settings().clone())?;
    let request = GenerateRequest {
        user_input,
        style: style.unwrap_or(settings.generation_style),
        language: language.unwrap_or(settings.language),
    };

    let prompt = match generator.generate(&request, &settings.api_key).await {
        Ok(prompt) => prompt,
        Err(e) => {
            log::warn!("生成提示词失败: {}", e);
            return Ok(GenerateResult {
                success: false,
                prompt: None,
                error: Some(e.to_string()),
                entry: None,
            });
        }
    };

    let category = detect_category(&request.user_input);
    let (entry, update) = store.with(|s| {
        s.add_to_history(NewHistoryEntry {
            user_input: request.user_input.clone(),
            generated_prompt: prompt.clone(),
            category: Some(category.to_string()),
            rating: None,
        })
    })?;
    // 调用窗口从返回值拿到新记录，只同步给其他窗口
    relay(&app, &bridge, window.label(), &update);
    log::info!("提示词已生成，分类: {}", category);

    Ok(GenerateResult {
        success: true,
        prompt: Some(prompt),
        error: None,
        entry: Some(entry),
    })
}
