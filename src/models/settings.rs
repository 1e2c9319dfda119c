//! # 设置数据模型
//!
//! 定义应用设置（AppSettings）及其部分更新（SettingsPatch）。
//!
//! 对应前端 TypeScript 中的 `AppSettings` 接口与 `Partial<AppSettings>`。

use serde::{Deserialize, Serialize};

/// 未在设置中填写 API Key 时读取的环境变量
pub const API_KEY_ENV: &str = "VITE_OPENAI_API_KEY";

/// 提示词生成风格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStyle {
    /// 简洁：200 字以内，直接有效
    Concise,
    /// 详细：结构化、包含角色/任务/输出要求
    Detailed,
    /// 专业：企业级标准
    Professional,
}

/// 界面与提示词语言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Zh,
    En,
}

/// 界面主题
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    Auto,
}

/// 应用设置
///
/// 每个进程一份，更新时按字段整体覆盖。
///
/// 对应前端 TypeScript 接口：
/// ```typescript
/// interface AppSettings {
///   apiKey: string;
///   generationStyle: 'concise' | 'detailed' | 'professional';
///   language: 'zh' | 'en';
///   theme: 'light' | 'dark' | 'auto';
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// API Key：直接作为 Authorization 头发送
    pub api_key: String,

    /// 生成风格，决定使用哪一份系统提示词
    pub generation_style: GenerationStyle,

    /// 语言，决定系统提示词的语言版本
    pub language: Language,

    /// 界面主题（仅前端使用，随设置一起持久化和同步）
    pub theme: Theme,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_key: std::env::var(API_KEY_ENV).unwrap_or_default(),
            generation_style: GenerationStyle::Detailed,
            language: Language::Zh,
            theme: Theme::Light,
        }
    }
}

impl AppSettings {
    /// 逐字段浅合并：补丁中出现的字段覆盖当前值，缺失字段保持不变
    pub fn merge(&mut self, patch: &SettingsPatch) {
        if let Some(api_key) = &patch.api_key {
            self.api_key = api_key.clone();
        }
        if let Some(style) = patch.generation_style {
            self.generation_style = style;
        }
        if let Some(language) = patch.language {
            self.language = language;
        }
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
    }

    /// 将完整设置转换为所有字段都存在的补丁，用于跨窗口广播
    pub fn to_patch(&self) -> SettingsPatch {
        SettingsPatch {
            api_key: Some(self.api_key.clone()),
            generation_style: Some(self.generation_style),
            language: Some(self.language),
            theme: Some(self.theme),
        }
    }
}

/// 设置的部分更新（`Partial<AppSettings>`）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_style: Option<GenerationStyle>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}
