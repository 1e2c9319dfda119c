//! # 历史记录数据模型
//!
//! 对应前端 TypeScript 中的 `GeneratedPrompt` 接口。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// 评分下限
pub const MIN_RATING: u8 = 1;

/// 评分上限
pub const MAX_RATING: u8 = 5;

/// 一条生成记录
///
/// 生成成功后创建，按时间倒序排列（最新在前）。
///
/// 对应前端 TypeScript 接口：
/// ```typescript
/// interface GeneratedPrompt {
///   id: string;
///   userInput: string;
///   generatedPrompt: string;
///   timestamp: Date;
///   category?: string;
///   rating?: number;
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// 唯一标识符（UUID v4）
    pub id: String,

    /// 用户输入的任务描述
    pub user_input: String,

    /// 模型返回的提示词
    pub generated_prompt: String,

    /// 创建时间，序列化为 RFC 3339 字符串（与 JS `Date` 的 JSON 形式一致）
    pub timestamp: DateTime<Utc>,

    /// 关键词分类结果（如 "写作"）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// 用户评分，1–5（读取时任何数值都会被钳制到范围内）
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_rating"
    )]
    pub rating: Option<u8>,
}

/// 新建历史记录时由调用方提供的字段（`Omit<GeneratedPrompt, 'id' | 'timestamp'>`）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHistoryEntry {
    pub user_input: String,
    pub generated_prompt: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub rating: Option<i64>,
}

/// 将任意整数评分钳制到 1–5
pub fn clamp_rating(rating: i64) -> u8 {
    rating.clamp(MIN_RATING as i64, MAX_RATING as i64) as u8
}

/// 按任意 JSON 数值读取评分再钳制，超出 `u8` 的值不会让整条记录解析失败
fn deserialize_rating<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let rating = Option::<f64>::deserialize(deserializer)?;
    Ok(rating.map(|r| clamp_rating(r.round() as i64)))
}

impl HistoryEntry {
    /// 由 NewHistoryEntry 创建完整记录：分配 UUID 和当前时间戳
    pub fn create(new: NewHistoryEntry) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_input: new.user_input,
            generated_prompt: new.generated_prompt,
            timestamp: Utc::now(),
            category: new.category,
            rating: new.rating.map(clamp_rating),
        }
    }
}
