//! # 提示词生成服务
//!
//! 根据生成风格和语言选择系统提示词，调用 chat-completion 接口，
//! 把用户的一句话描述转换为完整的 AI 提示词。
//!
//! ## 前置校验（不发起网络请求）
//! - API Key 为空 → `AppError::MissingCredential`
//! - 任务描述为空 → `AppError::EmptyInput`
//!
//! ## 远程调用
//! 单次 POST，没有超时和取消，结果完全取决于底层传输。

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::settings::{GenerationStyle, Language};

/// 生成请求
///
/// 对应前端 TypeScript 接口：
/// ```typescript
/// interface GeneratePromptRequest {
///   userInput: string;
///   style: 'concise' | 'detailed' | 'professional';
///   language: 'zh' | 'en';
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub user_input: String,
    pub style: GenerationStyle,
    pub language: Language,
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessageResponse>,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

/// 提示词生成客户端
///
/// 持有复用的 `reqwest::Client`，通过 Tauri `manage()` 注册为应用状态。
pub struct PromptGenerator {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl PromptGenerator {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.api_endpoint.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    /// 生成提示词
    ///
    /// # 参数
    /// - `request` - 用户输入、风格和语言
    /// - `api_key` - 原样作为 `Authorization` 头发送
    ///
    /// # 返回值
    /// 去除首尾空白后的提示词文本
    ///
    /// # 错误
    /// - `MissingCredential` / `EmptyInput`：校验失败，未发起请求
    /// - `RemoteCall`：网络失败、非 2xx 响应或响应格式错误
    pub async fn generate(&self, request: &GenerateRequest, api_key: &str) -> Result<String, AppError> {
        if api_key.trim().is_empty() {
            return Err(AppError::MissingCredential);
        }
        if request.user_input.trim().is_empty() {
            return Err(AppError::EmptyInput);
        }

        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt(request.style, request.language).to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: request.user_input.clone(),
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        log::debug!("发送生成请求: {} (model={})", self.endpoint, self.model);

        let response = self
            .client
            .post(&self.endpoint)
            .headers(build_headers(api_key)?)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body: serde_json::Value = response.json().await.unwrap_or_default();
            let message = error_body
                .pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| format!("API 调用失败: {}", status.as_u16()));
            return Err(AppError::RemoteCall(message));
        }

        let data: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|_| AppError::RemoteCall("API 返回数据格式错误".to_string()))?;

        data.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| AppError::RemoteCall("API 返回数据格式错误".to_string()))
    }
}

fn build_headers(api_key: &str) -> Result<HeaderMap, AppError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(api_key)
            .map_err(|e| AppError::RemoteCall(format!("API Key 格式无效: {}", e)))?,
    );
    Ok(headers)
}

/// 按风格和语言选择系统提示词
pub fn system_prompt(style: GenerationStyle, language: Language) -> &'static str {
    match (language, style) {
        (Language::Zh, GenerationStyle::Concise) => ZH_CONCISE,
        (Language::Zh, GenerationStyle::Detailed) => ZH_DETAILED,
        (Language::Zh, GenerationStyle::Professional) => ZH_PROFESSIONAL,
        (Language::En, GenerationStyle::Concise) => EN_CONCISE,
        (Language::En, GenerationStyle::Detailed) => EN_DETAILED,
        (Language::En, GenerationStyle::Professional) => EN_PROFESSIONAL,
    }
}

const ZH_CONCISE: &str = "你是一个专业的提示词工程师。用户会向你描述他们想要AI帮助完成的任务，你需要将这些描述转换为简洁、有效的AI提示词。

要求：
1. 生成的提示词要简洁明了，直接有效
2. 包含明确的角色设定和任务描述
3. 确保生成的提示词能让AI产生高质量的回答
4. 长度控制在200字以内

请直接输出优化后的提示词，不要包含解释或其他内容。";

const ZH_DETAILED: &str = "你是一个资深的提示词工程专家，擅长将用户的简单描述转换为结构化、专业的AI提示词。

你的任务是根据用户的描述，生成一个详细、专业的AI提示词。生成的提示词应该包含：

1. 角色设定：为AI设定一个专业的身份
2. 任务描述：清晰地说明AI需要完成的任务
3. 输出要求：明确指定输出的格式、风格、长度等
4. 质量标准：确保输出内容的质量和准确性

生成的提示词应该：
- 结构清晰，逻辑性强
- 包含具体的要求和约束
- 能够引导AI产生高质量、有针对性的回答
- 长度适中，既详细又不冗余

请直接输出优化后的提示词，确保其专业性和实用性。";

const ZH_PROFESSIONAL: &str = "你是一位提示词工程领域的专家，具有丰富的企业级AI应用经验。你的专长是将用户的业务需求转换为高效、专业的AI提示词。

请根据用户描述的需求，创建一个企业级标准的AI提示词，要求：

结构要求：
1. 明确的角色定义（包含专业背景和能力）
2. 详细的任务描述（包含背景信息和具体目标）
3. 清晰的输出规范（格式、结构、质量标准）
4. 必要的约束条件（避免的内容、注意事项等）

质量标准：
- 符合企业应用场景的专业性
- 具备可重复性和一致性
- 能够产生标准化的高质量输出
- 包含充分的上下文信息

请生成一个完整、专业的提示词，确保其在企业环境中的有效性和实用性。";

const EN_CONCISE: &str = "You are a professional prompt engineer. Users will describe tasks they want AI to help with, and you need to convert these descriptions into concise, effective AI prompts.

Requirements:
1. Generated prompts should be concise and effective
2. Include clear role setting and task description
3. Ensure the generated prompt can make AI produce high-quality responses
4. Keep length under 200 words

Please output the optimized prompt directly without explanations.";

const EN_DETAILED: &str = "You are a senior prompt engineering expert, skilled at converting users' simple descriptions into structured, professional AI prompts.

Your task is to generate a detailed, professional AI prompt based on the user's description. The generated prompt should include:

1. Role Setting: Set a professional identity for the AI
2. Task Description: Clearly explain what the AI needs to accomplish
3. Output Requirements: Specify the format, style, length, etc. of the output
4. Quality Standards: Ensure the quality and accuracy of the output content

The generated prompt should be:
- Well-structured and logical
- Include specific requirements and constraints
- Guide AI to produce high-quality, targeted responses
- Appropriate length, detailed but not redundant

Please output the optimized prompt directly, ensuring its professionalism and practicality.";

const EN_PROFESSIONAL: &str = "You are an expert in prompt engineering with extensive experience in enterprise-level AI applications. You specialize in converting users' business requirements into efficient, professional AI prompts.

Please create an enterprise-standard AI prompt based on the user's described needs, with requirements:

Structure Requirements:
1. Clear role definition (including professional background and capabilities)
2. Detailed task description (including background information and specific goals)
3. Clear output specifications (format, structure, quality standards)
4. Necessary constraints (content to avoid, considerations, etc.)

Quality Standards:
- Professional quality suitable for enterprise application scenarios
- Repeatability and consistency
- Ability to produce standardized high-quality outputs
- Include sufficient contextual information

Please generate a complete, professional prompt that ensures effectiveness and practicality in enterprise environments.";
