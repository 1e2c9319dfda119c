//! # 应用错误类型
//!
//! 所有用户可见的失败都归入以下五类之一。
//! 服务层返回 `AppError`，Tauri command 层统一转换为 `String` 交给前端展示。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// 未配置 API Key
    #[error("未配置 OpenAI API Key，请在设置中添加或使用 VITE_OPENAI_API_KEY 环境变量")]
    MissingCredential,

    /// 任务描述为空
    #[error("请输入你想要AI帮助完成的任务描述")]
    EmptyInput,

    /// 远程生成调用失败（网络错误、非 2xx 状态码或返回格式错误）
    #[error("{0}")]
    RemoteCall(String),

    /// 检查或下载更新失败
    #[error("{0}")]
    Update(String),

    /// 安装更新失败
    #[error("安装失败: {0}")]
    Install(String),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::RemoteCall(format!("请求 API 失败: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_user_facing() {
        assert!(AppError::MissingCredential.to_string().contains("API Key"));
        assert_eq!(
            AppError::Install("权限不足".into()).to_string(),
            "安装失败: 权限不足"
        );
    }
}
