//! # 自动更新事件负载
//!
//! 通过 `update:*` 事件发送给前端的数据结构，
//! 字段命名与前端原先使用的 `UpdateInfo` / `ProgressInfo` 保持一致。

use serde::{Deserialize, Serialize};

/// 可用更新包的描述信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInfo {
    /// 远端最新版本号
    pub version: String,

    /// 当前运行版本号
    pub current_version: String,

    /// 更新说明
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_notes: Option<String>,
}

/// 下载进度
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressInfo {
    /// 本次回调新增的字节数
    pub delta: u64,

    /// 已下载字节数
    pub transferred: u64,

    /// 总字节数（服务端未返回 Content-Length 时为 None）
    pub total: Option<u64>,

    /// 百分比 0–100，总大小未知时为 0
    pub percent: f64,

    /// 平均下载速度
    pub bytes_per_second: u64,
}

impl ProgressInfo {
    /// 根据累计字节数和耗时计算进度
    pub fn compute(delta: u64, transferred: u64, total: Option<u64>, elapsed_secs: f64) -> Self {
        let percent = match total {
            Some(total) if total > 0 => (transferred as f64 / total as f64 * 100.0).min(100.0),
            _ => 0.0,
        };
        let bytes_per_second = if elapsed_secs > 0.0 {
            (transferred as f64 / elapsed_secs) as u64
        } else {
            0
        };
        Self {
            delta,
            transferred,
            total,
            percent,
            bytes_per_second,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percent() {
        let p = ProgressInfo::compute(10, 50, Some(200), 2.0);
        assert_eq!(p.percent, 25.0);
        assert_eq!(p.bytes_per_second, 25);

        let unknown = ProgressInfo::compute(10, 50, None, 0.0);
        assert_eq!(unknown.percent, 0.0);
        assert_eq!(unknown.bytes_per_second, 0);
    }
}
