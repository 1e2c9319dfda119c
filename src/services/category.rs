//! # 任务分类器
//!
//! 根据关键词把用户输入归入一个分类，结果写入历史记录的 `category` 字段，
//! 供历史面板按分类筛选。
//!
//! 按表中顺序检查，第一个命中关键词的分类胜出；都不命中时归为 "其他"。

/// 未命中任何关键词时的分类
pub const FALLBACK_CATEGORY: &str = "其他";

/// 分类及其关键词（顺序即优先级）
const CATEGORIES: &[(&str, &[&str])] = &[
    ("写作", &["文章", "写作", "内容", "博客", "新闻"]),
    ("分析", &["分析", "数据", "统计", "研究", "报告"]),
    ("工作", &["计划", "方案", "文档", "会议", "项目"]),
    ("学习", &["学习", "教学", "课程", "知识", "解释"]),
    ("创意", &["设计", "创意", "策划", "营销", "广告"]),
];

/// 检测用户输入所属的分类
pub fn detect_category(input: &str) -> &'static str {
    CATEGORIES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| input.contains(keyword)))
        .map(|(category, _)| *category)
        .unwrap_or(FALLBACK_CATEGORY)
}
