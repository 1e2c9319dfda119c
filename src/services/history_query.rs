//! # 历史记录查询
//!
//! 历史面板的搜索和分类筛选：
//! - 搜索词原样（不去除空白）对用户输入和生成结果做不区分大小写的子串匹配
//! - 分类为 "全部" 或未指定时不过滤

use crate::models::history::HistoryEntry;

/// 表示不按分类过滤的伪分类
pub const ALL_CATEGORIES: &str = "全部";

/// 按搜索词和分类筛选历史记录，保持原有顺序（最新在前）
pub fn filter_history(
    history: &[HistoryEntry],
    query: &str,
    category: Option<&str>,
) -> Vec<HistoryEntry> {
    let needle = query.to_lowercase();
    let category = category.filter(|c| !c.is_empty() && *c != ALL_CATEGORIES);

    history
        .iter()
        .filter(|item| {
            needle.is_empty()
                || item.user_input.to_lowercase().contains(&needle)
                || item.generated_prompt.to_lowercase().contains(&needle)
        })
        .filter(|item| match category {
            Some(c) => item.category.as_deref() == Some(c),
            None => true,
        })
        .cloned()
        .collect()
}

/// 历史中出现过的分类列表，"全部" 在首位，其余按首次出现顺序去重
pub fn categories(history: &[HistoryEntry]) -> Vec<String> {
    let mut result = vec![ALL_CATEGORIES.to_string()];
    for category in history.iter().filter_map(|item| item.category.as_deref()) {
        if !category.is_empty() && !result.iter().any(|c| c == category) {
            result.push(category.to_string());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn item(id: &str, input: &str, prompt: &str, category: Option<&str>) -> HistoryEntry {
        HistoryEntry {
            id: id.into(),
            user_input: input.into(),
            generated_prompt: prompt.into(),
            timestamp: Utc::now(),
            category: category.map(str::to_string),
            rating: None,
        }
    }

    fn sample() -> Vec<HistoryEntry> {
        vec![
            item("1", "写一篇文章", "You are a Writer", Some("写作")),
            item("2", "分析销售数据", "你是数据分析师", Some("分析")),
            item("3", "随便聊聊", "chat", None),
            item("4", "写博客", "blog WRITER", Some("写作")),
        ]
    }

    #[test]
    fn test_search_is_case_insensitive_over_both_fields() {
        let found = filter_history(&sample(), "writer", None);
        let ids: Vec<&str> = found.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);

        let found = filter_history(&sample(), "数据", None);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_category_filter() {
        assert_eq!(filter_history(&sample(), "", Some("写作")).len(), 2);
        assert_eq!(filter_history(&sample(), "", Some(ALL_CATEGORIES)).len(), 4);
        assert_eq!(filter_history(&sample(), "", None).len(), 4);
        assert!(filter_history(&sample(), "writer", Some("分析")).is_empty());
    }

    #[test]
    fn test_whitespace_query_is_matched_literally() {
        let mut history = sample();
        history.push(item("5", "two  spaces", "p", None));

        let found = filter_history(&history, "  ", None);
        let ids: Vec<&str> = found.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["5"]);
    }

    #[test]
    fn test_categories_are_distinct_in_first_seen_order() {
        assert_eq!(categories(&sample()), vec!["全部", "写作", "分析"]);
        assert_eq!(categories(&[]), vec!["全部"]);
    }
}
