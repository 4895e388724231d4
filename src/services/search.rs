//! 文档搜索
//!
//! 在已持久化的文档上做大小写不敏感的文本匹配，围绕首个命中位置
//! 构造摘录窗口。结果按最近更新排序，上限 20 条。

use std::sync::Arc;
use tracing::debug;

use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::models::GeneratedDocumentation;
use crate::store::DocStore;

/// 摘录窗口：命中位置两侧各取 50 个字符
const EXCERPT_RADIUS: usize = 50;
/// 仅标题命中时的回退摘录长度
const FALLBACK_EXCERPT_LEN: usize = 150;
/// 结果上限
const MAX_RESULTS: usize = 20;

/// 单条搜索结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub documentation_id: String,
    pub repository_id: String,
    /// 命中章节的标题；仅标题命中时为首个章节标题
    pub section_title: Option<String>,
    pub excerpt: String,
    pub last_updated: chrono::DateTime<chrono::Utc>,
}

/// 搜索服务
pub struct SearchIndexer {
    store: Arc<dyn DocStore>,
}

impl SearchIndexer {
    pub fn new(store: Arc<dyn DocStore>) -> Self {
        Self { store }
    }

    /// 查询所有文档的章节标题与正文
    pub async fn search(&self, query: &str) -> AppResult<Vec<SearchResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut docs = self
            .store
            .list_documentation()
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))?;
        // 最近更新在前
        docs.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));

        let mut results = Vec::new();
        for doc in docs {
            if results.len() >= MAX_RESULTS {
                break;
            }
            if let Some(result) = match_document(&doc, query) {
                results.push(result);
            }
        }

        debug!("Search '{}' matched {} documents", query, results.len());
        Ok(results)
    }
}

/// 对单个文档求摘录；无任何命中时返回 None
fn match_document(doc: &GeneratedDocumentation, query: &str) -> Option<SearchResult> {
    // 正文命中：取第一个内容包含查询词的章节
    for section in &doc.sections {
        if let Some(offset) = find_case_insensitive(&section.content, query) {
            return Some(SearchResult {
                documentation_id: doc.id.clone(),
                repository_id: doc.repository_id.clone(),
                section_title: Some(section.title.clone()),
                excerpt: window_excerpt(&section.content, offset, query.chars().count()),
                last_updated: doc.last_updated,
            });
        }
    }

    // 仅标题命中：回退为首章节开头的摘录
    let title_hit = doc
        .sections
        .iter()
        .any(|s| find_case_insensitive(&s.title, query).is_some());
    if title_hit {
        let first = doc.sections.first()?;
        return Some(SearchResult {
            documentation_id: doc.id.clone(),
            repository_id: doc.repository_id.clone(),
            section_title: Some(first.title.clone()),
            excerpt: leading_excerpt(&first.content),
            last_updated: doc.last_updated,
        });
    }

    None
}

/// 大小写不敏感查找，返回命中的字符索引（非字节偏移）
fn find_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let haystack: Vec<char> = haystack.chars().collect();
    let needle: Vec<char> = needle.chars().collect();
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }

    let eq = |a: char, b: char| a.to_lowercase().eq(b.to_lowercase());
    (0..=haystack.len() - needle.len())
        .find(|&i| (0..needle.len()).all(|j| eq(haystack[i + j], needle[j])))
}

/// 以命中位置为中心的窗口摘录，窗口截断在末尾时追加省略号
fn window_excerpt(content: &str, match_idx: usize, query_len: usize) -> String {
    let chars: Vec<char> = content.chars().collect();
    let start = match_idx.saturating_sub(EXCERPT_RADIUS);
    let end = (match_idx + query_len + EXCERPT_RADIUS).min(chars.len());

    let mut excerpt: String = chars[start..end].iter().collect();
    if end < chars.len() {
        excerpt.push_str("...");
    }
    excerpt
}

/// 回退摘录：正文前 150 个字符加省略号
fn leading_excerpt(content: &str) -> String {
    let chars: Vec<char> = content.chars().collect();
    if chars.len() <= FALLBACK_EXCERPT_LEN {
        chars.iter().collect()
    } else {
        let mut excerpt: String = chars[..FALLBACK_EXCERPT_LEN].iter().collect();
        excerpt.push_str("...");
        excerpt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentationSection, SectionType};
    use crate::store::MemoryStore;

    async fn indexer_with(docs: Vec<GeneratedDocumentation>) -> SearchIndexer {
        let store = Arc::new(MemoryStore::new());
        for doc in docs {
            store.save_documentation(doc).await.unwrap();
        }
        SearchIndexer::new(store)
    }

    fn doc(repo: &str, title: &str, content: &str) -> GeneratedDocumentation {
        GeneratedDocumentation::completed(
            repo,
            vec![DocumentationSection::new("s1", title, content, SectionType::Overview)],
        )
    }

    #[tokio::test]
    async fn test_excerpt_window_around_match() {
        let prefix = "x".repeat(80);
        let suffix = "y".repeat(80);
        let content = format!("{} user auth token flow {}", prefix, suffix);
        let indexer = indexer_with(vec![doc("repo-1", "Security", &content)]).await;

        let results = indexer.search("auth").await.unwrap();
        assert_eq!(results.len(), 1);
        let excerpt = &results[0].excerpt;
        assert!(excerpt.contains("auth"));
        assert!(excerpt.ends_with("..."));
        // 两侧窗口 50 + 查询词 4，外加省略号
        assert!(excerpt.chars().count() <= 2 * EXCERPT_RADIUS + 4 + 3);
    }

    #[tokio::test]
    async fn test_match_is_case_insensitive() {
        let indexer = indexer_with(vec![doc("repo-1", "Overview", "The AUTH module")]).await;
        let results = indexer.search("auth").await.unwrap();
        assert_eq!(results.len(), 1);
        // 内容未被截断时无省略号
        assert_eq!(results[0].excerpt, "The AUTH module");
    }

    #[tokio::test]
    async fn test_title_only_match_uses_leading_fallback() {
        let content = "z".repeat(200);
        let indexer = indexer_with(vec![doc("repo-1", "Authentication", &content)]).await;
        let results = indexer.search("authentication").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].excerpt, format!("{}...", "z".repeat(150)));
    }

    #[tokio::test]
    async fn test_results_capped_and_ordered_by_recency() {
        let mut docs = Vec::new();
        for i in 0..25 {
            let mut d = doc(&format!("repo-{}", i), "Overview", "shared token here");
            d.last_updated = chrono::Utc::now() + chrono::Duration::seconds(i);
            docs.push(d);
        }
        let indexer = indexer_with(docs).await;

        let results = indexer.search("token").await.unwrap();
        assert_eq!(results.len(), 20);
        // 最近更新在前
        assert_eq!(results[0].repository_id, "repo-24");
        assert!(results[0].last_updated >= results[19].last_updated);
    }

    #[tokio::test]
    async fn test_no_match_and_empty_query() {
        let indexer = indexer_with(vec![doc("repo-1", "Overview", "nothing here")]).await;
        assert!(indexer.search("missing").await.unwrap().is_empty());
        assert!(indexer.search("   ").await.unwrap().is_empty());
    }
}
