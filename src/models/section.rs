//! 文档章节与生成结果类型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 章节类型
///
/// 导出与展示时按固定优先级排序，未知类型排在最后。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Overview,
    Architecture,
    Api,
    Components,
    Setup,
    Custom,
    /// 无法识别的类型（来自旧数据或外部写入）
    #[serde(other)]
    Unknown,
}

impl SectionType {
    /// 类型排序优先级，数值越小越靠前
    pub fn priority(&self) -> u32 {
        match self {
            SectionType::Overview => 1,
            SectionType::Architecture => 2,
            SectionType::Api => 3,
            SectionType::Components => 4,
            SectionType::Setup => 5,
            SectionType::Custom => 6,
            SectionType::Unknown => 999,
        }
    }
}

impl Default for SectionType {
    fn default() -> Self {
        Self::Custom
    }
}

/// 单个文档章节
///
/// 一旦被纳入某个版本快照即不可变；编辑产生新的章节值，不就地修改历史。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentationSection {
    /// 章节 ID
    pub id: String,
    /// 章节标题
    pub title: String,
    /// 章节内容（Markdown）
    pub content: String,
    /// 章节类型
    #[serde(rename = "type", default)]
    pub section_type: SectionType,
    /// 词数（按空白分隔的非空 token 计数，由后处理重算）
    #[serde(default)]
    pub word_count: usize,
    /// 最近生成时间
    pub last_generated: DateTime<Utc>,
}

impl DocumentationSection {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        section_type: SectionType,
    ) -> Self {
        let content = content.into();
        let word_count = content.split_whitespace().count();
        Self {
            id: id.into(),
            title: title.into(),
            content,
            section_type,
            word_count,
            last_generated: Utc::now(),
        }
    }
}

/// 生成状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocStatus {
    Generating,
    Completed,
    Error,
}

/// 一次生成产出的完整文档
///
/// 不变式：status = error 时 sections 为空；status = completed 不保证
/// sections 非空（仓库分析可能合法地产出零个章节，调用方需容忍）。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDocumentation {
    /// 文档 ID，格式 doc-{repositoryId}-{毫秒时间戳}
    pub id: String,
    /// 所属仓库 ID
    pub repository_id: String,
    /// 章节列表（按类型优先级排序）
    pub sections: Vec<DocumentationSection>,
    /// 生成时间
    pub generated_at: DateTime<Utc>,
    /// 最近更新时间
    pub last_updated: DateTime<Utc>,
    /// 生成状态
    pub status: DocStatus,
    /// 失败信息（仅 status = error 时出现）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GeneratedDocumentation {
    /// 创建完成态文档
    pub fn completed(repository_id: impl Into<String>, sections: Vec<DocumentationSection>) -> Self {
        let repository_id = repository_id.into();
        let now = Utc::now();
        Self {
            id: format!("doc-{}-{}", repository_id, now.timestamp_millis()),
            repository_id,
            sections,
            generated_at: now,
            last_updated: now,
            status: DocStatus::Completed,
            error: None,
        }
    }

    /// 创建失败态文档（sections 恒为空）
    pub fn failed(repository_id: impl Into<String>, error: impl Into<String>) -> Self {
        let repository_id = repository_id.into();
        let now = Utc::now();
        Self {
            id: format!("doc-{}-{}", repository_id, now.timestamp_millis()),
            repository_id,
            sections: Vec::new(),
            generated_at: now,
            last_updated: now,
            status: DocStatus::Error,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_type_priority_order() {
        assert!(SectionType::Overview.priority() < SectionType::Architecture.priority());
        assert!(SectionType::Setup.priority() < SectionType::Custom.priority());
        assert_eq!(SectionType::Unknown.priority(), 999);
    }

    #[test]
    fn test_section_type_unknown_from_wire() {
        let t: SectionType = serde_json::from_str("\"troubleshooting\"").unwrap();
        assert_eq!(t, SectionType::Unknown);
    }

    #[test]
    fn test_failed_doc_has_no_sections() {
        let doc = GeneratedDocumentation::failed("repo-1", "boom");
        assert_eq!(doc.status, DocStatus::Error);
        assert!(doc.sections.is_empty());
        assert_eq!(doc.error.as_deref(), Some("boom"));
        assert!(doc.id.starts_with("doc-repo-1-"));
    }
}
