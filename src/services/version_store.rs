//! 版本存储服务
//!
//! 版本号由 VersionStore 独家管理：同一仓库内从 1 开始严格递增，
//! 只追加，从不删除或重编号。max+1 的分配在存储层临界区内完成，
//! 并发创建不会产生重复号（见 DESIGN.md 的取舍说明）。

use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{DocumentationSection, DocumentationVersion, VersionAuthor};
use crate::store::{DocStore, VersionDraft};

/// 创建版本时的元数据
#[derive(Debug, Clone, Default)]
pub struct VersionMetadata {
    pub title: String,
    pub created_by: Option<VersionAuthor>,
}

/// 基于已有版本派生新版本时的局部变更
///
/// sections 提供时整体替换，否则沿用原版本的快照。
#[derive(Debug, Clone, Default)]
pub struct VersionChanges {
    pub title: Option<String>,
    pub sections: Option<Vec<DocumentationSection>>,
    pub created_by: Option<VersionAuthor>,
}

/// 版本存储服务
pub struct VersionStore {
    store: Arc<dyn DocStore>,
}

impl VersionStore {
    pub fn new(store: Arc<dyn DocStore>) -> Self {
        Self { store }
    }

    /// 仓库当前最高版本号，无版本时为 0。只读，无副作用。
    pub async fn latest_version(&self, repository_id: &str) -> AppResult<u32> {
        self.store
            .latest_version_number(repository_id)
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))
    }

    /// 创建不可变版本快照并返回
    pub async fn create_version(
        &self,
        repository_id: &str,
        sections: Vec<DocumentationSection>,
        metadata: VersionMetadata,
        change_log: Option<String>,
    ) -> AppResult<DocumentationVersion> {
        let draft = VersionDraft {
            id: Uuid::new_v4().to_string(),
            repository_id: repository_id.to_string(),
            title: metadata.title,
            sections,
            created_at: Utc::now(),
            created_by: metadata.created_by,
            change_log,
        };

        let version = self
            .store
            .append_version(draft)
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))?;

        info!(
            "Created version {} for repo {} ({} sections)",
            version.version,
            repository_id,
            version.sections.len()
        );
        Ok(version)
    }

    /// 全部版本，按版本号降序（最新在前）
    pub async fn version_history(&self, repository_id: &str) -> AppResult<Vec<DocumentationVersion>> {
        self.store
            .list_versions(repository_id)
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))
    }

    /// 基于已有版本派生新版本
    ///
    /// 读取 original_id 指向的版本，合并调用方提供的局部字段后
    /// 走 create_version 正常分配版本号。original_id 无法解析时 NotFound。
    pub async fn create_new_version(
        &self,
        original_id: &str,
        changes: VersionChanges,
        change_log: Option<String>,
    ) -> AppResult<DocumentationVersion> {
        let original = self
            .store
            .get_version(original_id)
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("版本不存在: {}", original_id)))?;

        let metadata = VersionMetadata {
            title: changes.title.unwrap_or(original.title),
            created_by: changes.created_by.or(original.created_by),
        };
        let sections = changes.sections.unwrap_or(original.sections);

        self.create_version(&original.repository_id, sections, metadata, change_log)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SectionType;
    use crate::store::MemoryStore;

    fn sections(label: &str) -> Vec<DocumentationSection> {
        vec![DocumentationSection::new(
            "s1",
            "Overview",
            format!("{} content", label),
            SectionType::Overview,
        )]
    }

    fn store() -> VersionStore {
        VersionStore::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_latest_version_starts_at_zero() {
        assert_eq!(store().latest_version("repo-1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sequential_creates_are_contiguous() {
        let versions = store();
        for expected in 1..=3u32 {
            let v = versions
                .create_version("repo-1", sections("v"), VersionMetadata::default(), None)
                .await
                .unwrap();
            assert_eq!(v.version, expected);
        }

        let history = versions.version_history("repo-1").await.unwrap();
        let numbers: Vec<u32> = history.iter().map(|v| v.version).collect();
        assert_eq!(numbers, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_numbering_is_per_repository() {
        let versions = store();
        versions
            .create_version("repo-a", sections("a"), VersionMetadata::default(), None)
            .await
            .unwrap();
        let v = versions
            .create_version("repo-b", sections("b"), VersionMetadata::default(), None)
            .await
            .unwrap();
        assert_eq!(v.version, 1);
    }

    #[tokio::test]
    async fn test_concurrent_creates_do_not_duplicate_numbers() {
        let versions = Arc::new(store());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let versions = versions.clone();
            handles.push(tokio::spawn(async move {
                versions
                    .create_version("repo-1", sections("c"), VersionMetadata::default(), None)
                    .await
                    .unwrap()
                    .version
            }));
        }

        let mut numbers = Vec::new();
        for handle in handles {
            numbers.push(handle.await.unwrap());
        }
        numbers.sort_unstable();
        assert_eq!(numbers, (1..=8).collect::<Vec<u32>>());
    }

    #[tokio::test]
    async fn test_create_new_version_merges_partial_fields() {
        let versions = store();
        let original = versions
            .create_version(
                "repo-1",
                sections("original"),
                VersionMetadata {
                    title: "First".to_string(),
                    created_by: None,
                },
                None,
            )
            .await
            .unwrap();

        // 只改标题：章节整体沿用
        let revised = versions
            .create_new_version(
                &original.id,
                VersionChanges {
                    title: Some("Second".to_string()),
                    ..Default::default()
                },
                Some("retitled".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(revised.version, 2);
        assert_eq!(revised.title, "Second");
        assert_eq!(revised.sections[0].content, "original content");
        assert_eq!(revised.change_log.as_deref(), Some("retitled"));

        // 提供 sections 时整体替换
        let replaced = versions
            .create_new_version(
                &original.id,
                VersionChanges {
                    sections: Some(sections("replaced")),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(replaced.version, 3);
        assert_eq!(replaced.sections[0].content, "replaced content");
        assert_eq!(replaced.title, "First");
    }

    #[tokio::test]
    async fn test_create_new_version_unknown_id_is_not_found() {
        let err = store()
            .create_new_version("missing", VersionChanges::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
