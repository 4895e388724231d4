//! 内存存储实现
//!
//! 服务端默认后端，也是测试的替身。版本号分配在 DashMap 的分片锁内完成，
//! 因此对同一仓库的并发 append_version 是串行的。

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use super::{DocStore, SpecStore, StoreError, VersionDraft};
use crate::models::{BusinessSpec, DocumentationVersion, GeneratedDocumentation};

/// 内存存储
#[derive(Default)]
pub struct MemoryStore {
    /// 仓库 ID -> 最新文档
    documents: DashMap<String, GeneratedDocumentation>,
    /// 仓库 ID -> 版本列表（按写入顺序，即版本号升序）
    versions: DashMap<String, Vec<DocumentationVersion>>,
    /// 规格 ID -> 规格
    specs: DashMap<String, BusinessSpec>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已落库的规格数量（测试用）
    pub fn spec_count(&self) -> usize {
        self.specs.len()
    }
}

#[async_trait]
impl DocStore for MemoryStore {
    async fn save_documentation(&self, doc: GeneratedDocumentation) -> Result<(), StoreError> {
        debug!("Saving documentation {} for repo {}", doc.id, doc.repository_id);
        self.documents.insert(doc.repository_id.clone(), doc);
        Ok(())
    }

    async fn latest_documentation(
        &self,
        repository_id: &str,
    ) -> Result<Option<GeneratedDocumentation>, StoreError> {
        Ok(self.documents.get(repository_id).map(|d| d.clone()))
    }

    async fn list_documentation(&self) -> Result<Vec<GeneratedDocumentation>, StoreError> {
        Ok(self.documents.iter().map(|d| d.clone()).collect())
    }

    async fn latest_version_number(&self, repository_id: &str) -> Result<u32, StoreError> {
        Ok(self
            .versions
            .get(repository_id)
            .map(|list| list.iter().map(|v| v.version).max().unwrap_or(0))
            .unwrap_or(0))
    }

    async fn append_version(&self, draft: VersionDraft) -> Result<DocumentationVersion, StoreError> {
        // entry 持有分片写锁，max+1 与 push 构成一个原子步骤
        let mut entry = self.versions.entry(draft.repository_id.clone()).or_default();
        let next = entry.iter().map(|v| v.version).max().unwrap_or(0) + 1;

        let version = DocumentationVersion {
            id: draft.id,
            repository_id: draft.repository_id,
            version: next,
            title: draft.title,
            sections: draft.sections,
            created_at: draft.created_at,
            created_by: draft.created_by,
            change_log: draft.change_log,
        };
        entry.push(version.clone());
        debug!("Appended version {} for repo {}", next, version.repository_id);
        Ok(version)
    }

    async fn list_versions(
        &self,
        repository_id: &str,
    ) -> Result<Vec<DocumentationVersion>, StoreError> {
        let mut list = self
            .versions
            .get(repository_id)
            .map(|v| v.clone())
            .unwrap_or_default();
        list.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(list)
    }

    async fn get_version(
        &self,
        version_id: &str,
    ) -> Result<Option<DocumentationVersion>, StoreError> {
        Ok(self
            .versions
            .iter()
            .find_map(|entry| entry.iter().find(|v| v.id == version_id).cloned()))
    }
}

#[async_trait]
impl SpecStore for MemoryStore {
    async fn insert_spec(&self, spec: BusinessSpec) -> Result<(), StoreError> {
        debug!("Inserting business spec {}", spec.id);
        self.specs.insert(spec.id.clone(), spec);
        Ok(())
    }
}
