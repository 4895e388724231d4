//! 持久化边界
//!
//! 关系型持久化层在本系统范围之外，这里只定义引擎依赖的存取契约，
//! 以及服务端与测试共用的内存实现。

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{BusinessSpec, DocumentationSection, DocumentationVersion, GeneratedDocumentation, VersionAuthor};

/// 存储层错误
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("存储后端错误: {0}")]
    Backend(String),
}

/// 待写入的版本记录，版本号由存储层在写入时原子分配
#[derive(Debug, Clone)]
pub struct VersionDraft {
    pub id: String,
    pub repository_id: String,
    pub title: String,
    pub sections: Vec<DocumentationSection>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<VersionAuthor>,
    pub change_log: Option<String>,
}

/// 文档与版本存取契约
#[async_trait]
pub trait DocStore: Send + Sync {
    /// 保存仓库的最新文档（覆盖语义：UI 中的文档 ID 始终指向最新版）
    async fn save_documentation(&self, doc: GeneratedDocumentation) -> Result<(), StoreError>;

    /// 读取仓库的最新文档
    async fn latest_documentation(
        &self,
        repository_id: &str,
    ) -> Result<Option<GeneratedDocumentation>, StoreError>;

    /// 列出全部文档（搜索读路径）
    async fn list_documentation(&self) -> Result<Vec<GeneratedDocumentation>, StoreError>;

    /// 仓库当前最高版本号，无版本时为 0
    async fn latest_version_number(&self, repository_id: &str) -> Result<u32, StoreError>;

    /// 追加版本快照并分配版本号
    ///
    /// max(version)+1 的计算与写入必须在同一临界区内完成，
    /// 保证并发写入者不会拿到相同的版本号。
    async fn append_version(&self, draft: VersionDraft) -> Result<DocumentationVersion, StoreError>;

    /// 按版本号降序列出仓库的全部版本
    async fn list_versions(
        &self,
        repository_id: &str,
    ) -> Result<Vec<DocumentationVersion>, StoreError>;

    /// 按记录 ID 查找版本
    async fn get_version(
        &self,
        version_id: &str,
    ) -> Result<Option<DocumentationVersion>, StoreError>;
}

/// 业务规格存取契约
#[async_trait]
pub trait SpecStore: Send + Sync {
    async fn insert_spec(&self, spec: BusinessSpec) -> Result<(), StoreError>;
}
