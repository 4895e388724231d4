//! 文档版本类型
//!
//! 版本是某一时刻全部章节的不可变快照，按仓库单调递增编号，只增不删。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::section::DocumentationSection;

/// 版本作者信息
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionAuthor {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// 文档版本快照
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentationVersion {
    /// 版本记录 ID
    pub id: String,
    /// 所属仓库 ID
    pub repository_id: String,
    /// 版本号，同一仓库内从 1 开始严格递增
    pub version: u32,
    /// 版本标题
    pub title: String,
    /// 章节快照
    pub sections: Vec<DocumentationSection>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 创建者
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<VersionAuthor>,
    /// 变更说明
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_log: Option<String>,
}
