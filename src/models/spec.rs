//! 变更分析与业务规格类型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 规格优先级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl Default for SpecPriority {
    fn default() -> Self {
        Self::Medium
    }
}

/// 文本分析服务对一次内容变更的判定结果
///
/// 派生数据，不直接存储；仅当判定为重大变更时才会落库为 BusinessSpec。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecChangeAnalysis {
    /// 是否为重大变更
    pub has_significant_changes: bool,
    /// 变更分析叙述
    pub change_analysis: String,
    /// 建议的规格草案（仅重大变更时出现）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_spec: Option<SuggestedSpec>,
}

/// 建议的规格草案，字段均可缺省
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedSpec {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub acceptance_criteria: Option<Vec<String>>,
    #[serde(default)]
    pub technical_requirements: Option<Vec<String>>,
    #[serde(default)]
    pub priority: Option<SpecPriority>,
}

/// 业务规格（结构化变更请求）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessSpec {
    pub id: String,
    pub title: String,
    pub description: String,
    pub acceptance_criteria: Vec<String>,
    pub technical_requirements: Vec<String>,
    pub priority: SpecPriority,
    /// 自动派生的规格恒为 draft
    pub status: String,
    /// 恒包含 auto-generated 与 documentation-changes
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}
