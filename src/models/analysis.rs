//! 仓库与结构分析类型
//!
//! 结构分析由外部仓库分析服务产出，这里只定义边界数据形状。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 已接入的源码仓库
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub id: String,
    pub name: String,
    /// 仓库主页地址（存在时会注入到 Getting Started 章节）
    #[serde(default)]
    pub url: Option<String>,
    /// 仓库最近更新时间
    pub last_updated: DateTime<Utc>,
}

/// 分析摘要
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub total_files: usize,
    pub total_lines: usize,
    #[serde(default)]
    pub primary_language: Option<String>,
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
    #[serde(default)]
    pub commit_frequency: Option<f64>,
}

/// 仓库结构分析结果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryAnalysis {
    /// 结构摘要：路径 -> 描述。生成的前置条件是此表非空。
    #[serde(default)]
    pub structure: HashMap<String, String>,
    #[serde(default)]
    pub contributors: Vec<String>,
    /// 语言 -> 行数
    #[serde(default)]
    pub languages: HashMap<String, usize>,
    #[serde(default)]
    pub recent_commits: Vec<String>,
    #[serde(default)]
    pub summary: AnalysisSummary,
}
