//! 变更规格分析端点

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::AppResult;
use crate::models::{BusinessSpec, SpecChangeAnalysis};
use crate::state::AppState;

/// 变更分析请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeChangesRequest {
    pub old_content: String,
    pub new_content: String,
    pub section_title: String,
}

/// 变更分析响应
///
/// spec 仅在变更重大且成功落库时出现。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeChangesResponse {
    pub analysis: SpecChangeAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<BusinessSpec>,
}

/// 分析一次文档编辑并按需创建业务规格
async fn analyze_changes(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeChangesRequest>,
) -> AppResult<Json<AnalyzeChangesResponse>> {
    let (analysis, spec) = state
        .spec_analyzer
        .analyze(&req.old_content, &req.new_content, &req.section_title)
        .await?;
    Ok(Json(AnalyzeChangesResponse { analysis, spec }))
}

/// 创建规格分析路由
pub fn specs_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/specs/analyze", post(analyze_changes))
}
