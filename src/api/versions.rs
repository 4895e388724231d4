//! 版本管理端点

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::AppResult;
use crate::models::{DocumentationSection, DocumentationVersion, VersionAuthor};
use crate::services::version_store::{VersionChanges, VersionMetadata};
use crate::state::AppState;

/// 创建版本管理路由
pub fn versions_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/repos/:repository_id/versions", post(create_version))
        .route("/api/repos/:repository_id/versions", get(version_history))
        .route("/api/versions/:id/revise", post(revise_version))
}

/// 创建版本请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVersionRequest {
    pub title: String,
    pub sections: Vec<DocumentationSection>,
    #[serde(default)]
    pub created_by: Option<VersionAuthor>,
    #[serde(default)]
    pub change_log: Option<String>,
}

/// 创建不可变版本快照
async fn create_version(
    State(state): State<Arc<AppState>>,
    Path(repository_id): Path<String>,
    Json(req): Json<CreateVersionRequest>,
) -> AppResult<Json<DocumentationVersion>> {
    let version = state
        .versions
        .create_version(
            &repository_id,
            req.sections,
            VersionMetadata {
                title: req.title,
                created_by: req.created_by,
            },
            req.change_log,
        )
        .await?;
    Ok(Json(version))
}

/// 版本历史，最新在前
async fn version_history(
    State(state): State<Arc<AppState>>,
    Path(repository_id): Path<String>,
) -> AppResult<Json<Vec<DocumentationVersion>>> {
    Ok(Json(state.versions.version_history(&repository_id).await?))
}

/// 派生版本请求，缺省字段沿用原版本
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviseVersionRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub sections: Option<Vec<DocumentationSection>>,
    #[serde(default)]
    pub created_by: Option<VersionAuthor>,
    #[serde(default)]
    pub change_log: Option<String>,
}

/// 基于已有版本派生新版本
async fn revise_version(
    State(state): State<Arc<AppState>>,
    Path(version_id): Path<String>,
    Json(req): Json<ReviseVersionRequest>,
) -> AppResult<Json<DocumentationVersion>> {
    let version = state
        .versions
        .create_new_version(
            &version_id,
            VersionChanges {
                title: req.title,
                sections: req.sections,
                created_by: req.created_by,
            },
            req.change_log,
        )
        .await?;
    Ok(Json(version))
}
