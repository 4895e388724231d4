//! 文档搜索端点

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::AppResult;
use crate::services::search::SearchResult;
use crate::state::AppState;

/// 搜索参数
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// 全文搜索，空查询返回空结果
async fn search_docs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<SearchResult>>> {
    Ok(Json(state.search.search(&query.q).await?))
}

/// 创建搜索路由
pub fn search_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/search", get(search_docs))
}
