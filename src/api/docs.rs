//! 文档生成 API 端点
//!
//! 提供生成管线的 REST 接口与按仓库订阅的进度 WebSocket。

use axum::{
    extract::{Path, Query, State, WebSocketUpgrade},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

use crate::error::AppError;
use crate::models::{CollabEvent, GeneratedDocumentation, Repository, RepositoryAnalysis};
use crate::services::doc_generator::{export_documentation, ExportFormat};
use crate::state::AppState;
use crate::store::DocStore;

/// 文档生成事件广播到的协作房间
const DOCS_ROOM: &str = "docs-collaboration";

/// 创建文档生成路由
pub fn docs_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/docs/generate", post(generate_docs))
        .route("/api/docs/:repository_id", get(get_latest_docs))
        .route("/api/docs/:repository_id/export", get(export_docs))
        .route("/ws/docs/:repository_id", get(ws_handler))
}

/// 生成文档请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDocsRequest {
    /// 目标仓库
    pub repository: Repository,
    /// 仓库结构分析（结构为空时 412）
    pub analysis: RepositoryAnalysis,
    /// 发起人，提供时向协作房间广播生成事件
    #[serde(default)]
    pub initiator: Option<Initiator>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Initiator {
    pub id: String,
    pub name: String,
}

/// 执行文档生成
///
/// 同步等待管线完成并返回文档对象；生成阶段的失败体现在
/// status = error 的文档里而非 HTTP 错误。进度实时转发到
/// 仓库的进度通道，供 /ws/docs/:repository_id 的订阅端消费。
async fn generate_docs(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateDocsRequest>,
) -> Result<Json<GeneratedDocumentation>, AppError> {
    info!("Received generation request for repo {}", req.repository.id);

    let progress_tx = state.progress_channel(&req.repository.id);

    if let Some(initiator) = &req.initiator {
        state.collab.broadcast(
            DOCS_ROOM,
            CollabEvent::DocGenerationStarted {
                user_id: initiator.id.clone(),
                user_name: initiator.name.clone(),
                repository_id: req.repository.id.clone(),
            },
        );
    }

    // 无订阅端时 send 返回 Err，进度直接丢弃
    let doc = state
        .doc_gen
        .generate(&req.repository, &req.analysis, |progress| {
            let _ = progress_tx.send(progress);
        })
        .await?;

    if let Some(initiator) = &req.initiator {
        state.collab.broadcast(
            DOCS_ROOM,
            CollabEvent::DocGenerationCompleted {
                user_id: initiator.id.clone(),
                user_name: initiator.name.clone(),
                repository_id: req.repository.id.clone(),
                documentation_id: doc.id.clone(),
            },
        );
    }

    Ok(Json(doc))
}

/// 获取仓库的最新文档
async fn get_latest_docs(
    State(state): State<Arc<AppState>>,
    Path(repository_id): Path<String>,
) -> Result<Json<GeneratedDocumentation>, AppError> {
    let doc = state
        .store
        .latest_documentation(&repository_id)
        .await
        .map_err(|e| AppError::Persistence(e.to_string()))?
        .ok_or_else(|| AppError::NotFound(format!("仓库 {} 尚无文档", repository_id)))?;
    Ok(Json(doc))
}

/// 导出参数
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: String,
}

/// 导出仓库的最新文档
async fn export_docs(
    State(state): State<Arc<AppState>>,
    Path(repository_id): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, AppError> {
    // 格式校验先于文档查找，未知格式一律 400
    let format: ExportFormat = query.format.parse()?;

    let doc = state
        .store
        .latest_documentation(&repository_id)
        .await
        .map_err(|e| AppError::Persistence(e.to_string()))?
        .ok_or_else(|| AppError::NotFound(format!("仓库 {} 尚无文档", repository_id)))?;

    let body = export_documentation(&doc, format)?;
    Ok(([(header::CONTENT_TYPE, format.content_type())], body))
}

/// WebSocket 进度推送处理器
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(repository_id): Path<String>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws_connection(socket, state, repository_id))
}

/// 处理 WebSocket 连接
async fn handle_ws_connection(
    socket: axum::extract::ws::WebSocket,
    state: Arc<AppState>,
    repository_id: String,
) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.progress_channel(&repository_id).subscribe();

    info!("Progress WebSocket connected: repository_id={}", repository_id);

    loop {
        tokio::select! {
            // 接收进度消息并发送给客户端
            result = rx.recv() => {
                match result {
                    Ok(progress) => {
                        let json = match serde_json::to_string(&progress) {
                            Ok(json) => json,
                            Err(_) => continue,
                        };
                        if sender.send(axum::extract::ws::Message::Text(json)).await.is_err() {
                            break;
                        }
                        // 终态事件后关闭连接
                        if progress.is_terminal() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => {
                        // 跳过延迟的消息
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }

            // 处理客户端消息（主要是 ping/pong）
            result = receiver.next() => {
                match result {
                    Some(Ok(axum::extract::ws::Message::Ping(data))) => {
                        let _ = sender.send(axum::extract::ws::Message::Pong(data)).await;
                    }
                    Some(Ok(axum::extract::ws::Message::Close(_))) | None => {
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    info!("Progress WebSocket closed: repository_id={}", repository_id);
}
