//! 协作 WebSocket 端点
//!
//! 每个连接对应一次房间订阅：加入即宣告在线，断开即移除。
//! 入站文本帧解析为协作事件后广播，出站帧为在线快照或他人事件。

use axum::{
    extract::{Path, Query, State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::models::PresenceUser;
use crate::services::collaboration::RoomMessage;
use crate::state::AppState;

/// 加入参数
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinQuery {
    pub user_id: String,
    pub user_name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// 创建协作路由
pub fn collab_routes() -> Router<Arc<AppState>> {
    Router::new().route("/ws/collab/:room", get(ws_handler))
}

/// 协作 WebSocket 处理器
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
    Query(query): Query<JoinQuery>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws_connection(socket, state, room, query))
}

/// 出站帧编码
fn encode_message(message: &RoomMessage) -> Option<String> {
    let value = match message {
        RoomMessage::Presence(users) => json!({
            "event": "presence-update",
            "users": users,
        }),
        RoomMessage::Event(event) => serde_json::to_value(event).ok()?,
    };
    Some(value.to_string())
}

/// 处理协作连接
async fn handle_ws_connection(
    socket: axum::extract::ws::WebSocket,
    state: Arc<AppState>,
    room: String,
    query: JoinQuery,
) {
    let user = PresenceUser {
        id: query.user_id,
        name: query.user_name,
        avatar: query.avatar,
    };
    let user_id = user.id.clone();
    // 订阅句柄 Drop 时移除在线状态并推送新快照
    let mut subscription = state.collab.join_tracked(&room, user);

    let (mut sender, mut receiver) = socket.split();
    info!("Collab WebSocket connected: room={}, user={}", room, user_id);

    loop {
        tokio::select! {
            // 房间消息转发给客户端（自回声已在订阅侧过滤）
            message = subscription.recv() => {
                match message {
                    Some(message) => {
                        let Some(json) = encode_message(&message) else {
                            continue;
                        };
                        if sender.send(axum::extract::ws::Message::Text(json)).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            // 客户端入站帧：协作事件或 ping
            result = receiver.next() => {
                match result {
                    Some(Ok(axum::extract::ws::Message::Text(text))) => {
                        match serde_json::from_str(&text) {
                            // 发送者自己的事件会在订阅侧被自回声过滤丢弃
                            Ok(event) => state.collab.broadcast(&room, event),
                            Err(e) => {
                                // 无法识别的帧只记录，不断开连接
                                warn!("Dropping malformed collab frame from {}: {}", user_id, e);
                            }
                        }
                    }
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

    info!("Collab WebSocket closed: room={}, user={}", room, user_id);
}
