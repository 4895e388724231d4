//! 协作通道
//!
//! 以房间为作用域的在线状态与类型化广播。广播是发后即忘、至多一次，
//! 仅保证单发送者内的顺序；在线状态不持久化，重连即重新宣告。
//! 自回声在订阅侧按事件的 userId 过滤，在线快照不过滤。

use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::models::{CollabEvent, PresenceUser};

/// 单房间广播容量
const ROOM_CHANNEL_CAPACITY: usize = 256;

/// 房间内的广播载荷
#[derive(Debug, Clone)]
pub enum RoomMessage {
    /// 成员集快照，任何成员变动后推送给所有订阅者
    Presence(Vec<PresenceUser>),
    /// 类型化协作事件
    Event(CollabEvent),
}

/// 协作房间
struct Room {
    tx: broadcast::Sender<RoomMessage>,
    members: RwLock<HashMap<String, PresenceUser>>,
}

impl Room {
    fn new() -> Self {
        let (tx, _) = broadcast::channel(ROOM_CHANNEL_CAPACITY);
        Self {
            tx,
            members: RwLock::new(HashMap::new()),
        }
    }

    fn snapshot(&self) -> Vec<PresenceUser> {
        let mut members: Vec<PresenceUser> = self.members.read().values().cloned().collect();
        members.sort_by(|a, b| a.id.cmp(&b.id));
        members
    }
}

/// 协作中心：房间注册表
#[derive(Default)]
pub struct CollaborationHub {
    rooms: DashMap<String, Arc<Room>>,
}

impl CollaborationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入房间：宣告在线并订阅广播
    ///
    /// 返回的订阅句柄在 Drop 时移除在线状态（退订、断连等价）。
    pub fn join(&self, room_name: &str, user: PresenceUser) -> RoomSubscription {
        let room = self
            .rooms
            .entry(room_name.to_string())
            .or_insert_with(|| Arc::new(Room::new()))
            .clone();

        // 先订阅再写入成员表，加入者自己也能收到首个快照
        let rx = room.tx.subscribe();
        let user_id = user.id.clone();
        room.members.write().insert(user_id.clone(), user);
        let _ = room.tx.send(RoomMessage::Presence(room.snapshot()));

        info!("User {} joined room {}", user_id, room_name);
        RoomSubscription {
            hub_rooms: None,
            room,
            room_name: room_name.to_string(),
            user_id,
            rx,
        }
    }

    /// 向房间广播一个事件，不要求发送者在房间内有订阅
    pub fn broadcast(&self, room_name: &str, event: CollabEvent) {
        if let Some(room) = self.rooms.get(room_name) {
            let _ = room.tx.send(RoomMessage::Event(event));
        }
    }

    /// 房间当前成员集
    pub fn members(&self, room_name: &str) -> Vec<PresenceUser> {
        self.rooms
            .get(room_name)
            .map(|room| room.snapshot())
            .unwrap_or_default()
    }

    /// 把订阅与中心关联，便于最后一个成员离开时回收空房间
    pub fn join_tracked(self: &Arc<Self>, room_name: &str, user: PresenceUser) -> RoomSubscription {
        let mut sub = self.join(room_name, user);
        sub.hub_rooms = Some(Arc::downgrade(self));
        sub
    }
}

/// 房间订阅句柄
pub struct RoomSubscription {
    hub_rooms: Option<std::sync::Weak<CollaborationHub>>,
    room: Arc<Room>,
    room_name: String,
    user_id: String,
    rx: broadcast::Receiver<RoomMessage>,
}

impl RoomSubscription {
    /// 当前成员集快照
    pub fn members(&self) -> Vec<PresenceUser> {
        self.room.snapshot()
    }

    /// 以本订阅者身份广播事件
    pub fn broadcast(&self, event: CollabEvent) {
        let _ = self.room.tx.send(RoomMessage::Event(event));
    }

    /// 接收下一条消息
    ///
    /// 事件按 userId 做自回声抑制；在线快照始终投递。
    /// 落后于通道容量的消息直接跳过（至多一次语义）。
    pub async fn recv(&mut self) -> Option<RoomMessage> {
        loop {
            match self.rx.recv().await {
                Ok(RoomMessage::Event(event)) => {
                    if event.user_id() == self.user_id {
                        continue;
                    }
                    return Some(RoomMessage::Event(event));
                }
                Ok(message) => return Some(message),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!("Subscriber {} lagged, skipped {} messages", self.user_id, skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for RoomSubscription {
    fn drop(&mut self) {
        let empty = {
            let mut members = self.room.members.write();
            members.remove(&self.user_id);
            members.is_empty()
        };
        let _ = self.room.tx.send(RoomMessage::Presence(self.room.snapshot()));
        debug!("User {} left room {}", self.user_id, self.room_name);

        if empty {
            if let Some(hub) = self.hub_rooms.as_ref().and_then(|w| w.upgrade()) {
                hub.rooms
                    .remove_if(&self.room_name, |_, room| room.members.read().is_empty());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, name: &str) -> PresenceUser {
        PresenceUser {
            id: id.to_string(),
            name: name.to_string(),
            avatar: None,
        }
    }

    fn editing_event(user_id: &str) -> CollabEvent {
        CollabEvent::DocEditingStarted {
            user_id: user_id.to_string(),
            user_name: "name".to_string(),
            documentation_id: "doc-1".to_string(),
            section_id: None,
        }
    }

    #[tokio::test]
    async fn test_join_receives_member_snapshot() {
        let hub = CollaborationHub::new();
        let mut sub = hub.join("docs-collaboration", user("u1", "Ada"));

        match sub.recv().await.unwrap() {
            RoomMessage::Presence(members) => {
                assert_eq!(members.len(), 1);
                assert_eq!(members[0].id, "u1");
            }
            other => panic!("expected presence snapshot, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_self_echo_suppressed_but_peer_receives() {
        let hub = CollaborationHub::new();
        let mut alice = hub.join("room", user("u1", "Ada"));
        let mut bob = hub.join("room", user("u2", "Bo"));

        // 消费双方的加入快照
        assert!(matches!(alice.recv().await.unwrap(), RoomMessage::Presence(_)));
        assert!(matches!(alice.recv().await.unwrap(), RoomMessage::Presence(_)));
        assert!(matches!(bob.recv().await.unwrap(), RoomMessage::Presence(_)));

        alice.broadcast(editing_event("u1"));
        // bob 收到事件
        match bob.recv().await.unwrap() {
            RoomMessage::Event(event) => assert_eq!(event.user_id(), "u1"),
            other => panic!("expected event, got {:?}", other),
        }

        // alice 不会收到自己的事件；下一条消息应是 bob 退出后的快照
        drop(bob);
        match alice.recv().await.unwrap() {
            RoomMessage::Presence(members) => {
                assert_eq!(members.len(), 1);
                assert_eq!(members[0].id, "u1");
            }
            other => panic!("expected presence after leave, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_leave_removes_presence() {
        let hub = CollaborationHub::new();
        let sub = hub.join("room", user("u1", "Ada"));
        assert_eq!(hub.members("room").len(), 1);

        drop(sub);
        assert!(hub.members("room").is_empty());
    }

    #[tokio::test]
    async fn test_empty_room_is_reclaimed() {
        let hub = Arc::new(CollaborationHub::new());
        let sub = hub.join_tracked("room", user("u1", "Ada"));
        assert_eq!(hub.rooms.len(), 1);

        drop(sub);
        assert!(hub.rooms.is_empty());
    }

    #[tokio::test]
    async fn test_editing_is_soft_indicator() {
        // 两个用户可以同时宣告编辑同一文档，协议不做互斥
        let hub = CollaborationHub::new();
        let mut alice = hub.join("room", user("u1", "Ada"));
        let bob = hub.join("room", user("u2", "Bo"));
        assert!(matches!(alice.recv().await.unwrap(), RoomMessage::Presence(_)));
        assert!(matches!(alice.recv().await.unwrap(), RoomMessage::Presence(_)));

        bob.broadcast(editing_event("u2"));
        alice.broadcast(editing_event("u1"));

        match alice.recv().await.unwrap() {
            RoomMessage::Event(event) => assert_eq!(event.user_id(), "u2"),
            other => panic!("expected event, got {:?}", other),
        }
    }
}
