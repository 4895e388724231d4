//! 协作协议类型
//!
//! 广播事件采用封闭的 tagged union，而非开放的字符串键值记录，
//! 以便在编译期覆盖全部已知事件种类。事件是一次性的，不落库。

use serde::{Deserialize, Serialize};

/// 房间内的在线用户，仅存在于订阅生命周期内，从不持久化
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceUser {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// 房间广播事件
///
/// 每个事件至少携带 userId/userName。接收端必须丢弃 userId 等于自身的
/// 事件（自回声抑制），避免用户看到自己动作的通知。
/// 编辑类事件只是软指示，协议不提供互斥。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum CollabEvent {
    #[serde(rename = "doc-generation-started", rename_all = "camelCase")]
    DocGenerationStarted {
        user_id: String,
        user_name: String,
        repository_id: String,
    },
    #[serde(rename = "doc-generation-completed", rename_all = "camelCase")]
    DocGenerationCompleted {
        user_id: String,
        user_name: String,
        repository_id: String,
        documentation_id: String,
    },
    #[serde(rename = "doc-editing-started", rename_all = "camelCase")]
    DocEditingStarted {
        user_id: String,
        user_name: String,
        documentation_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        section_id: Option<String>,
    },
    #[serde(rename = "doc-editing-stopped", rename_all = "camelCase")]
    DocEditingStopped {
        user_id: String,
        user_name: String,
        documentation_id: String,
    },
    #[serde(rename = "doc-section-updated", rename_all = "camelCase")]
    DocSectionUpdated {
        user_id: String,
        user_name: String,
        documentation_id: String,
        section_id: String,
    },
    #[serde(rename = "doc-created", rename_all = "camelCase")]
    DocCreated {
        user_id: String,
        user_name: String,
        documentation_id: String,
    },
    #[serde(rename = "doc-viewing", rename_all = "camelCase")]
    DocViewing {
        user_id: String,
        user_name: String,
        documentation_id: String,
    },
    #[serde(rename = "repo-selected", rename_all = "camelCase")]
    RepoSelected {
        user_id: String,
        user_name: String,
        repository_id: String,
    },
}

impl CollabEvent {
    /// 事件发送者的用户 ID，用于自回声抑制
    pub fn user_id(&self) -> &str {
        match self {
            CollabEvent::DocGenerationStarted { user_id, .. }
            | CollabEvent::DocGenerationCompleted { user_id, .. }
            | CollabEvent::DocEditingStarted { user_id, .. }
            | CollabEvent::DocEditingStopped { user_id, .. }
            | CollabEvent::DocSectionUpdated { user_id, .. }
            | CollabEvent::DocCreated { user_id, .. }
            | CollabEvent::DocViewing { user_id, .. }
            | CollabEvent::RepoSelected { user_id, .. } => user_id,
        }
    }
}
