//! 生成管线类型定义

use serde::{Deserialize, Serialize};

/// 生成管线阶段
///
/// 状态线性推进，没有回退边；error 可从任意阶段到达。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationPhase {
    Idle,
    Initializing,
    Analyzing,
    Generating,
    Processing,
    Completed,
    Error,
}

/// 进度事件
///
/// 百分比序列 0/10/25/80/100 是调用方可以断言的契约，
/// step 为机器可读名称，message 面向用户展示。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationProgress {
    pub phase: GenerationPhase,
    pub percent: u8,
    pub step: String,
    pub message: String,
}

impl GenerationProgress {
    pub fn new(phase: GenerationPhase, percent: u8, step: &str, message: impl Into<String>) -> Self {
        Self {
            phase,
            percent,
            step: step.to_string(),
            message: message.into(),
        }
    }

    /// 是否为终态事件（WebSocket 推送在此之后关闭）
    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, GenerationPhase::Completed | GenerationPhase::Error)
    }
}
