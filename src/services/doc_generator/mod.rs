//! 文档生成器模块
//!
//! 提供基于 LLM 的仓库文档生成功能
//!
//! # 功能
//!
//! - 调用文本生成服务，把仓库结构分析转为带标题、带类型的文档章节
//! - 固定检查点的进度上报（0/10/25/80/100）
//! - 每仓库至多一个在途生成任务（悲观守卫，清理无条件执行）
//! - 章节后处理：占位符替换、仓库链接注入、代码块规整、词数重算
//! - 导出渲染：markdown / html / json
//!
//! 生成成功后的落库是尽力而为的：存储不可用时记日志并照常把
//! 结果返回给调用方，AI 产出不因存储故障而丢失。

mod export;
mod generator;
pub mod post_processor;
pub mod prompts;
mod types;

pub use export::{export_documentation, ExportFormat};
pub use generator::{
    needs_update, needs_update_at, DocGenService, LlmSectionGenerator, SectionGenerator,
    STALENESS_WINDOW_DAYS,
};
pub use types::{GenerationPhase, GenerationProgress};
