//! 文档生成服务
//!
//! 负责整条生成管线：前置条件检查、每仓库在途守卫、调用文本生成
//! 服务、章节后处理、进度上报与尽力而为的落库。

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::post_processor;
use super::prompts;
use super::types::{GenerationPhase, GenerationProgress};
use crate::config::get_config;
use crate::error::AppError;
use crate::llm::{extract_json_block, ChatMessage, ChatOptions, LlmClient, LlmError};
use crate::models::{
    DocumentationSection, GeneratedDocumentation, Repository, RepositoryAnalysis, SectionType,
};
use crate::store::DocStore;

/// 文档过期窗口：超过 7 天未更新即视为需要重新生成
pub const STALENESS_WINDOW_DAYS: i64 = 7;

/// 文本生成协作方契约
#[async_trait]
pub trait SectionGenerator: Send + Sync {
    /// 服务是否可用（未配置 API 密钥时为 false）
    fn is_available(&self) -> bool;

    /// 把仓库结构分析转为章节草稿
    async fn generate_sections(
        &self,
        repository: &Repository,
        analysis: &RepositoryAnalysis,
    ) -> Result<Vec<DocumentationSection>, LlmError>;
}

/// LLM 后端的文本生成实现
///
/// 每次调用时读取全局配置，配置更新无需重建服务。
pub struct LlmSectionGenerator;

/// 模型返回的章节载荷
#[derive(Deserialize)]
struct SectionPayload {
    #[serde(default)]
    sections: Vec<SectionDraft>,
}

#[derive(Deserialize)]
struct SectionDraft {
    title: String,
    content: String,
    #[serde(rename = "type", default)]
    section_type: SectionType,
}

#[async_trait]
impl SectionGenerator for LlmSectionGenerator {
    fn is_available(&self) -> bool {
        !get_config().api_key.is_empty()
    }

    async fn generate_sections(
        &self,
        repository: &Repository,
        analysis: &RepositoryAnalysis,
    ) -> Result<Vec<DocumentationSection>, LlmError> {
        let config = get_config();
        let client = LlmClient::new(&config.api_key, &config.base_url)?;

        let messages = vec![
            ChatMessage::system("你是一名技术文档工程师，只输出 JSON。"),
            ChatMessage::user(prompts::format_section_prompt(repository, analysis)),
        ];
        let options = ChatOptions {
            temperature: Some(config.temperature),
            max_tokens: Some(config.max_tokens),
            response_format: Some("json_object".to_string()),
        };

        let content = client.chat_completion(messages, &config.model, options).await?;
        let json = extract_json_block(&content)
            .ok_or_else(|| LlmError::InvalidResponse("响应中未找到 JSON".to_string()))?;
        let payload: SectionPayload = serde_json::from_str(&json)?;

        Ok(payload
            .sections
            .into_iter()
            .map(|draft| {
                DocumentationSection::new(
                    Uuid::new_v4().to_string(),
                    draft.title,
                    draft.content,
                    draft.section_type,
                )
            })
            .collect())
    }
}

/// 在途守卫：Drop 时无条件移除标记，提前返回与失败路径都会清理
struct InFlightGuard<'a> {
    registry: &'a DashMap<String, ()>,
    repository_id: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.registry.remove(&self.repository_id);
    }
}

/// 文档生成服务
pub struct DocGenService {
    generator: Arc<dyn SectionGenerator>,
    store: Arc<dyn DocStore>,
    /// 仓库 ID -> 在途生成标记
    in_flight: DashMap<String, ()>,
}

impl DocGenService {
    pub fn new(generator: Arc<dyn SectionGenerator>, store: Arc<dyn DocStore>) -> Self {
        Self {
            generator,
            store,
            in_flight: DashMap::new(),
        }
    }

    /// 原子插入在途标记；同一仓库已有任务时立即失败，不改动任何状态
    fn acquire(&self, repository_id: &str) -> Result<InFlightGuard<'_>, AppError> {
        match self.in_flight.entry(repository_id.to_string()) {
            Entry::Occupied(_) => Err(AppError::ConcurrencyConflict(format!(
                "仓库 {} 已有生成任务在执行",
                repository_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(());
                Ok(InFlightGuard {
                    registry: &self.in_flight,
                    repository_id: repository_id.to_string(),
                })
            }
        }
    }

    /// 执行生成管线
    ///
    /// 前置条件失败与并发冲突通过 Err 返回；生成阶段的失败不抛错，
    /// 而是返回 status = error 的文档对象，调用方必须检查 status。
    pub async fn generate(
        &self,
        repository: &Repository,
        analysis: &RepositoryAnalysis,
        on_progress: impl Fn(GenerationProgress) + Send,
    ) -> Result<GeneratedDocumentation, AppError> {
        let _guard = self.acquire(&repository.id)?;

        // 前置条件在任何状态迁移与进度上报之前检查，不重试
        if !self.generator.is_available() {
            return Err(AppError::PreconditionFailed(
                "文本生成服务不可用，请先配置 API 密钥".to_string(),
            ));
        }
        if analysis.structure.is_empty() {
            return Err(AppError::PreconditionFailed(
                "仓库结构分析为空，无法生成文档".to_string(),
            ));
        }

        info!("Starting documentation generation for repo {}", repository.id);
        on_progress(GenerationProgress::new(
            GenerationPhase::Initializing,
            0,
            "initializing",
            "Starting documentation generation",
        ));
        on_progress(GenerationProgress::new(
            GenerationPhase::Analyzing,
            10,
            "analyzing",
            "Reading repository analysis",
        ));
        on_progress(GenerationProgress::new(
            GenerationPhase::Generating,
            25,
            "generating",
            "Generation request sent",
        ));

        let sections = match self.generator.generate_sections(repository, analysis).await {
            Ok(sections) => sections,
            Err(e) => {
                warn!("Section generation failed for repo {}: {}", repository.id, e);
                let doc = GeneratedDocumentation::failed(&repository.id, e.to_string());
                on_progress(GenerationProgress::new(
                    GenerationPhase::Error,
                    100,
                    "error",
                    format!("Generation failed: {}", e),
                ));
                return Ok(doc);
            }
        };

        on_progress(GenerationProgress::new(
            GenerationPhase::Processing,
            80,
            "processing",
            "Post-processing sections",
        ));

        let mut sections: Vec<DocumentationSection> = sections
            .into_iter()
            .map(|s| post_processor::process_section(s, repository))
            .collect();
        // 稳定排序：同类型章节保持输入顺序
        sections.sort_by_key(|s| s.section_type.priority());

        let doc = GeneratedDocumentation::completed(&repository.id, sections);

        // 尽力而为的落库：存储故障不影响把结果返回给调用方
        if let Err(e) = self.store.save_documentation(doc.clone()).await {
            warn!("Best-effort save failed for doc {}: {}", doc.id, e);
        }

        on_progress(GenerationProgress::new(
            GenerationPhase::Completed,
            100,
            "completed",
            "Documentation generated",
        ));
        info!(
            "Documentation generated for repo {}: {} sections",
            repository.id,
            doc.sections.len()
        );
        Ok(doc)
    }
}

/// 文档是否需要重新生成（纯函数，无 I/O）
pub fn needs_update(doc: &GeneratedDocumentation, repository: &Repository) -> bool {
    needs_update_at(doc, repository, Utc::now())
}

/// 判定基准时间可注入，便于测试 7 天边界
pub fn needs_update_at(
    doc: &GeneratedDocumentation,
    repository: &Repository,
    now: DateTime<Utc>,
) -> bool {
    repository.last_updated > doc.last_updated
        || now - doc.last_updated > Duration::days(STALENESS_WINDOW_DAYS)
}
