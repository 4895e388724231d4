//! 变更规格分析器
//!
//! 把文档编辑的前后内容交给文本分析服务判定是否重大变更，
//! 重大且带建议时派生结构化业务规格并落库。与生成管线不同，
//! 这里的分析失败与落库失败都如实上抛，不做尽力而为。

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::config::get_config;
use crate::error::{AppError, AppResult};
use crate::llm::{extract_json_block, ChatMessage, ChatOptions, LlmClient, LlmError};
use crate::models::{BusinessSpec, SpecChangeAnalysis, SpecPriority, SuggestedSpec};
use crate::services::doc_generator::prompts;
use crate::store::SpecStore;

/// 自动派生规格恒带的标签
const AUTO_TAGS: [&str; 2] = ["auto-generated", "documentation-changes"];

/// 文本分析协作方契约
///
/// 重大性判定策略对本系统是不透明的边界调用。
#[async_trait]
pub trait DiffAnalyzer: Send + Sync {
    async fn analyze_diff(
        &self,
        old_content: &str,
        new_content: &str,
        section_title: &str,
    ) -> Result<SpecChangeAnalysis, LlmError>;
}

/// LLM 后端的文本分析实现
pub struct LlmDiffAnalyzer;

#[async_trait]
impl DiffAnalyzer for LlmDiffAnalyzer {
    async fn analyze_diff(
        &self,
        old_content: &str,
        new_content: &str,
        section_title: &str,
    ) -> Result<SpecChangeAnalysis, LlmError> {
        let config = get_config();
        let client = LlmClient::new(&config.api_key, &config.base_url)?;

        let messages = vec![
            ChatMessage::system("你是一名需求分析师，只输出 JSON。"),
            ChatMessage::user(prompts::format_diff_prompt(old_content, new_content, section_title)),
        ];
        let options = ChatOptions {
            temperature: Some(config.temperature),
            max_tokens: Some(config.max_tokens),
            response_format: Some("json_object".to_string()),
        };

        let content = client.chat_completion(messages, &config.model, options).await?;
        let json = extract_json_block(&content)
            .ok_or_else(|| LlmError::InvalidResponse("响应中未找到 JSON".to_string()))?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// 变更规格分析服务
pub struct ChangeSpecAnalyzer {
    analyzer: Arc<dyn DiffAnalyzer>,
    specs: Arc<dyn SpecStore>,
}

impl ChangeSpecAnalyzer {
    pub fn new(analyzer: Arc<dyn DiffAnalyzer>, specs: Arc<dyn SpecStore>) -> Self {
        Self { analyzer, specs }
    }

    /// 分析一次编辑；重大且带建议时创建并持久化规格
    ///
    /// 返回分析结果与可选的已落库规格。非重大变更时规格为 None，
    /// 分析叙述仍返回给调用方（UI 以非错误形式提示）。
    pub async fn analyze(
        &self,
        old_content: &str,
        new_content: &str,
        section_title: &str,
    ) -> AppResult<(SpecChangeAnalysis, Option<BusinessSpec>)> {
        let analysis = self
            .analyzer
            .analyze_diff(old_content, new_content, section_title)
            .await
            .map_err(|e| AppError::Llm(e.to_string()))?;

        if !analysis.has_significant_changes {
            return Ok((analysis, None));
        }
        let Some(suggestion) = analysis.suggested_spec.clone() else {
            return Ok((analysis, None));
        };

        let spec = derive_spec(&analysis, suggestion, section_title);
        // 规格落库失败是硬错误，与生成管线的尽力而为不同
        self.specs
            .insert_spec(spec.clone())
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))?;

        info!("Created business spec {} from section '{}'", spec.id, section_title);
        Ok((analysis, Some(spec)))
    }
}

/// 由分析结果派生业务规格，缺省字段按固定规则填充
fn derive_spec(
    analysis: &SpecChangeAnalysis,
    suggestion: SuggestedSpec,
    section_title: &str,
) -> BusinessSpec {
    BusinessSpec {
        id: Uuid::new_v4().to_string(),
        title: suggestion
            .title
            .unwrap_or_else(|| format!("Changes to {}", section_title)),
        description: suggestion
            .description
            .unwrap_or_else(|| analysis.change_analysis.clone()),
        acceptance_criteria: suggestion.acceptance_criteria.unwrap_or_default(),
        technical_requirements: suggestion.technical_requirements.unwrap_or_default(),
        priority: suggestion.priority.unwrap_or(SpecPriority::Medium),
        status: "draft".to_string(),
        tags: AUTO_TAGS.iter().map(|t| t.to_string()).collect(),
        created_at: Utc::now(),
    }
}
