//! LLM Prompt 模板
//!
//! 定义章节生成与变更分析的 Prompt 模板

use crate::models::{Repository, RepositoryAnalysis};

/// 章节生成 Prompt
///
/// 要求模型输出 JSON 对象 {"sections": [{title, content, type}]}，
/// type 取值 overview / architecture / api / components / setup / custom。
/// 章节正文中用 {{repo_name}} 指代仓库名，由后处理替换。
pub const SECTION_GENERATION_PROMPT: &str = r###"你是一名技术文档工程师。请根据以下仓库结构分析，为仓库生成完整的技术文档章节。

仓库名称: {repository}
主要语言: {primary_language}
文件总数: {total_files}

结构分析:
{structure}

语言分布:
{languages}

要求：
1. 生成多个章节，覆盖 overview（概述）、architecture（架构）、api（接口）、components（组件）、setup（安装与使用）等维度，必要时可用 custom
2. 每个章节为 Markdown 正文，安装章节须包含 "## Getting Started" 小节
3. 正文中提到仓库名时统一使用占位符 {{repo_name}}
4. 只输出 JSON，格式如下：

{"sections": [{"title": "...", "content": "...", "type": "overview"}]}
"###;

/// 渲染章节生成 Prompt
pub fn format_section_prompt(repository: &Repository, analysis: &RepositoryAnalysis) -> String {
    let mut structure: Vec<String> = analysis
        .structure
        .iter()
        .map(|(path, desc)| format!("- {}: {}", path, desc))
        .collect();
    structure.sort();

    let mut languages: Vec<String> = analysis
        .languages
        .iter()
        .map(|(lang, lines)| format!("- {}: {} 行", lang, lines))
        .collect();
    languages.sort();

    SECTION_GENERATION_PROMPT
        .replace("{repository}", &repository.name)
        .replace(
            "{primary_language}",
            analysis.summary.primary_language.as_deref().unwrap_or("未知"),
        )
        .replace("{total_files}", &analysis.summary.total_files.to_string())
        .replace("{structure}", &structure.join("\n"))
        .replace("{languages}", &languages.join("\n"))
}

/// 变更分析 Prompt
///
/// 要求模型判断文档编辑是否构成重大变更，并在重大时给出规格草案。
pub const DIFF_ANALYSIS_PROMPT: &str = r#"你是一名需求分析师。以下是文档章节 "{section_title}" 编辑前后的内容，请判断这次编辑是否是重大变更（新增/删除功能描述、接口变动、行为变化算重大；错别字、措辞调整不算）。

编辑前:
---
{old_content}
---

编辑后:
---
{new_content}
---

只输出 JSON，格式如下：

{"hasSignificantChanges": true, "changeAnalysis": "变更说明", "suggestedSpec": {"title": "...", "description": "...", "acceptanceCriteria": ["..."], "technicalRequirements": ["..."], "priority": "medium"}}

不是重大变更时省略 suggestedSpec。
"#;

/// 渲染变更分析 Prompt
pub fn format_diff_prompt(old_content: &str, new_content: &str, section_title: &str) -> String {
    DIFF_ANALYSIS_PROMPT
        .replace("{section_title}", section_title)
        .replace("{old_content}", old_content)
        .replace("{new_content}", new_content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_format_section_prompt_fills_placeholders() {
        let repo = Repository {
            id: "r1".to_string(),
            name: "acme-api".to_string(),
            url: None,
            last_updated: Utc::now(),
        };
        let mut analysis = RepositoryAnalysis::default();
        analysis.structure.insert("src/main.rs".to_string(), "入口".to_string());
        analysis.summary.total_files = 12;

        let prompt = format_section_prompt(&repo, &analysis);
        assert!(prompt.contains("acme-api"));
        assert!(prompt.contains("- src/main.rs: 入口"));
        assert!(!prompt.contains("{total_files}"));
        // 占位符说明本身要保留给模型
        assert!(prompt.contains("{{repo_name}}"));
    }
}
