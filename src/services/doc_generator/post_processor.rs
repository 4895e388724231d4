//! 章节后处理
//!
//! 纯文本变换，确定性，无 I/O：占位符替换、Getting Started 链接注入、
//! 代码块语言标记规整、词数重算。

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{DocumentationSection, Repository};

/// 仓库名占位符，由文本生成服务在章节草稿中使用
pub const REPO_NAME_PLACEHOLDER: &str = "{{repo_name}}";

/// Getting Started 标题行（字面匹配）
const GETTING_STARTED_HEADING: &str = "## Getting Started";

/// 空语言标记的代码围栏，如 "``` " 后跟行尾
static BLANK_FENCE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^```[ \t]+$").unwrap());

/// 对单个章节执行全部后处理步骤，返回新的章节值
pub fn process_section(section: DocumentationSection, repository: &Repository) -> DocumentationSection {
    let mut content = substitute_repo_name(&section.content, &repository.name);

    if let Some(url) = &repository.url {
        content = inject_repository_link(&content, url);
    }

    let content = normalize_code_fences(&content);
    let word_count = word_count(&content);

    DocumentationSection {
        content,
        word_count,
        ..section
    }
}

/// 替换仓库名占位符
pub fn substitute_repo_name(content: &str, repo_name: &str) -> String {
    content.replace(REPO_NAME_PLACEHOLDER, repo_name)
}

/// 在第一个 "## Getting Started" 标题行之后注入一次仓库链接
pub fn inject_repository_link(content: &str, url: &str) -> String {
    let link_line = format!("\n[View Repository]({})", url);
    let mut out = String::with_capacity(content.len() + link_line.len());
    let mut injected = false;

    for (i, line) in content.lines().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(line);
        if !injected && line.trim_end() == GETTING_STARTED_HEADING {
            out.push_str(&link_line);
            injected = true;
        }
    }
    if content.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// 规整代码围栏：语言标记保留，空标记不留下文本痕迹
pub fn normalize_code_fences(content: &str) -> String {
    BLANK_FENCE_TAG.replace_all(content, "```").to_string()
}

/// 词数 = 按空白分隔的非空 token 数
pub fn word_count(content: &str) -> usize {
    content.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SectionType;
    use chrono::Utc;

    fn repo(url: Option<&str>) -> Repository {
        Repository {
            id: "repo-1".to_string(),
            name: "acme-api".to_string(),
            url: url.map(|u| u.to_string()),
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn test_substitute_repo_name() {
        let out = substitute_repo_name("Welcome to {{repo_name}}!", "acme-api");
        assert_eq!(out, "Welcome to acme-api!");
    }

    #[test]
    fn test_inject_link_once_after_heading() {
        let content = "# Intro\n\n## Getting Started\nClone the repo.\n\n## Getting Started\nAgain.";
        let out = inject_repository_link(content, "https://example.com/r");
        assert_eq!(out.matches("[View Repository](https://example.com/r)").count(), 1);

        let lines: Vec<&str> = out.lines().collect();
        let heading_idx = lines.iter().position(|l| *l == "## Getting Started").unwrap();
        assert_eq!(lines[heading_idx + 1], "[View Repository](https://example.com/r)");
    }

    #[test]
    fn test_no_link_without_heading() {
        let out = inject_repository_link("# Intro\nNothing else.", "https://example.com/r");
        assert!(!out.contains("View Repository"));
    }

    #[test]
    fn test_normalize_blank_fence_tag() {
        let content = "```  \nlet x = 1;\n```\n```rust\nfn main() {}\n```";
        let out = normalize_code_fences(content);
        assert!(out.starts_with("```\n"));
        assert!(out.contains("```rust"));
    }

    #[test]
    fn test_word_count_ignores_extra_whitespace() {
        assert_eq!(word_count("  one   two\n\nthree\t"), 3);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn test_process_section_recomputes_word_count() {
        let section = DocumentationSection {
            id: "s1".to_string(),
            title: "Overview".to_string(),
            content: "{{repo_name}} is a service".to_string(),
            section_type: SectionType::Overview,
            word_count: 0,
            last_generated: Utc::now(),
        };
        let out = process_section(section, &repo(None));
        assert_eq!(out.content, "acme-api is a service");
        assert_eq!(out.word_count, 4);
    }

    #[test]
    fn test_process_section_injects_url() {
        let section = DocumentationSection::new(
            "s1",
            "Setup",
            "## Getting Started\nInstall deps.",
            SectionType::Setup,
        );
        let out = process_section(section, &repo(Some("https://example.com/r")));
        assert!(out.content.contains("[View Repository](https://example.com/r)"));
        assert_eq!(out.word_count, word_count(&out.content));
    }
}
