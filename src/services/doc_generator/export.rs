//! 导出渲染
//!
//! 按章节类型优先级排序后渲染为 markdown / html / json。
//! HTML 里的 Markdown 转换是刻意受限的：只处理 1-3 级标题、粗体、
//! 斜体、代码围栏、行内代码、无序列表和换行，不是完整渲染器。

use once_cell::sync::Lazy;
use regex::Regex;
use std::str::FromStr;

use crate::error::AppError;
use crate::models::{DocumentationSection, GeneratedDocumentation};

/// 导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Markdown,
    Html,
    Json,
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "markdown" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            "json" => Ok(Self::Json),
            other => Err(AppError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl ExportFormat {
    /// 响应的 Content-Type
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Markdown => "text/markdown; charset=utf-8",
            Self::Html => "text/html; charset=utf-8",
            Self::Json => "application/json",
        }
    }
}

/// 渲染导出内容
pub fn export_documentation(
    doc: &GeneratedDocumentation,
    format: ExportFormat,
) -> Result<String, AppError> {
    match format {
        ExportFormat::Markdown => Ok(render_markdown(doc)),
        ExportFormat::Html => Ok(render_html(doc)),
        // JSON 导出是完整记录的原样序列化，内容不做渲染
        ExportFormat::Json => serde_json::to_string_pretty(doc)
            .map_err(|e| AppError::Internal(format!("序列化文档失败: {}", e))),
    }
}

/// 按类型优先级返回排序后的章节引用（稳定排序，同类保持输入顺序）
fn ordered_sections(doc: &GeneratedDocumentation) -> Vec<&DocumentationSection> {
    let mut sections: Vec<&DocumentationSection> = doc.sections.iter().collect();
    sections.sort_by_key(|s| s.section_type.priority());
    sections
}

/// Markdown 导出：标题、生成日期行、各章节 H1 块，以水平线分隔
fn render_markdown(doc: &GeneratedDocumentation) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Documentation - {}\n\n", doc.repository_id));
    out.push_str(&format!(
        "Generated: {}\n",
        doc.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    for section in ordered_sections(doc) {
        out.push_str("\n---\n\n");
        out.push_str(&format!("# {}\n\n", section.title));
        out.push_str(&section.content);
        out.push('\n');
    }
    out
}

/// HTML 导出：固定样式的最小独立页面
fn render_html(doc: &GeneratedDocumentation) -> String {
    let mut body = String::new();
    body.push_str(&format!("<h1>Documentation - {}</h1>\n", escape_html(&doc.repository_id)));
    body.push_str(&format!(
        "<p class=\"meta\">Generated: {}</p>\n",
        doc.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    for section in ordered_sections(doc) {
        body.push_str("<hr>\n");
        body.push_str(&format!("<h1>{}</h1>\n", escape_html(&section.title)));
        body.push_str(&markdown_to_html(&section.content));
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Documentation - {}</title>
<style>
body {{ font-family: -apple-system, sans-serif; max-width: 860px; margin: 2rem auto; padding: 0 1rem; color: #1f2328; }}
pre {{ background: #f6f8fa; padding: 1rem; border-radius: 6px; overflow-x: auto; }}
code {{ background: #f6f8fa; padding: 0.15rem 0.3rem; border-radius: 4px; font-size: 0.9em; }}
pre code {{ padding: 0; }}
hr {{ border: none; border-top: 1px solid #d1d9e0; margin: 2rem 0; }}
.meta {{ color: #59636e; }}
</style>
</head>
<body>
{}</body>
</html>
"#,
        escape_html(&doc.repository_id),
        body
    )
}

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*]+)\*").unwrap());
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// 行内格式：粗体、斜体、行内代码（先转义再替换）
fn render_inline(line: &str) -> String {
    let escaped = escape_html(line);
    let bold = BOLD.replace_all(&escaped, "<strong>$1</strong>");
    let italic = ITALIC.replace_all(&bold, "<em>$1</em>");
    INLINE_CODE.replace_all(&italic, "<code>$1</code>").to_string()
}

/// 受限的 Markdown -> HTML 转换
fn markdown_to_html(markdown: &str) -> String {
    let mut out = String::new();
    let mut in_code = false;
    let mut in_list = false;

    for line in markdown.lines() {
        if let Some(rest) = line.strip_prefix("```") {
            if in_code {
                out.push_str("</code></pre>\n");
                in_code = false;
            } else {
                if in_list {
                    out.push_str("</ul>\n");
                    in_list = false;
                }
                let lang = rest.trim();
                if lang.is_empty() {
                    out.push_str("<pre><code>");
                } else {
                    out.push_str(&format!("<pre><code class=\"language-{}\">", escape_html(lang)));
                }
                in_code = true;
            }
            continue;
        }

        if in_code {
            out.push_str(&escape_html(line));
            out.push('\n');
            continue;
        }

        let trimmed = line.trim_start();
        if let Some(item) = trimmed.strip_prefix("- ") {
            if !in_list {
                out.push_str("<ul>\n");
                in_list = true;
            }
            out.push_str(&format!("<li>{}</li>\n", render_inline(item)));
            continue;
        }
        if in_list {
            out.push_str("</ul>\n");
            in_list = false;
        }

        if let Some(heading) = trimmed.strip_prefix("### ") {
            out.push_str(&format!("<h3>{}</h3>\n", render_inline(heading)));
        } else if let Some(heading) = trimmed.strip_prefix("## ") {
            out.push_str(&format!("<h2>{}</h2>\n", render_inline(heading)));
        } else if let Some(heading) = trimmed.strip_prefix("# ") {
            out.push_str(&format!("<h1>{}</h1>\n", render_inline(heading)));
        } else if trimmed.is_empty() {
            // 空行只作块分隔
        } else {
            out.push_str(&format!("<p>{}</p>\n", render_inline(line)));
        }
    }

    if in_code {
        out.push_str("</code></pre>\n");
    }
    if in_list {
        out.push_str("</ul>\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentationSection, SectionType};

    fn doc_with(types: &[(&str, SectionType)]) -> GeneratedDocumentation {
        let sections = types
            .iter()
            .enumerate()
            .map(|(i, (title, t))| {
                DocumentationSection::new(format!("s{}", i), *title, format!("{} body", title), *t)
            })
            .collect();
        GeneratedDocumentation::completed("repo-1", sections)
    }

    #[test]
    fn test_unknown_format_rejected() {
        let err = "pdf".parse::<ExportFormat>().unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat(_)));
        assert_eq!("markdown".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
    }

    #[test]
    fn test_markdown_orders_by_type_priority() {
        let doc = doc_with(&[("Extras", SectionType::Custom), ("Overview", SectionType::Overview)]);
        let md = export_documentation(&doc, ExportFormat::Markdown).unwrap();
        let overview_pos = md.find("# Overview").unwrap();
        let custom_pos = md.find("# Extras").unwrap();
        assert!(overview_pos < custom_pos);
        assert!(md.contains("Generated: "));
        assert!(md.contains("\n---\n"));
    }

    #[test]
    fn test_json_export_is_verbatim_record() {
        let mut doc = doc_with(&[("Overview", SectionType::Overview)]);
        doc.sections[0].content = "# raw **markdown** stays".to_string();
        let json = export_documentation(&doc, ExportFormat::Json).unwrap();
        let parsed: GeneratedDocumentation = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.sections[0].content, "# raw **markdown** stays");
        assert_eq!(parsed.id, doc.id);
    }

    #[test]
    fn test_html_export_wraps_page() {
        let doc = doc_with(&[("Overview", SectionType::Overview)]);
        let html = export_documentation(&doc, ExportFormat::Html).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<style>"));
        assert!(html.contains("<h1>Overview</h1>"));
    }

    #[test]
    fn test_markdown_to_html_limited_subset() {
        let md = "## Title\nSome **bold** and *em* and `code`.\n- one\n- two\n```rust\nfn main() {}\n```";
        let html = markdown_to_html(md);
        assert!(html.contains("<h2>Title</h2>"));
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<em>em</em>"));
        assert!(html.contains("<code>code</code>"));
        assert!(html.contains("<ul>\n<li>one</li>\n<li>two</li>\n</ul>"));
        assert!(html.contains("<pre><code class=\"language-rust\">fn main() {}\n</code></pre>"));
    }

    #[test]
    fn test_markdown_to_html_escapes() {
        let html = markdown_to_html("a < b & c");
        assert!(html.contains("a &lt; b &amp; c"));
    }
}
