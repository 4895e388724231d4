//! 从 LLM 响应中提取 JSON
//!
//! 即便请求了 json_object 响应格式，部分模型仍会把 JSON 包在
//! Markdown 代码块里或附加说明文字，这里做容错提取。

/// 从响应文本中提取 JSON 字符串
///
/// 支持以下格式：
/// 1. 直接的 JSON: `{ ... }` 或 `[ ... ]`
/// 2. 被 markdown 代码块包裹: ` ```json { ... } ``` `
pub fn extract_json_block(text: &str) -> Option<String> {
    let trimmed = text.trim();

    // 尝试查找 ```json ... ``` 格式
    if let Some(start) = trimmed.find("```json") {
        let after_marker = &trimmed[start + 7..];
        if let Some(end) = after_marker.find("```") {
            return Some(after_marker[..end].trim().to_string());
        }
    }

    // 尝试查找 ``` ... ``` 格式（没有 json 标记）
    if let Some(start) = trimmed.find("```") {
        let after_marker = &trimmed[start + 3..];
        if let Some(end) = after_marker.rfind("```") {
            let inner = after_marker[..end].trim();
            let json_start = inner.find(['{', '['])?;
            return Some(inner[json_start..].trim().to_string());
        }
    }

    // 尝试直接找到 JSON 对象或数组
    let (open, close) = match (trimmed.find('{'), trimmed.find('[')) {
        (Some(o), Some(a)) if a < o => ('[', ']'),
        (Some(_), _) => ('{', '}'),
        (None, Some(_)) => ('[', ']'),
        (None, None) => return None,
    };
    let start = trimmed.find(open)?;
    let end = trimmed.rfind(close)?;
    if start < end {
        Some(trimmed[start..=end].to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_json() {
        let text = r#"{"sections": []}"#;
        assert_eq!(extract_json_block(text).unwrap(), r#"{"sections": []}"#);
    }

    #[test]
    fn test_extract_fenced_json() {
        let text = "Here you go:\n```json\n{\"a\": 1}\n```\nDone.";
        assert_eq!(extract_json_block(text).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn test_extract_bare_fence() {
        let text = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_json_block(text).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn test_extract_none() {
        assert!(extract_json_block("no json here").is_none());
    }
}
