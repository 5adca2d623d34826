//! Response Extractor
//!
//! Recovers a JSON knowledge tree from free-form model output. The prompt
//! asks for bare JSON, but models wrap answers in prose and code fences
//! anyway, so recovery runs an ordered list of independent strategies:
//!
//! 1. fenced code block with a `json` language tag
//! 2. any fenced code block
//! 3. greedy outermost-brace substring (first `{` through last `}`)
//!
//! A candidate that fails to parse falls through to the next strategy;
//! only exhausting all three yields `NoJsonFound`. The first candidate
//! that parses is then validated structurally: every node needs a
//! non-empty string `title` (alias `name`), and `children`, when present,
//! must be an array. Violations name the offending path, e.g.
//! `children[2].children[0]`.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::types::{KnowledgeNode, Result, TreeError};

static FENCED_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```json\s*\n(.*?)\n?```").expect("fenced-json pattern is valid")
});

static FENCED_ANY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(.*?)```").expect("fenced-any pattern is valid"));

/// Extract and validate a knowledge tree from raw model text.
pub fn extract(raw_text: &str) -> Result<KnowledgeNode> {
    let strategies: [fn(&str) -> Option<String>; 3] =
        [fenced_with_tag, fenced_any, outermost_braces];

    for strategy in strategies {
        let Some(candidate) = strategy(raw_text) else {
            continue;
        };

        match serde_json::from_str::<Value>(candidate.trim()) {
            Ok(value) => {
                validate_node(&value, "root")?;
                return Ok(serde_json::from_value(value)?);
            }
            Err(e) => {
                debug!(error = %e, "Extraction candidate failed to parse, falling through");
            }
        }
    }

    Err(TreeError::NoJsonFound)
}

// =============================================================================
// Extraction Strategies
// =============================================================================

fn fenced_with_tag(raw: &str) -> Option<String> {
    FENCED_JSON
        .captures(raw)
        .map(|captures| captures[1].to_string())
}

fn fenced_any(raw: &str) -> Option<String> {
    let interior = FENCED_ANY.captures(raw).map(|captures| captures[1].to_string())?;
    // strip a leading language tag line such as "json\n"
    let trimmed = interior.trim_start();
    match trimmed.strip_prefix("json\n") {
        Some(rest) => Some(rest.to_string()),
        None => Some(interior),
    }
}

fn outermost_braces(raw: &str) -> Option<String> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(raw[start..=end].to_string())
}

// =============================================================================
// Schema Validation
// =============================================================================

/// Recursively validate one node. `path` names the node for error
/// reporting; the root is "root", descendants are `children[i]` chains.
fn validate_node(value: &Value, path: &str) -> Result<()> {
    let Some(object) = value.as_object() else {
        return Err(TreeError::schema(path, "node must be a JSON object"));
    };

    let title = object.get("title").or_else(|| object.get("name"));
    match title {
        Some(Value::String(title)) if !title.trim().is_empty() => {}
        Some(Value::String(_)) => {
            return Err(TreeError::schema(path, "missing or empty title"));
        }
        Some(_) => {
            return Err(TreeError::schema(path, "title must be a string"));
        }
        None => {
            return Err(TreeError::schema(path, "missing or empty title"));
        }
    }

    match object.get("children") {
        None => {}
        Some(Value::Array(children)) => {
            for (index, child) in children.iter().enumerate() {
                let child_path = if path == "root" {
                    format!("children[{}]", index)
                } else {
                    format!("{}.children[{}]", path, index)
                };
                validate_node(child, &child_path)?;
            }
        }
        Some(_) => {
            return Err(TreeError::schema(path, "children must be an array"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAN: &str = r#"{"title":"X","children":[]}"#;

    #[test]
    fn test_idempotent_on_clean_json() {
        let tree = extract(CLEAN).unwrap();
        let direct: KnowledgeNode = serde_json::from_str(CLEAN).unwrap();
        assert_eq!(tree, direct);
    }

    #[test]
    fn test_recovers_from_all_three_wrappers() {
        let fenced_tagged = format!("Sure! ```json\n{}\n```", CLEAN);
        let fenced_plain = format!("Here you go:\n```\n{}\n```", CLEAN);
        let bare = format!("The tree is {} as requested.", CLEAN);

        let a = extract(&fenced_tagged).unwrap();
        let b = extract(&fenced_plain).unwrap();
        let c = extract(&bare).unwrap();

        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.title, "X");
        assert!(a.children.is_empty());
    }

    #[test]
    fn test_chatty_fenced_response() {
        let raw = "Sure! ```json\n{\"title\":\"X\",\"children\":[]}\n```";
        let tree = extract(raw).unwrap();
        assert_eq!(tree.title, "X");
        assert!(tree.children.is_empty());
    }

    #[test]
    fn test_unparseable_fence_falls_through_to_braces() {
        let raw = format!("```json\nnot valid json\n```\nbut also {}", CLEAN);
        let tree = extract(&raw).unwrap();
        assert_eq!(tree.title, "X");
    }

    #[test]
    fn test_no_json_anywhere() {
        let err = extract("I could not produce a tree, sorry.").unwrap_err();
        assert!(matches!(err, TreeError::NoJsonFound));
    }

    #[test]
    fn test_unparseable_final_candidate() {
        let err = extract("half a tree: {\"title\": ").unwrap_err();
        assert!(matches!(err, TreeError::NoJsonFound));
    }

    #[test]
    fn test_name_alias_normalized_to_title() {
        let raw = r#"{"name":"Doc","children":[{"name":"Intro","children":[]}]}"#;
        let tree = extract(raw).unwrap();
        assert_eq!(tree.title, "Doc");
        assert_eq!(tree.children[0].title, "Intro");

        let out = serde_json::to_string(&tree).unwrap();
        assert!(!out.contains("\"name\""));
    }

    #[test]
    fn test_missing_root_title() {
        let err = extract(r#"{"children":[]}"#).unwrap_err();
        match err {
            TreeError::Schema { path, .. } => assert_eq!(path, "root"),
            other => panic!("expected Schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_schema_error_names_nested_path() {
        let raw = r#"{
            "title": "root",
            "children": [
                {"title": "a", "children": []},
                {"title": "b", "children": []},
                {"title": "c", "children": [ {"summary": "no title here"} ]}
            ]
        }"#;
        let err = extract(raw).unwrap_err();
        match err {
            TreeError::Schema { path, message } => {
                assert_eq!(path, "children[2].children[0]");
                assert_eq!(message, "missing or empty title");
            }
            other => panic!("expected Schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_title_rejected() {
        let err = extract(r#"{"title":"   ","children":[]}"#).unwrap_err();
        assert!(matches!(err, TreeError::Schema { .. }));
    }

    #[test]
    fn test_non_array_children_rejected() {
        let err = extract(r#"{"title":"X","children":"none"}"#).unwrap_err();
        match err {
            TreeError::Schema { path, message } => {
                assert_eq!(path, "root");
                assert_eq!(message, "children must be an array");
            }
            other => panic!("expected Schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_children_accepted_as_empty() {
        let tree = extract(r#"{"title":"Leaf"}"#).unwrap();
        assert!(tree.children.is_empty());
    }

    #[test]
    fn test_optional_fields_survive_extraction() {
        let raw = r#"```json
{"title":"T","summary":"s","content":"c","children":[]}
```"#;
        let tree = extract(raw).unwrap();
        assert_eq!(tree.summary.as_deref(), Some("s"));
        assert_eq!(tree.content.as_deref(), Some("c"));
    }
}
