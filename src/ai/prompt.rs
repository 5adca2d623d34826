//! Prompt Construction
//!
//! Deterministic request construction for knowledge tree generation.
//! Every fragment is embedded exactly once, in input order, with a
//! 1-indexed enumeration; a non-blank structure hint becomes a secondary
//! guidance block. The prompt always ends with an instruction to answer
//! with only JSON - a constraint the model may ignore, which is why
//! [`extract`](crate::ai::extract) stays tolerant.

use crate::ai::{ModelId, ModelRequest};
use crate::types::{Result, TreeError};

/// System role line for chat-style providers. Single-prompt providers
/// prepend this to the user prompt instead.
pub const SYSTEM_PROMPT: &str = "You are an expert knowledge organizer, skilled at creating \
hierarchical structures from fragmented information. Your task is to organize pieces of \
information into a coherent knowledge tree.";

/// Canonical output shape shown to the model. Matches
/// [`KnowledgeNode`](crate::types::KnowledgeNode) exactly.
const OUTPUT_SCHEMA_EXAMPLE: &str = r#"{
  "title": "Main Topic",
  "summary": "Brief overview of the entire knowledge domain",
  "children": [
    {
      "title": "Category 1",
      "summary": "Description of this category",
      "content": "Detailed information including relevant notes",
      "children": [
        {
          "title": "Subcategory 1.1",
          "summary": "Description of this subcategory",
          "content": "Detailed information including relevant notes",
          "children": []
        }
      ]
    }
  ]
}"#;

/// Final line of every prompt, verbatim.
pub const ONLY_JSON_INSTRUCTION: &str =
    "Respond with ONLY the JSON, no other text before or after it.";

/// Build a validated [`ModelRequest`].
///
/// Fails with `InvalidInput` when `fragments` is empty. A blank structure
/// hint is normalized to `None`.
pub fn build_request(
    model: ModelId,
    fragments: Vec<String>,
    structure_hint: Option<String>,
) -> Result<ModelRequest> {
    if fragments.is_empty() {
        return Err(TreeError::InvalidInput(
            "at least one note or document fragment is required".to_string(),
        ));
    }

    let structure_hint = structure_hint.filter(|hint| !hint.trim().is_empty());

    Ok(ModelRequest {
        model,
        fragments,
        structure_hint,
    })
}

/// Render the user-facing prompt body shared by both providers.
pub fn render_user_prompt(request: &ModelRequest) -> String {
    let mut prompt = String::from(
        "Create a hierarchical knowledge tree from the following notes and information snippets.\n\n",
    );

    prompt.push_str("### Notes:\n");
    for (index, fragment) in request.fragments.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", index + 1, fragment));
    }

    if let Some(hint) = &request.structure_hint {
        prompt.push_str(&format!(
            "\n### Suggested structure (use this as a guide, but feel free to modify):\n{}\n",
            hint
        ));
    }

    prompt.push_str(&format!(
        "\n### Instructions:
1. Organize the notes into a coherent hierarchical knowledge tree
2. Create meaningful categories and subcategories
3. Place each note in the appropriate location in the hierarchy
4. Add brief explanations for key concepts
5. Identify connections between different branches

Format your response as JSON with the following structure:
{}

{}",
        OUTPUT_SCHEMA_EXAMPLE, ONLY_JSON_INSTRUCTION
    ));

    prompt
}
