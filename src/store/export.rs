//! Tree Exporters
//!
//! Downstream renderings of a stored tree: pretty JSON (exact structural
//! mirror), Markdown (heading level = node depth + 1), and SVG (horizontal
//! tree layout with an inlined minimal stylesheet).

use std::fmt::Write;

use crate::constants::{markdown, svg};
use crate::types::KnowledgeNode;

use super::StoredTree;

// =============================================================================
// JSON
// =============================================================================

/// Pretty-printed JSON, 2-space indent.
pub fn tree_to_json(tree: &KnowledgeNode) -> String {
    // serde_json's pretty printer uses 2-space indentation
    serde_json::to_string_pretty(tree).unwrap_or_else(|_| "{}".to_string())
}

// =============================================================================
// Markdown
// =============================================================================

/// Markdown rendering: H1 for the root, one heading per node at level
/// depth+1 (capped at H6), summary and content as plain paragraphs, and a
/// provenance footer.
pub fn tree_to_markdown(stored: &StoredTree) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# {}\n", stored.tree.title);
    if let Some(summary) = &stored.tree.summary {
        let _ = writeln!(out, "{}\n", summary);
    }
    if let Some(content) = &stored.tree.content {
        let _ = writeln!(out, "{}\n", content);
    }

    for child in &stored.tree.children {
        render_markdown_node(child, 2, &mut out);
    }

    let _ = writeln!(out, "---\n");
    let _ = writeln!(
        out,
        "Generated on: {}",
        stored.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out, "Model: {}", stored.model);
    if !stored.source_files.is_empty() {
        let _ = writeln!(out, "Files: {}", stored.source_files.join(", "));
    }

    out
}

fn render_markdown_node(node: &KnowledgeNode, level: usize, out: &mut String) {
    let hashes = "#".repeat(level.min(markdown::MAX_HEADING_LEVEL));
    let _ = writeln!(out, "{} {}\n", hashes, node.title);

    if let Some(summary) = &node.summary {
        let _ = writeln!(out, "{}\n", summary);
    }
    if let Some(content) = &node.content {
        let _ = writeln!(out, "{}\n", content);
    }

    for child in &node.children {
        render_markdown_node(child, level + 1, out);
    }
}

// =============================================================================
// SVG
// =============================================================================

/// Inlined stylesheet for exported SVG files, so they render standalone.
const SVG_STYLESHEET: &str = "\
    .node circle {\n\
        fill: #557ba1;\n\
        stroke: #233749;\n\
        stroke-width: 1.5px;\n\
    }\n\
    .node text {\n\
        font: 12px sans-serif;\n\
    }\n\
    .link {\n\
        fill: none;\n\
        stroke: #ccc;\n\
        stroke-width: 1.5px;\n\
    }\n";

struct PlacedNode {
    title: String,
    x: f32,
    y: f32,
    has_children: bool,
}

struct Link {
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
}

/// Serialize a horizontal tree layout: depth maps to x, leaf order to y,
/// internal nodes centered over their children.
pub fn tree_to_svg(tree: &KnowledgeNode) -> String {
    let mut nodes = Vec::new();
    let mut links = Vec::new();
    let mut next_leaf_row = 0usize;

    layout(tree, 0, &mut next_leaf_row, &mut nodes, &mut links);

    let max_depth = tree.depth().saturating_sub(1) as f32;
    let rows = tree.leaf_count().max(1) as f32;
    let width = max_depth * svg::LEVEL_SPACING + 2.0 * svg::MARGIN + 160.0;
    let height = (rows - 1.0) * svg::LEAF_SPACING + 2.0 * svg::MARGIN;

    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width:.0}" height="{height:.0}" viewBox="0 0 {width:.0} {height:.0}">"#
    );
    let _ = writeln!(out, "<style>\n{}</style>", SVG_STYLESHEET);
    let _ = writeln!(out, r#"<g transform="translate({m},{m})">"#, m = svg::MARGIN);

    for link in &links {
        // cubic curve between levels, midpoint control points
        let mx = (link.x0 + link.x1) / 2.0;
        let _ = writeln!(
            out,
            r#"<path class="link" d="M{:.1},{:.1}C{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}"/>"#,
            link.x0, link.y0, mx, link.y0, mx, link.y1, link.x1, link.y1
        );
    }

    for node in &nodes {
        let (dx, anchor) = if node.has_children {
            (-10.0, "end")
        } else {
            (10.0, "start")
        };
        let _ = writeln!(out, r#"<g class="node" transform="translate({:.1},{:.1})">"#, node.x, node.y);
        let _ = writeln!(out, r#"<circle r="{}"/>"#, svg::NODE_RADIUS);
        let _ = writeln!(
            out,
            r#"<text dy=".35em" x="{dx}" text-anchor="{anchor}">{}</text>"#,
            escape_xml(&node.title)
        );
        let _ = writeln!(out, "</g>");
    }

    let _ = writeln!(out, "</g>");
    let _ = writeln!(out, "</svg>");
    out
}

/// Assign positions bottom-up: leaves take consecutive rows, parents sit at
/// the midpoint of their children. Returns this subtree's y coordinate.
fn layout(
    node: &KnowledgeNode,
    depth: usize,
    next_leaf_row: &mut usize,
    nodes: &mut Vec<PlacedNode>,
    links: &mut Vec<Link>,
) -> f32 {
    let x = depth as f32 * svg::LEVEL_SPACING;

    let y = if node.children.is_empty() {
        let row = *next_leaf_row;
        *next_leaf_row += 1;
        row as f32 * svg::LEAF_SPACING
    } else {
        let child_ys: Vec<f32> = node
            .children
            .iter()
            .map(|child| layout(child, depth + 1, next_leaf_row, nodes, links))
            .collect();
        let first = child_ys[0];
        let last = child_ys[child_ys.len() - 1];
        let y = (first + last) / 2.0;

        let child_x = (depth + 1) as f32 * svg::LEVEL_SPACING;
        for child_y in child_ys {
            links.push(Link {
                x0: x,
                y0: y,
                x1: child_x,
                y1: child_y,
            });
        }
        y
    };

    nodes.push(PlacedNode {
        title: node.title.clone(),
        x,
        y,
        has_children: !node.children.is_empty(),
    });
    y
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ModelId;
    use crate::types::TreeId;
    use chrono::Utc;

    fn stored(tree: KnowledgeNode) -> StoredTree {
        StoredTree {
            id: TreeId::new("tree-1-00000001"),
            tree,
            source_files: vec!["a.txt".to_string(), "b.md".to_string()],
            model: ModelId::GeminiFlash,
            created_at: Utc::now(),
        }
    }

    fn sample_tree() -> KnowledgeNode {
        let mut root = KnowledgeNode::branch(
            "Neural Networks",
            vec![
                KnowledgeNode::branch(
                    "Architectures",
                    vec![
                        KnowledgeNode::leaf("CNN"),
                        KnowledgeNode::leaf("RNN"),
                    ],
                ),
                KnowledgeNode::leaf("Training"),
            ],
        );
        root.summary = Some("Overview of neural networks".to_string());
        root.children[1].summary = Some("How networks learn".to_string());
        root.children[1].content = Some("Backpropagation with gradient descent".to_string());
        root
    }

    #[test]
    fn test_json_is_pretty_and_mirrors_tree() {
        let json = tree_to_json(&sample_tree());
        assert!(json.contains("  \"title\": \"Neural Networks\""));

        let parsed: KnowledgeNode = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sample_tree());
    }

    #[test]
    fn test_markdown_heading_levels_follow_depth() {
        let md = tree_to_markdown(&stored(sample_tree()));

        assert!(md.starts_with("# Neural Networks\n"));
        assert!(md.contains("\n## Architectures\n"));
        assert!(md.contains("\n### CNN\n"));
        assert!(md.contains("\n## Training\n"));
    }

    #[test]
    fn test_markdown_inlines_summary_and_content() {
        let md = tree_to_markdown(&stored(sample_tree()));
        assert!(md.contains("Overview of neural networks"));
        assert!(md.contains("How networks learn"));
        assert!(md.contains("Backpropagation with gradient descent"));
    }

    #[test]
    fn test_markdown_footer_carries_provenance() {
        let md = tree_to_markdown(&stored(sample_tree()));
        assert!(md.contains("Model: gemini-2.0-flash"));
        assert!(md.contains("Files: a.txt, b.md"));
    }

    #[test]
    fn test_markdown_heading_level_capped_at_six() {
        let mut node = KnowledgeNode::leaf("deep");
        for i in 0..8 {
            node = KnowledgeNode::branch(format!("level-{}", i), vec![node]);
        }
        let md = tree_to_markdown(&stored(node));
        assert!(md.contains("\n###### deep\n"));
        assert!(!md.contains("#######"));
    }

    #[test]
    fn test_svg_has_stylesheet_nodes_and_links() {
        let out = tree_to_svg(&sample_tree());

        assert!(out.starts_with("<svg "));
        assert!(out.contains("<style>"));
        assert!(out.contains(".node circle"));
        assert!(out.contains(">Neural Networks</text>"));
        assert!(out.contains(">CNN</text>"));
        // 5 nodes means 4 parent-child links
        assert_eq!(out.matches(r#"<path class="link""#).count(), 4);
        assert_eq!(out.matches(r#"<g class="node""#).count(), 5);
    }

    #[test]
    fn test_svg_escapes_markup_in_titles() {
        let tree = KnowledgeNode::leaf("A & B <tags>");
        let out = tree_to_svg(&tree);
        assert!(out.contains("A &amp; B &lt;tags&gt;"));
        assert!(!out.contains("<tags>"));
    }

    #[test]
    fn test_svg_single_node_tree() {
        let out = tree_to_svg(&KnowledgeNode::leaf("Only"));
        assert_eq!(out.matches(r#"<g class="node""#).count(), 1);
        assert_eq!(out.matches(r#"<path class="link""#).count(), 0);
    }
}
