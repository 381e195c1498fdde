//! Markup truncation to a character budget
//!
//! Only text-node characters count against the budget; tag names and
//! attributes are free. Structural tags are never cut themselves, only
//! their descendant text is trimmed, so the output is always a well-formed
//! tree. Input that fits its budget round-trips unchanged.

use crate::constants::TRUNCATION_NOTICE;
use crate::content::{escape_attr, escape_text};
use ego_tree::NodeRef;
use scraper::{Html, Node};

/// Elements serialized without a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Owned markup tree the budget walk operates on. Built once per call from
/// the parsed fragment; comments and doctypes do not survive the rebuild.
#[derive(Debug, Clone)]
enum MarkupNode {
    Element {
        name: String,
        attrs: Vec<(String, String)>,
        children: Vec<MarkupNode>,
    },
    Text(String),
}

impl MarkupNode {
    fn text_len(&self) -> usize {
        match self {
            MarkupNode::Text(text) => text.chars().count(),
            MarkupNode::Element { children, .. } => children.iter().map(|c| c.text_len()).sum(),
        }
    }
}

/// Truncate an HTML-like fragment to `limit` text characters, preserving a
/// well-formed tag tree. Appends a fixed notice paragraph when content was
/// actually removed. Empty input yields empty output; malformed input is
/// repaired by the parser's recovery rules.
pub fn truncate_markup(markup: &str, limit: usize) -> String {
    if markup.trim().is_empty() {
        return String::new();
    }

    let nodes = parse_fragment(markup);
    let (mut kept, _, truncated) = trim_nodes(nodes, limit, 0);

    if truncated {
        kept.push(MarkupNode::Element {
            name: "p".to_string(),
            attrs: Vec::new(),
            children: vec![MarkupNode::Text(TRUNCATION_NOTICE.to_string())],
        });
    }

    serialize_nodes(&kept)
}

/// Parse a fragment into the owned tree. html5ever wraps fragment content
/// in a synthetic `<html>` element; unwrap it.
fn parse_fragment(markup: &str) -> Vec<MarkupNode> {
    let html = Html::parse_fragment(markup);
    let root = html.tree.root();

    let mut top_level = Vec::new();
    for child in root.children() {
        match child.value() {
            Node::Element(el) if el.name() == "html" => {
                for grandchild in child.children() {
                    if let Some(node) = convert(grandchild) {
                        top_level.push(node);
                    }
                }
            }
            _ => {
                if let Some(node) = convert(child) {
                    top_level.push(node);
                }
            }
        }
    }
    top_level
}

fn convert(node: NodeRef<'_, Node>) -> Option<MarkupNode> {
    match node.value() {
        Node::Text(text) => Some(MarkupNode::Text(text.text.to_string())),
        Node::Element(el) => {
            let children = node.children().filter_map(convert).collect();
            Some(MarkupNode::Element {
                name: el.name().to_string(),
                attrs: el
                    .attrs()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                children,
            })
        }
        _ => None,
    }
}

/// Depth-first walk threading the consumed-character count as an explicit
/// accumulator. Returns the surviving nodes, the updated count, and whether
/// any text was removed.
fn trim_nodes(
    nodes: Vec<MarkupNode>,
    limit: usize,
    consumed: usize,
) -> (Vec<MarkupNode>, usize, bool) {
    let mut kept = Vec::new();
    let mut consumed = consumed;
    let mut truncated = false;

    for node in nodes {
        if consumed >= limit {
            // Budget exhausted: everything past the cut goes, text-free
            // nodes included. Only input that fits exactly, with nothing
            // removed, keeps its trailing empty nodes (idempotence on
            // within-budget input).
            if node.text_len() > 0 {
                truncated = true;
            } else if !truncated {
                kept.push(node);
            }
            continue;
        }

        match node {
            MarkupNode::Text(text) => {
                let len = text.chars().count();
                if consumed + len > limit {
                    let prefix: String = text.chars().take(limit - consumed).collect();
                    consumed = limit;
                    truncated = true;
                    kept.push(MarkupNode::Text(prefix));
                } else {
                    consumed += len;
                    kept.push(MarkupNode::Text(text));
                }
            }
            MarkupNode::Element {
                name,
                attrs,
                children,
            } => {
                let (children, updated, child_truncated) = trim_nodes(children, limit, consumed);
                consumed = updated;
                truncated |= child_truncated;
                kept.push(MarkupNode::Element {
                    name,
                    attrs,
                    children,
                });
            }
        }
    }

    (kept, consumed, truncated)
}

fn serialize_nodes(nodes: &[MarkupNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        serialize_node(node, &mut out);
    }
    out
}

fn serialize_node(node: &MarkupNode, out: &mut String) {
    match node {
        MarkupNode::Text(text) => out.push_str(&escape_text(text)),
        MarkupNode::Element {
            name,
            attrs,
            children,
        } => {
            out.push('<');
            out.push_str(name);
            for (key, value) in attrs {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&name.as_str()) {
                return;
            }

            for child in children {
                serialize_node(child, out);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
    }
}
