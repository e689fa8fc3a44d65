//! Treeviz formatter for the markdown AST
//!
//! Treeviz is a visual representation of the intermediate tree, used by
//! `inspect` to show what a parser made of a markdown file before any block
//! mapping happens.
//!
//! The node structure is encoded as box-drawing connectors, one node per line:
//! <prefix><connector> <icon> <label> (truncated to 30 characters)
//!
//! Example:
//!
//! ⧉ Document (3 nodes)
//! ├─ # H1 Title
//! ├─ ☰ 2 items
//! │ ├─ • first item
//! │ └─ • second
//! │   └─ ☰ 1 item
//! │     └─ • nested
//! └─ 𝒱 rust, 3 lines
//!
//! With `ast-full=true` the inline children of paragraphs, headings and cells
//! are listed too.

use super::icons::get_icon;
use crate::common::inline::{node_markup, plain_text};
use crate::ir::{Inline, MdNode};
use std::collections::HashMap;

const LABEL_WIDTH: usize = 30;

fn truncate(label: &str) -> String {
    let flat = label.replace('\n', " ");
    if flat.chars().count() <= LABEL_WIDTH {
        flat
    } else {
        let cut: String = flat.chars().take(LABEL_WIDTH - 1).collect();
        format!("{cut}…")
    }
}

fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

fn node_label(node: &MdNode) -> String {
    match node {
        MdNode::Heading { depth, children } => format!("H{depth} {}", plain_text(children)),
        MdNode::Paragraph { children } => plain_text(children),
        MdNode::List(list) => {
            let kind = if list.ordered { ", ordered" } else { "" };
            format!("{}{kind}", count(list.items.len(), "item"))
        }
        MdNode::Code { lang, value } => {
            let lines = count(value.lines().count(), "line");
            match lang {
                Some(lang) => format!("{lang}, {lines}"),
                None => lines,
            }
        }
        MdNode::Blockquote { children } => count(children.len(), "child"),
        MdNode::ThematicBreak => "---".to_string(),
        MdNode::Table(table) => {
            let columns = table.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0);
            format!("{} × {}", count(table.rows.len(), "row"), columns)
        }
        MdNode::Image { url, alt, .. } => format!("{alt} ({url})"),
        MdNode::Html { value } => value.trim().to_string(),
        MdNode::Other { kind, text } => format!("{kind}: {text}"),
    }
}

fn inline_label(inline: &Inline) -> (&'static str, String) {
    match inline {
        Inline::Text { value } => ("text", value.clone()),
        Inline::Strong { children } => ("strong", plain_text(children)),
        Inline::Emphasis { children } => ("emphasis", plain_text(children)),
        Inline::InlineCode { value } => ("inlineCode", value.clone()),
        Inline::Link { url, .. } => ("link", url.clone()),
        Inline::Break => ("break", String::new()),
        Inline::Html { value } => ("html", value.clone()),
        Inline::Other { children, .. } => ("other", plain_text(children)),
    }
}

struct Writer {
    out: String,
    include_inlines: bool,
}

impl Writer {
    fn line(&mut self, prefix: &str, is_last: bool, icon: &str, label: &str) -> String {
        let connector = if is_last { "└─" } else { "├─" };
        self.out
            .push_str(&format!("{prefix}{connector} {icon} {}\n", truncate(label)));
        format!("{prefix}{}", if is_last { "  " } else { "│ " })
    }

    fn nodes(&mut self, nodes: &[MdNode], prefix: &str) {
        for (i, node) in nodes.iter().enumerate() {
            self.node(node, prefix, i == nodes.len() - 1);
        }
    }

    fn node(&mut self, node: &MdNode, prefix: &str, is_last: bool) {
        let child_prefix = self.line(prefix, is_last, get_icon(node.kind()), &node_label(node));
        match node {
            MdNode::Heading { children, .. } | MdNode::Paragraph { children } => {
                if self.include_inlines {
                    self.inlines(children, &child_prefix);
                }
            }
            MdNode::Blockquote { children } => self.nodes(children, &child_prefix),
            MdNode::List(list) => {
                for (i, item) in list.items.iter().enumerate() {
                    let is_last = i == list.items.len() - 1;
                    let label = match item.checked {
                        Some(true) => format!("[x] {}", item_preview(&item.children)),
                        Some(false) => format!("[ ] {}", item_preview(&item.children)),
                        None => item_preview(&item.children),
                    };
                    let item_prefix =
                        self.line(&child_prefix, is_last, get_icon("listItem"), &label);
                    let include_inlines = self.include_inlines;
                    let nested: Vec<MdNode> = item
                        .children
                        .iter()
                        .filter(|c| include_inlines || !matches!(c, MdNode::Paragraph { .. }))
                        .cloned()
                        .collect();
                    self.nodes(&nested, &item_prefix);
                }
            }
            MdNode::Table(table) if self.include_inlines => {
                for (r, row) in table.rows.iter().enumerate() {
                    let is_last = r == table.rows.len() - 1;
                    let cells: Vec<String> =
                        row.cells.iter().map(|c| plain_text(&c.children)).collect();
                    self.line(&child_prefix, is_last, get_icon("tableRow"), &cells.join(" | "));
                }
            }
            _ => {}
        }
    }

    fn inlines(&mut self, inlines: &[Inline], prefix: &str) {
        for (i, inline) in inlines.iter().enumerate() {
            let (kind, label) = inline_label(inline);
            let child_prefix = self.line(prefix, i == inlines.len() - 1, get_icon(kind), &label);
            match inline {
                Inline::Strong { children }
                | Inline::Emphasis { children }
                | Inline::Link { children, .. }
                | Inline::Other { children, .. } => self.inlines(children, &child_prefix),
                _ => {}
            }
        }
    }
}

fn item_preview(children: &[MdNode]) -> String {
    children
        .iter()
        .find(|c| !matches!(c, MdNode::List(_)))
        .map(|c| match c {
            MdNode::Paragraph { children } => plain_text(children),
            other => html_escape::decode_html_entities(&node_markup(other)).into_owned(),
        })
        .unwrap_or_default()
}

pub fn to_treeviz_str(nodes: &[MdNode]) -> String {
    to_treeviz_str_with_params(nodes, &HashMap::new())
}

/// Render the tree with optional parameters.
///
/// - `"ast-full"`: when `"true"`, also lists inline nodes and table rows.
pub fn to_treeviz_str_with_params(nodes: &[MdNode], params: &HashMap<String, String>) -> String {
    let include_inlines = params
        .get("ast-full")
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false);

    let mut writer = Writer {
        out: format!("{} Document ({})\n", get_icon("root"), count(nodes.len(), "node")),
        include_inlines,
    };
    writer.nodes(nodes, "");
    writer.out
}
