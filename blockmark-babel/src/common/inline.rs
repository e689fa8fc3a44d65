//! InlineRenderer: inline AST → inline-markup.
//!
//! Inline-markup is the editor's text representation: plain text with a small
//! HTML vocabulary for structure.
//!
//! | inline node  | markup                                   |
//! |--------------|------------------------------------------|
//! | text         | HTML-escaped text                        |
//! | strong       | `<b>…</b>`                               |
//! | emphasis     | `<i>…</i>`                               |
//! | inlineCode   | `<code class="inline-code">…</code>`     |
//! | link         | `<a href="url">…</a>`                    |
//! | break        | `<br>`                                   |
//! | html         | passed through verbatim                  |
//! | anything else| its children, rendered in place          |

use crate::ir::{Inline, MdNode};
use html_escape::{encode_double_quoted_attribute, encode_text};

/// Render a run of inline nodes to an inline-markup string.
pub fn render_inlines(nodes: &[Inline]) -> String {
    let mut out = String::new();
    for node in nodes {
        render_inline(node, &mut out);
    }
    out
}

fn render_inline(node: &Inline, out: &mut String) {
    match node {
        Inline::Text { value } => out.push_str(&encode_text(value)),
        Inline::Strong { children } => wrap("<b>", children, "</b>", out),
        Inline::Emphasis { children } => wrap("<i>", children, "</i>", out),
        Inline::InlineCode { value } => {
            out.push_str("<code class=\"inline-code\">");
            out.push_str(&encode_text(value));
            out.push_str("</code>");
        }
        Inline::Link { url, children } => {
            out.push_str("<a href=\"");
            out.push_str(&encode_double_quoted_attribute(url));
            out.push_str("\">");
            for child in children {
                render_inline(child, out);
            }
            out.push_str("</a>");
        }
        Inline::Break => out.push_str("<br>"),
        Inline::Html { value } => out.push_str(value),
        Inline::Other { children, .. } => {
            for child in children {
                render_inline(child, out);
            }
        }
    }
}

fn wrap(open: &str, children: &[Inline], close: &str, out: &mut String) {
    out.push_str(open);
    for child in children {
        render_inline(child, out);
    }
    out.push_str(close);
}

/// Flatten inline nodes to unformatted text (image alt text, diagnostics).
pub fn plain_text(nodes: &[Inline]) -> String {
    let mut out = String::new();
    collect_plain(nodes, &mut out);
    out
}

fn collect_plain(nodes: &[Inline], out: &mut String) {
    for node in nodes {
        match node {
            Inline::Text { value } | Inline::InlineCode { value } => out.push_str(value),
            Inline::Break => out.push('\n'),
            Inline::Html { .. } => {}
            Inline::Strong { children }
            | Inline::Emphasis { children }
            | Inline::Link { children, .. }
            | Inline::Other { children, .. } => collect_plain(children, out),
        }
    }
}

/// Best-effort inline-markup for any block node, used where a node has no
/// dedicated block mapping and its text should still survive.
pub fn node_markup(node: &MdNode) -> String {
    match node {
        MdNode::Heading { children, .. } | MdNode::Paragraph { children } => {
            render_inlines(children)
        }
        MdNode::Code { value, .. } => encode_text(value).into_owned(),
        MdNode::Blockquote { children } => join_nodes(children, "\n"),
        MdNode::List(list) => list
            .items
            .iter()
            .map(|item| join_nodes(&item.children, "\n"))
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        MdNode::Table(table) => table
            .rows
            .iter()
            .map(|row| {
                row.cells
                    .iter()
                    .map(|cell| render_inlines(&cell.children))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n"),
        MdNode::Image { alt, .. } => encode_text(alt).into_owned(),
        MdNode::Html { value } => value.clone(),
        MdNode::Other { text, .. } => encode_text(text).into_owned(),
        MdNode::ThematicBreak => String::new(),
    }
}

fn join_nodes(nodes: &[MdNode], separator: &str) -> String {
    nodes
        .iter()
        .map(node_markup)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}
