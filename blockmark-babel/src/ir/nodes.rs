//! Core data structures for the generic markdown AST.
//!
//! Node and field names follow mdast so the tree reads the same whichever
//! parser produced it. Everything is owned; nesting is held by value.

use serde::Serialize;

/// A block-level markdown node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MdNode {
    Heading { depth: u8, children: Vec<Inline> },
    Paragraph { children: Vec<Inline> },
    List(MdList),
    Code { lang: Option<String>, value: String },
    Blockquote { children: Vec<MdNode> },
    ThematicBreak,
    Table(MdTable),
    Image {
        url: String,
        alt: String,
        title: Option<String>,
    },
    Html { value: String },
    /// Anything the parser recognised but the block model has no slot for.
    Other { kind: String, text: String },
}

impl MdNode {
    /// mdast-style node kind, used in logs and diagnostics.
    pub fn kind(&self) -> &str {
        match self {
            MdNode::Heading { .. } => "heading",
            MdNode::Paragraph { .. } => "paragraph",
            MdNode::List(_) => "list",
            MdNode::Code { .. } => "code",
            MdNode::Blockquote { .. } => "blockquote",
            MdNode::ThematicBreak => "thematicBreak",
            MdNode::Table(_) => "table",
            MdNode::Image { .. } => "image",
            MdNode::Html { .. } => "html",
            MdNode::Other { kind, .. } => kind.as_str(),
        }
    }

    pub fn paragraph(children: Vec<Inline>) -> Self {
        MdNode::Paragraph { children }
    }
}

/// A list with its items.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MdList {
    pub ordered: bool,
    pub items: Vec<MdListItem>,
}

/// A list item: block children (usually a paragraph, maybe a nested list).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MdListItem {
    /// `Some` for task items, carrying the checkbox state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    pub children: Vec<MdNode>,
}

/// A table, header row first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MdTable {
    pub rows: Vec<MdTableRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MdTableRow {
    pub cells: Vec<MdTableCell>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MdTableCell {
    pub children: Vec<Inline>,
}

/// Inline (phrasing) content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Inline {
    Text { value: String },
    Strong { children: Vec<Inline> },
    Emphasis { children: Vec<Inline> },
    InlineCode { value: String },
    Link {
        url: String,
        children: Vec<Inline>,
    },
    /// Hard line break.
    Break,
    Html { value: String },
    /// Unmodelled inline kinds (strikethrough, inline images...) keep their children.
    Other { kind: String, children: Vec<Inline> },
}

impl Inline {
    pub fn text(value: impl Into<String>) -> Self {
        Inline::Text {
            value: value.into(),
        }
    }

    pub fn strong(children: Vec<Inline>) -> Self {
        Inline::Strong { children }
    }

    pub fn emphasis(children: Vec<Inline>) -> Self {
        Inline::Emphasis { children }
    }

    pub fn code(value: impl Into<String>) -> Self {
        Inline::InlineCode {
            value: value.into(),
        }
    }

    pub fn link(url: impl Into<String>, children: Vec<Inline>) -> Self {
        Inline::Link {
            url: url.into(),
            children,
        }
    }
}
