//! Markdown parsing (Markdown → block-document import)
//!
//! Pipeline: markdown string → [`MarkdownParser`] → generic AST ([`crate::ir`])
//! → blocks. The parser is injected; this module only walks the AST.
//!
//! Each top-level AST node yields zero or one block. Consecutive checklist
//! blocks that came from paragraph text are merged afterwards.
//!
//! Import never fails. When the parser cannot build a tree at all, the whole
//! input comes back as a single paragraph holding the raw text.

use super::parsers::{MarkdownParser, ParserChoice, DEFAULT_MAX_NESTING_DEPTH};
use super::serializer::{
    CAPTION_PREFIX, UNKNOWN_BLOCK_MARKER, UNSUPPORTED_BLOCK_MARKER, WARNING_SIGN,
};
use crate::common::inline::{node_markup, render_inlines};
use crate::common::lists::{list_style, reconstruct_list};
use crate::common::table::extract_table;
use crate::document::{
    Block, BlockData, ChecklistData, ChecklistItem, CodeData, Document, ImageData, ListData,
    ListStyle, QuoteData, RawData, TableData, WarningData,
};
use crate::error::FormatError;
use crate::ir::{MdList, MdNode};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A paragraph line that still reads as a task item.
///
/// This also fires on prose that happens to start with `- [ ]`; kept for
/// compatibility with documents written by earlier exporters.
static CHECKLIST_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-*+] \[( |x|X)\] (.+)$").expect("checklist pattern is valid"));

static WARNING_TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^{WARNING_SIGN}\s*<b>(.*)</b>\s*$")).expect("warning pattern is valid")
});

/// Options for markdown import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportOptions {
    pub parser: ParserChoice,
    pub max_nesting_depth: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions {
            parser: ParserChoice::Auto,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

/// Converts markdown into block documents with an injected parser.
pub struct BlockImporter {
    parser: Box<dyn MarkdownParser>,
}

impl BlockImporter {
    pub fn new(parser: Box<dyn MarkdownParser>) -> Self {
        BlockImporter { parser }
    }

    pub fn from_options(options: &ImportOptions) -> Self {
        BlockImporter::new(options.parser.build(options.max_nesting_depth))
    }

    pub fn parser_name(&self) -> &str {
        self.parser.name()
    }

    /// Run only the parser, exposing the intermediate AST.
    pub fn parse_tree(&self, source: &str) -> Result<Vec<MdNode>, FormatError> {
        self.parser.parse(source)
    }

    /// Convert `source` into a document. Never fails.
    pub fn import(&self, source: &str) -> Document {
        if source.trim().is_empty() {
            return Document::default();
        }

        match self.parser.parse(source) {
            Ok(nodes) => Document::new(nodes_to_blocks(&nodes)),
            Err(err) => {
                log::debug!(
                    "{} parser failed ({err}); keeping input as one paragraph",
                    self.parser.name()
                );
                Document::new(vec![Block::new(BlockData::paragraph(source))])
            }
        }
    }
}

impl Default for BlockImporter {
    fn default() -> Self {
        BlockImporter::from_options(&ImportOptions::default())
    }
}

impl std::fmt::Debug for BlockImporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockImporter")
            .field("parser", &self.parser.name())
            .finish()
    }
}

/// Parse markdown into a block document using the parser named in `options`.
pub fn parse_from_markdown(source: &str, options: &ImportOptions) -> Document {
    BlockImporter::from_options(options).import(source)
}

/// Map top-level AST nodes to blocks.
pub fn nodes_to_blocks(nodes: &[MdNode]) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();
    let mut previous_from_paragraph = false;

    for node in nodes {
        if let MdNode::Paragraph { children } = node {
            let text = render_inlines(children);
            if let Some(items) = paragraph_checklist(&text) {
                match blocks.last_mut() {
                    Some(Block {
                        data: BlockData::Checklist(list),
                        ..
                    }) if previous_from_paragraph => list.items.extend(items),
                    _ => blocks.push(Block::new(BlockData::Checklist(ChecklistData { items }))),
                }
                previous_from_paragraph = true;
                continue;
            }
        }

        previous_from_paragraph = false;
        if let Some(data) = node_to_block(node) {
            blocks.push(Block::new(data));
        }
    }
    blocks
}

fn node_to_block(node: &MdNode) -> Option<BlockData> {
    match node {
        MdNode::Heading { depth, children } => {
            let text = render_inlines(children);
            let text = text.trim();
            (!text.is_empty()).then(|| BlockData::header(text, i64::from(*depth)))
        }

        MdNode::Paragraph { children } => {
            let text = render_inlines(children);
            (!text.trim().is_empty()).then(|| BlockData::paragraph(text))
        }

        MdNode::List(list) => list_block(list),

        MdNode::Code { lang, value } => Some(BlockData::Code(CodeData {
            code: value.strip_suffix('\n').unwrap_or(value).to_string(),
            language: lang.clone().filter(|lang| !lang.trim().is_empty()),
        })),

        MdNode::Blockquote { children } => quote_block(children),

        MdNode::ThematicBreak => Some(BlockData::Delimiter),

        MdNode::Table(table) => {
            let content = extract_table(table);
            (!content.is_empty()).then(|| {
                BlockData::Table(TableData {
                    with_headings: true,
                    content,
                })
            })
        }

        MdNode::Image { url, alt, title } => Some(BlockData::Image(ImageData {
            url: url.clone(),
            file: None,
            caption: title
                .clone()
                .filter(|t| !t.is_empty())
                .or_else(|| (!alt.is_empty()).then(|| alt.clone())),
            alt: (!alt.is_empty()).then(|| alt.clone()),
        })),

        MdNode::Html { value } => {
            let trimmed = value.trim_start();
            if trimmed.starts_with(UNKNOWN_BLOCK_MARKER)
                || trimmed.starts_with(UNSUPPORTED_BLOCK_MARKER)
            {
                log::debug!("dropping unknown-block marker on import");
                return None;
            }
            let html = value.trim_end();
            (!html.is_empty()).then(|| {
                BlockData::Raw(RawData {
                    html: html.to_string(),
                })
            })
        }

        MdNode::Other { kind, .. } => {
            let text = node_markup(node);
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            log::debug!("importing unmapped '{kind}' node as a paragraph");
            Some(BlockData::paragraph(format!("[{kind}] {text}")))
        }
    }
}

fn list_block(list: &MdList) -> Option<BlockData> {
    let style = list_style(list);
    let items = reconstruct_list(list);
    if items.is_empty() {
        return None;
    }

    let flat = items.iter().all(|item| item.items.is_empty());
    if style == ListStyle::Checklist && !list.ordered && flat {
        let items = items
            .into_iter()
            .map(|item| ChecklistItem::new(item.content, item.meta.checked.unwrap_or(false)))
            .collect();
        return Some(BlockData::Checklist(ChecklistData { items }));
    }

    Some(BlockData::List(ListData { style, items }))
}

fn quote_block(children: &[MdNode]) -> Option<BlockData> {
    let text = children
        .iter()
        .map(|child| match child {
            MdNode::Paragraph { children } => render_inlines(children),
            other => node_markup(other),
        })
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    if text.trim().is_empty() {
        return None;
    }

    let mut lines: Vec<&str> = text.lines().collect();

    if lines.len() > 1 {
        if let Some(caps) = WARNING_TITLE_RE.captures(lines[0]) {
            let title = caps.get(1).map_or("", |m| m.as_str()).trim();
            let message = lines[1..]
                .iter()
                .filter(|line| !line.trim().is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join("\n");
            return Some(BlockData::Warning(WarningData {
                title: (!title.is_empty()).then(|| title.to_string()),
                message,
            }));
        }
    }

    let mut caption = None;
    if lines.len() > 1 {
        if let Some(author) = lines.last().and_then(|line| line.strip_prefix(CAPTION_PREFIX)) {
            caption = Some(author.trim().to_string());
            lines.pop();
        }
    }

    Some(BlockData::Quote(QuoteData {
        text: lines.join("\n"),
        caption,
    }))
}

/// Checklist items when every line of a rendered paragraph is a task line.
fn paragraph_checklist(text: &str) -> Option<Vec<ChecklistItem>> {
    let mut items = Vec::new();
    for line in text.lines() {
        let caps = CHECKLIST_LINE_RE.captures(line)?;
        let checked = caps.get(1).is_some_and(|m| m.as_str() != " ");
        let item_text = caps.get(2).map_or("", |m| m.as_str()).trim();
        items.push(ChecklistItem::new(item_text, checked));
    }
    (!items.is_empty()).then_some(items)
}
