//! CommonMark + GFM parsing through comrak.
//!
//! comrak builds its tree in an arena of `RefCell` nodes; this module lowers
//! that tree into the owned generic AST. Lowering is recursive and counts
//! container depth, so adversarially nested input is rejected with a parse
//! error instead of exhausting the stack further down the pipeline.

use super::MarkdownParser;
use crate::error::FormatError;
use crate::ir::{Inline, MdList, MdListItem, MdNode, MdTable, MdTableCell, MdTableRow};
use comrak::nodes::{AstNode, ListType, NodeValue};
use comrak::{parse_document, Arena, ComrakOptions};

/// Structured markdown parser backed by comrak.
#[derive(Debug, Clone)]
pub struct ComrakParser {
    max_depth: usize,
}

impl ComrakParser {
    pub fn new(max_depth: usize) -> Self {
        ComrakParser { max_depth }
    }
}

impl Default for ComrakParser {
    fn default() -> Self {
        ComrakParser::new(super::DEFAULT_MAX_NESTING_DEPTH)
    }
}

impl MarkdownParser for ComrakParser {
    fn name(&self) -> &str {
        "comrak"
    }

    fn parse(&self, source: &str) -> Result<Vec<MdNode>, FormatError> {
        let arena = Arena::new();
        let options = default_comrak_options();
        let root = parse_document(&arena, source, &options);

        let lowering = Lowering {
            max_depth: self.max_depth,
        };
        let mut nodes = Vec::new();
        for child in root.children() {
            if let Some(node) = lowering.block(child, 1)? {
                nodes.push(node);
            }
        }
        Ok(nodes)
    }
}

fn default_comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options
}

struct Lowering {
    max_depth: usize,
}

impl Lowering {
    fn check_depth(&self, depth: usize) -> Result<(), FormatError> {
        if depth > self.max_depth {
            return Err(FormatError::ParseError(format!(
                "markdown nests deeper than {} levels",
                self.max_depth
            )));
        }
        Ok(())
    }

    fn block<'a>(&self, node: &'a AstNode<'a>, depth: usize) -> Result<Option<MdNode>, FormatError> {
        self.check_depth(depth)?;
        let data = node.data.borrow();

        let lowered = match &data.value {
            NodeValue::Heading(heading) => MdNode::Heading {
                depth: heading.level,
                children: self.inlines(node, depth)?,
            },

            NodeValue::Paragraph => match lone_image(node) {
                Some(image) => image,
                None => MdNode::Paragraph {
                    children: self.inlines(node, depth)?,
                },
            },

            NodeValue::List(list) => {
                let mut items = Vec::new();
                for child in node.children() {
                    items.push(self.list_item(child, depth + 1)?);
                }
                MdNode::List(MdList {
                    ordered: matches!(list.list_type, ListType::Ordered),
                    items,
                })
            }

            NodeValue::CodeBlock(code_block) => {
                let lang = code_block
                    .info
                    .split_whitespace()
                    .next()
                    .map(str::to_string);
                MdNode::Code {
                    lang,
                    value: code_block.literal.clone(),
                }
            }

            NodeValue::BlockQuote => MdNode::Blockquote {
                children: self.blocks(node, depth + 1)?,
            },

            NodeValue::ThematicBreak => MdNode::ThematicBreak,

            NodeValue::Table(_) => {
                let mut rows = Vec::new();
                for row in node.children() {
                    let mut cells = Vec::new();
                    for cell in row.children() {
                        cells.push(MdTableCell {
                            children: self.inlines(cell, depth + 1)?,
                        });
                    }
                    rows.push(MdTableRow { cells });
                }
                MdNode::Table(MdTable { rows })
            }

            NodeValue::HtmlBlock(html) => MdNode::Html {
                value: html.literal.clone(),
            },

            NodeValue::Document => return Ok(None),

            other => {
                let kind = node_kind(other);
                log::warn!("unhandled markdown node '{kind}'");
                MdNode::Other {
                    kind: kind.to_string(),
                    text: collect_text(node),
                }
            }
        };
        Ok(Some(lowered))
    }

    fn blocks<'a>(&self, node: &'a AstNode<'a>, depth: usize) -> Result<Vec<MdNode>, FormatError> {
        let mut children = Vec::new();
        for child in node.children() {
            if let Some(lowered) = self.block(child, depth)? {
                children.push(lowered);
            }
        }
        Ok(children)
    }

    fn list_item<'a>(&self, node: &'a AstNode<'a>, depth: usize) -> Result<MdListItem, FormatError> {
        self.check_depth(depth)?;
        let checked = match &node.data.borrow().value {
            NodeValue::TaskItem(symbol) => Some(matches!(symbol, Some(c) if !c.is_whitespace())),
            _ => None,
        };
        Ok(MdListItem {
            checked,
            children: self.blocks(node, depth + 1)?,
        })
    }

    fn inlines<'a>(&self, node: &'a AstNode<'a>, depth: usize) -> Result<Vec<Inline>, FormatError> {
        let mut children = Vec::new();
        for child in node.children() {
            children.push(self.inline(child, depth + 1)?);
        }
        Ok(children)
    }

    fn inline<'a>(&self, node: &'a AstNode<'a>, depth: usize) -> Result<Inline, FormatError> {
        self.check_depth(depth)?;
        let data = node.data.borrow();

        let lowered = match &data.value {
            NodeValue::Text(text) => Inline::text(text.clone()),
            NodeValue::SoftBreak => Inline::text("\n"),
            NodeValue::LineBreak => Inline::Break,
            NodeValue::Code(code) => Inline::code(code.literal.clone()),
            NodeValue::Strong => Inline::strong(self.inlines(node, depth)?),
            NodeValue::Emph => Inline::emphasis(self.inlines(node, depth)?),
            NodeValue::Link(link) => Inline::link(link.url.clone(), self.inlines(node, depth)?),
            NodeValue::HtmlInline(html) => Inline::Html {
                value: html.clone(),
            },
            other => Inline::Other {
                kind: node_kind(other).to_string(),
                children: self.inlines(node, depth)?,
            },
        };
        Ok(lowered)
    }
}

/// mdast-style name for node kinds the lowering has no dedicated shape for.
fn node_kind(value: &NodeValue) -> &'static str {
    match value {
        NodeValue::Document => "root",
        NodeValue::FrontMatter(_) => "yaml",
        NodeValue::BlockQuote | NodeValue::MultilineBlockQuote(_) => "blockquote",
        NodeValue::List(_) => "list",
        NodeValue::Item(_) | NodeValue::TaskItem(_) => "listItem",
        NodeValue::DescriptionList => "descriptionList",
        NodeValue::DescriptionItem(_) => "descriptionItem",
        NodeValue::DescriptionTerm => "descriptionTerm",
        NodeValue::DescriptionDetails => "descriptionDetails",
        NodeValue::CodeBlock(_) => "code",
        NodeValue::HtmlBlock(_) | NodeValue::HtmlInline(_) => "html",
        NodeValue::Paragraph => "paragraph",
        NodeValue::Heading(_) => "heading",
        NodeValue::ThematicBreak => "thematicBreak",
        NodeValue::FootnoteDefinition(_) => "footnoteDefinition",
        NodeValue::Table(_) => "table",
        NodeValue::TableRow(_) => "tableRow",
        NodeValue::TableCell => "tableCell",
        NodeValue::Text(_) => "text",
        NodeValue::SoftBreak | NodeValue::LineBreak => "break",
        NodeValue::Code(_) => "inlineCode",
        NodeValue::Emph => "emphasis",
        NodeValue::Strong => "strong",
        NodeValue::Strikethrough => "strikethrough",
        NodeValue::Superscript => "superscript",
        NodeValue::Link(_) => "link",
        NodeValue::Image(_) => "image",
        NodeValue::FootnoteReference(_) => "footnoteReference",
        NodeValue::Math(_) => "math",
        NodeValue::Escaped => "escaped",
        NodeValue::WikiLink(_) => "wikiLink",
        NodeValue::Underline => "underline",
        NodeValue::SpoileredText => "spoiler",
        NodeValue::EscapedTag(_) => "escapedTag",
        #[allow(unreachable_patterns)]
        _ => "unknown",
    }
}

/// A paragraph holding nothing but one image becomes a block-level image.
fn lone_image<'a>(paragraph: &'a AstNode<'a>) -> Option<MdNode> {
    let mut found = None;
    for child in paragraph.children() {
        match &child.data.borrow().value {
            NodeValue::Image(link) if found.is_none() => {
                found = Some(MdNode::Image {
                    url: link.url.clone(),
                    alt: collect_text(child),
                    title: Some(link.title.clone()).filter(|title| !title.is_empty()),
                });
            }
            NodeValue::Text(text) if text.trim().is_empty() => {}
            NodeValue::SoftBreak | NodeValue::LineBreak => {}
            _ => return None,
        }
    }
    found
}

fn collect_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    collect_text_into(node, &mut text);
    text
}

fn collect_text_into<'a>(node: &'a AstNode<'a>, output: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(text) => output.push_str(text),
        NodeValue::Code(code) => output.push_str(&code.literal),
        NodeValue::CodeBlock(code) => output.push_str(&code.literal),
        NodeValue::SoftBreak | NodeValue::LineBreak => output.push(' '),
        _ => {
            for child in node.children() {
                collect_text_into(child, output);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Vec<MdNode> {
        ComrakParser::default().parse(source).unwrap()
    }

    #[test]
    fn headings_and_paragraphs() {
        let nodes = parse("# Title\n\nSome **bold** text\n");
        assert_eq!(
            nodes,
            vec![
                MdNode::Heading {
                    depth: 1,
                    children: vec![Inline::text("Title")],
                },
                MdNode::paragraph(vec![
                    Inline::text("Some "),
                    Inline::strong(vec![Inline::text("bold")]),
                    Inline::text(" text"),
                ]),
            ]
        );
    }

    #[test]
    fn nested_lists_keep_structure() {
        let nodes = parse("- A\n  - B\n");
        let MdNode::List(list) = &nodes[0] else {
            panic!("expected list, got {nodes:?}");
        };
        assert!(!list.ordered);
        assert_eq!(list.items.len(), 1);
        assert!(matches!(list.items[0].children[1], MdNode::List(_)));
    }

    #[test]
    fn task_items_carry_state() {
        let nodes = parse("- [x] Done\n- [ ] Todo\n");
        let MdNode::List(list) = &nodes[0] else {
            panic!("expected list, got {nodes:?}");
        };
        assert_eq!(list.items[0].checked, Some(true));
        assert_eq!(list.items[1].checked, Some(false));
    }

    #[test]
    fn code_block_language_is_first_info_word() {
        let nodes = parse("```rust ignore\nfn main() {}\n```\n");
        assert_eq!(
            nodes,
            vec![MdNode::Code {
                lang: Some("rust".into()),
                value: "fn main() {}\n".into(),
            }]
        );
    }

    #[test]
    fn lone_images_are_lifted() {
        let nodes = parse("![A cat](cat.png \"Kitty\")\n");
        assert_eq!(
            nodes,
            vec![MdNode::Image {
                url: "cat.png".into(),
                alt: "A cat".into(),
                title: Some("Kitty".into()),
            }]
        );
    }

    #[test]
    fn tables_become_rows_of_cells() {
        let nodes = parse("| a | b |\n| --- | --- |\n| 1 | 2 |\n");
        let MdNode::Table(table) = &nodes[0] else {
            panic!("expected table, got {nodes:?}");
        };
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].cells[1].children, vec![Inline::text("2")]);
    }

    #[test]
    fn strikethrough_is_an_unmodelled_inline() {
        let nodes = parse("~~gone~~\n");
        let MdNode::Paragraph { children } = &nodes[0] else {
            panic!("expected paragraph, got {nodes:?}");
        };
        assert!(matches!(&children[0], Inline::Other { kind, .. } if kind == "strikethrough"));
    }

    #[test]
    fn unmodelled_blocks_get_mdast_kinds() {
        let mut options = default_comrak_options();
        options.extension.footnotes = true;
        let arena = Arena::new();
        let root = parse_document(&arena, "Text[^1]\n\n[^1]: The note\n", &options);
        let lowering = Lowering { max_depth: 16 };
        let nodes: Vec<MdNode> = root
            .children()
            .filter_map(|child| lowering.block(child, 1).unwrap())
            .collect();

        let MdNode::Paragraph { children } = &nodes[0] else {
            panic!("expected paragraph, got {nodes:?}");
        };
        assert!(matches!(&children[1], Inline::Other { kind, .. } if kind == "footnoteReference"));
        assert!(matches!(
            &nodes[1],
            MdNode::Other { kind, text } if kind == "footnoteDefinition" && text == "The note"
        ));
    }

    #[test]
    fn inline_images_keep_their_kind() {
        let nodes = parse("see ![icon](i.png) here\n");
        let MdNode::Paragraph { children } = &nodes[0] else {
            panic!("expected paragraph, got {nodes:?}");
        };
        assert!(matches!(&children[1], Inline::Other { kind, .. } if kind == "image"));
    }

    #[test]
    fn excessive_nesting_is_an_error() {
        let deep = ">".repeat(100) + " deep\n";
        assert!(ComrakParser::new(16).parse(&deep).is_err());
        assert!(ComrakParser::new(128).parse(&deep).is_ok());
    }
}
