//! Markdown serialization (blocks → markdown export)
//!
//! Converts a block-document to CommonMark text.
//! Pipeline: Block → per-type rule → inline-markup read back into inline nodes
//! → markdown inline syntax → joined block strings.
//!
//! Serialization never fails. A block missing fields contributes empty or
//! best-effort output, and an unknown block type leaves an HTML comment marker
//! plus whatever text it carried.

use crate::common::escape::{
    code_fence, code_span, escape_inline, escape_line_starts, link_destination,
    protect_structure, TextContext,
};
use crate::common::inline::plain_text;
use crate::common::markup::parse_markup;
use crate::document::lenient::value_to_string;
use crate::document::{
    Block, BlockData, ChecklistData, CodeData, Document, EmbedData, ImageData, LinkToolData,
    ListData, ListItem, ListStyle, QuoteData, TableData, WarningData,
};
use crate::ir::Inline;
use serde_json::Value;

/// Prefix of the comment left for a block type the writer has no rule for.
pub const UNKNOWN_BLOCK_MARKER: &str = "<!-- Unknown block type:";
/// Prefix of the comment left for an unknown block type that carried no text.
pub const UNSUPPORTED_BLOCK_MARKER: &str = "<!-- Unsupported block type:";

/// Attribution prefix of a quote caption line.
pub const CAPTION_PREFIX: &str = "— ";
/// Leading sign of a warning block's title line.
pub const WARNING_SIGN: &str = "⚠️";

/// Knobs for markdown export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Backslash-escape markdown-significant characters in block text.
    pub escape_text: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions { escape_text: true }
    }
}

/// Serialize a block-document to markdown.
///
/// Blocks are separated by one blank line. The result ends with exactly one
/// newline, or is empty when no block produced output.
pub fn serialize_to_markdown(doc: &Document, options: &ExportOptions) -> String {
    let writer = BlockWriter { options };
    let mut parts: Vec<String> = Vec::with_capacity(doc.blocks.len());
    let mut previous_list: Option<bool> = None;

    for block in &doc.blocks {
        // Two adjacent lists of the same kind would merge on re-parse; a
        // different marker character starts a new list.
        let list_kind = list_kind(block);
        let alternate = list_kind.is_some() && list_kind == previous_list;

        let rendered = writer.block(block, alternate);
        if rendered.trim().is_empty() {
            log::debug!("block of type '{}' produced no output", block.kind());
            continue;
        }
        previous_list = if alternate { None } else { list_kind };
        parts.push(rendered);
    }

    let joined = parts.join("\n\n");
    let trimmed = joined.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n")
    }
}

/// `Some(ordered)` for blocks written as markdown lists.
fn list_kind(block: &Block) -> Option<bool> {
    match &block.data {
        BlockData::List(list) => Some(list.style == ListStyle::Ordered),
        BlockData::Checklist(_) => Some(false),
        _ => None,
    }
}

struct BlockWriter<'a> {
    options: &'a ExportOptions,
}

impl BlockWriter<'_> {
    fn block(&self, block: &Block, alternate: bool) -> String {
        match &block.data {
            BlockData::Paragraph(data) => self.text_block(&data.text),
            BlockData::Header(data) => self.header(&data.text, data.level),
            BlockData::List(data) => self.list(data, alternate),
            BlockData::Code(data) => code_block(data),
            BlockData::Quote(data) => self.quote(data),
            BlockData::Delimiter => "---".to_string(),
            BlockData::Table(data) => self.table(data),
            BlockData::Checklist(data) => self.checklist(data, alternate),
            BlockData::Image(data) => self.image(data),
            BlockData::Embed(data) => self.embed(data),
            BlockData::LinkTool(data) => self.link_tool(data),
            BlockData::Raw(data) => data.html.trim_end().to_string(),
            BlockData::Warning(data) => self.warning(data),
            BlockData::Unknown { kind, data } => self.unknown(kind, data),
        }
    }

    /// Inline-markup → markdown for a given context, without line-start handling.
    fn inline(&self, markup: &str, context: TextContext) -> String {
        let mut nodes = parse_markup(markup);
        while matches!(nodes.last(), Some(Inline::Break)) {
            nodes.pop();
        }
        let writer = InlineWriter {
            escape: self.options.escape_text,
            context,
        };
        writer.write(&nodes).trim_end().to_string()
    }

    /// Inline-markup that occupies whole lines of block content.
    fn lines(&self, markup: &str) -> String {
        let text = self.inline(markup, TextContext::Block);
        if self.options.escape_text {
            escape_line_starts(&text)
        } else {
            text
        }
    }

    fn text_block(&self, markup: &str) -> String {
        self.lines(markup)
    }

    fn header(&self, markup: &str, level: i64) -> String {
        let mut text = self.inline(markup, TextContext::Heading).trim().to_string();
        if text.is_empty() {
            return String::new();
        }
        if self.options.escape_text && text.ends_with('#') {
            // A trailing run of `#` would read as a closing sequence.
            let run_start = text.trim_end_matches('#').len();
            text.insert(run_start, '\\');
        }
        let level = level.clamp(1, 6) as usize;
        format!("{} {}", "#".repeat(level), text)
    }

    fn list(&self, data: &ListData, alternate: bool) -> String {
        let mut lines = Vec::new();
        self.list_items(&data.items, data.style, 0, alternate, &mut lines);
        lines.join("\n")
    }

    fn list_items(
        &self,
        items: &[ListItem],
        style: ListStyle,
        indent: usize,
        alternate: bool,
        lines: &mut Vec<String>,
    ) {
        for (index, item) in items.iter().enumerate() {
            let bullet = match style {
                ListStyle::Ordered if alternate => format!("{})", index + 1),
                ListStyle::Ordered => format!("{}.", index + 1),
                ListStyle::Checklist => {
                    let mark = if item.meta.checked.unwrap_or(false) {
                        'x'
                    } else {
                        ' '
                    };
                    format!("{} [{mark}]", bullet_char(alternate))
                }
                ListStyle::Unordered => bullet_char(alternate).to_string(),
            };

            let content = self.lines(&item.content);
            let line = format!("{}{} {}", " ".repeat(indent), bullet, content);
            lines.push(line.trim_end().to_string());

            if !item.items.is_empty() {
                // Children sit under the item's content column.
                let child_indent = match style {
                    ListStyle::Ordered => indent + bullet.len() + 1,
                    _ => indent + 2,
                };
                let child_style = item.style.unwrap_or(style);
                self.list_items(&item.items, child_style, child_indent, false, lines);
            }
        }
    }

    fn quote(&self, data: &QuoteData) -> String {
        let mut lines: Vec<String> = Vec::new();
        let text = self.lines(&data.text);
        if !text.trim().is_empty() {
            lines.extend(text.split('\n').map(quote_line));
        }
        if let Some(caption) = data.caption.as_deref() {
            let caption = self.inline(caption, TextContext::Heading);
            if !caption.trim().is_empty() {
                lines.push(">".to_string());
                lines.push(format!("> {CAPTION_PREFIX}{}", caption.trim()));
            }
        }
        lines.join("\n")
    }

    fn warning(&self, data: &WarningData) -> String {
        let message = self.lines(&data.message);
        if message.trim().is_empty() {
            return String::new();
        }
        let title = data
            .title
            .as_deref()
            .map(|title| self.inline(title, TextContext::Heading))
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| "Warning".to_string());

        let mut lines = vec![format!("> {WARNING_SIGN} **{}**", title.trim()), ">".to_string()];
        lines.extend(message.split('\n').map(quote_line));
        lines.join("\n")
    }

    fn table(&self, data: &TableData) -> String {
        let width = data.content.iter().map(Vec::len).max().unwrap_or(0);
        if width == 0 {
            return String::new();
        }

        let mut rows = Vec::with_capacity(data.content.len() + 1);
        for (index, row) in data.content.iter().enumerate() {
            let cells: Vec<String> = (0..width)
                .map(|column| {
                    let cell = row.get(column).map(String::as_str).unwrap_or("");
                    self.inline(cell, TextContext::TableCell)
                })
                .collect();
            rows.push(format!("| {} |", cells.join(" | ")));
            if index == 0 {
                rows.push(format!("| {} |", vec!["---"; width].join(" | ")));
            }
        }
        rows.join("\n")
    }

    fn checklist(&self, data: &ChecklistData, alternate: bool) -> String {
        data.items
            .iter()
            .filter_map(|item| {
                let text = self.lines(&item.text);
                if text.trim().is_empty() {
                    return None;
                }
                let mark = if item.checked { 'x' } else { ' ' };
                Some(format!("{} [{mark}] {text}", bullet_char(alternate)))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn image(&self, data: &ImageData) -> String {
        let url = data.source_url();
        if url.is_empty() {
            return String::new();
        }
        let caption = data
            .caption
            .as_deref()
            .map(|caption| plain_text(&parse_markup(caption)))
            .unwrap_or_default();
        let alt = data
            .alt
            .as_deref()
            .map(|alt| plain_text(&parse_markup(alt)))
            .filter(|alt| !alt.is_empty())
            .unwrap_or_else(|| {
                if caption.is_empty() {
                    "Image".to_string()
                } else {
                    caption.clone()
                }
            });

        let mut out = format!(
            "![{}]({})",
            self.plain(&alt, TextContext::Heading),
            link_destination(url)
        );
        if !caption.is_empty() && caption != alt {
            out.push_str(&self.italic_line(data.caption.as_deref().unwrap_or_default()));
        }
        out
    }

    fn embed(&self, data: &EmbedData) -> String {
        if data.source.is_empty() {
            return String::new();
        }
        let mut out = format!("[Embedded content]({})", link_destination(&data.source));
        if let Some(caption) = data.caption.as_deref() {
            out.push_str(&self.italic_line(caption));
        }
        out
    }

    fn link_tool(&self, data: &LinkToolData) -> String {
        if data.link.is_empty() {
            return String::new();
        }
        let title = data
            .title()
            .map(|title| self.inline(title, TextContext::Heading))
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| self.plain(&data.link, TextContext::Heading));
        let mut out = format!("[{}]({})", title.trim(), link_destination(&data.link));
        if let Some(description) = data.description() {
            let description = self.lines(description);
            if !description.trim().is_empty() {
                out.push_str("\n\n");
                out.push_str(&description);
            }
        }
        out
    }

    fn unknown(&self, kind: &str, data: &Value) -> String {
        let fallback = ["text", "content", "html"]
            .iter()
            .filter_map(|key| data.get(key))
            .map(value_to_string)
            .find(|text| !text.trim().is_empty());

        match fallback {
            Some(text) => {
                log::debug!("writing unknown block type '{kind}' with fallback text");
                format!("{UNKNOWN_BLOCK_MARKER} {kind} -->\n{}", self.lines(&text))
            }
            None => format!("{UNSUPPORTED_BLOCK_MARKER} {kind} -->"),
        }
    }

    /// A caption paragraph in italics, preceded by a blank line.
    fn italic_line(&self, markup: &str) -> String {
        let caption = self.inline(markup, TextContext::Heading);
        let caption = caption.trim();
        if caption.is_empty() {
            String::new()
        } else {
            format!("\n\n*{caption}*")
        }
    }

    fn plain(&self, text: &str, context: TextContext) -> String {
        if self.options.escape_text {
            escape_inline(text, context).into_owned()
        } else {
            protect_structure(text, context).into_owned()
        }
    }
}

fn bullet_char(alternate: bool) -> char {
    if alternate {
        '*'
    } else {
        '-'
    }
}

fn quote_line(line: &str) -> String {
    if line.is_empty() {
        ">".to_string()
    } else {
        format!("> {line}")
    }
}

fn code_block(data: &CodeData) -> String {
    let code = data.code.strip_suffix('\n').unwrap_or(&data.code);
    if code.is_empty() {
        return String::new();
    }
    let fence = code_fence(code);
    let language = data.language.as_deref().unwrap_or("").trim();
    format!("{fence}{language}\n{code}\n{fence}")
}

/// Writes inline nodes as markdown inline syntax.
struct InlineWriter {
    escape: bool,
    context: TextContext,
}

impl InlineWriter {
    fn write(&self, nodes: &[Inline]) -> String {
        let mut out = String::new();
        for node in nodes {
            self.write_node(node, &mut out);
        }
        out
    }

    fn write_node(&self, node: &Inline, out: &mut String) {
        match node {
            Inline::Text { value } => {
                let text = if self.escape {
                    escape_inline(value, self.context)
                } else {
                    protect_structure(value, self.context)
                };
                out.push_str(&text);
            }
            Inline::Strong { children } => self.write_delimited("**", children, out),
            Inline::Emphasis { children } => self.write_delimited("*", children, out),
            Inline::InlineCode { value } => out.push_str(&code_span(value, self.context)),
            Inline::Link { url, children } => {
                out.push('[');
                out.push_str(self.write(children).trim());
                out.push_str("](");
                out.push_str(&link_destination(url));
                out.push(')');
            }
            Inline::Break => match self.context {
                TextContext::Block => out.push_str("\\\n"),
                TextContext::Heading => out.push(' '),
                TextContext::TableCell => out.push_str("<br>"),
            },
            Inline::Html { value } => out.push_str(&protect_structure(value, self.context)),
            Inline::Other { children, .. } => {
                for child in children {
                    self.write_node(child, out);
                }
            }
        }
    }

    /// Emphasis markers must hug non-space characters, so surrounding
    /// whitespace moves outside them.
    fn write_delimited(&self, marker: &str, children: &[Inline], out: &mut String) {
        let inner = self.write(children);
        let body = inner.trim();
        if body.is_empty() {
            out.push_str(&inner);
            return;
        }
        let leading = &inner[..inner.len() - inner.trim_start().len()];
        let trailing = &inner[inner.trim_end().len()..];
        out.push_str(leading);
        out.push_str(marker);
        out.push_str(body);
        out.push_str(marker);
        out.push_str(trailing);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ChecklistItem, RawData};
    use serde_json::json;

    fn md(blocks: Vec<BlockData>) -> String {
        let doc = Document::new(blocks.into_iter().map(Block::new).collect());
        serialize_to_markdown(&doc, &ExportOptions::default())
    }

    fn md_raw(blocks: Vec<BlockData>) -> String {
        let doc = Document::new(blocks.into_iter().map(Block::new).collect());
        serialize_to_markdown(&doc, &ExportOptions { escape_text: false })
    }

    #[test]
    fn empty_document_is_empty_string() {
        assert_eq!(md(vec![]), "");
        assert_eq!(md(vec![BlockData::paragraph("")]), "");
    }

    #[test]
    fn inline_markup_becomes_markdown() {
        assert_eq!(
            md(vec![BlockData::paragraph(
                "Some <b>bold</b>, <i>italic</i>, <code class=\"inline-code\">code</code> and <a href=\"https://x.io\">a link</a>"
            )]),
            "Some **bold**, *italic*, `code` and [a link](https://x.io)\n"
        );
    }

    #[test]
    fn emphasis_whitespace_moves_outside_markers() {
        assert_eq!(md(vec![BlockData::paragraph("a<b> b </b>c")]), "a **b** c\n");
        assert_eq!(md(vec![BlockData::paragraph("x<i> </i>y")]), "x y\n");
    }

    #[test]
    fn breaks_are_hard_breaks_except_at_the_end() {
        assert_eq!(
            md(vec![BlockData::paragraph("one<br>two<br>")]),
            "one\\\ntwo\n"
        );
    }

    #[test]
    fn entities_are_decoded_then_escaped() {
        assert_eq!(
            md(vec![BlockData::paragraph("1 &lt; 2 &amp;&amp; a*b")]),
            "1 \\< 2 && a\\*b\n"
        );
        assert_eq!(md_raw(vec![BlockData::paragraph("a*b")]), "a*b\n");
    }

    #[test]
    fn line_starts_are_escaped_in_paragraphs() {
        assert_eq!(md(vec![BlockData::paragraph("# hash\n- dash")]), "\\# hash\n\\- dash\n");
    }

    #[test]
    fn header_levels_are_clamped() {
        assert_eq!(md(vec![BlockData::header("Deep", 9)]), "###### Deep\n");
        assert_eq!(md(vec![BlockData::header("Shallow", 0)]), "# Shallow\n");
        assert_eq!(md(vec![BlockData::header("Negative", -3)]), "# Negative\n");
        assert_eq!(md(vec![BlockData::header("", 2)]), "");
    }

    #[test]
    fn header_trailing_hashes_are_escaped() {
        assert_eq!(md(vec![BlockData::header("C#", 2)]), "## C\\#\n");
    }

    #[test]
    fn ordered_lists_number_per_level() {
        let data = ListData {
            style: ListStyle::Ordered,
            items: vec![
                ListItem::new("one").with_items(vec![ListItem::new("a"), ListItem::new("b")]),
                ListItem::new("two"),
            ],
        };
        assert_eq!(
            md(vec![BlockData::List(data)]),
            "1. one\n   1. a\n   2. b\n2. two\n"
        );
    }

    #[test]
    fn children_align_with_wide_ordered_markers() {
        let mut items: Vec<ListItem> = (1..10).map(|n| ListItem::new(n.to_string())).collect();
        items.push(ListItem::new("ten").with_items(vec![ListItem::new("nested")]));
        let data = ListData {
            style: ListStyle::Ordered,
            items,
        };
        let out = md(vec![BlockData::List(data)]);
        assert!(out.ends_with("10. ten\n    1. nested\n"), "{out}");
    }

    #[test]
    fn unordered_lists_indent_two_spaces_per_level() {
        let data = ListData {
            style: ListStyle::Unordered,
            items: vec![ListItem::new("A").with_items(vec![
                ListItem::new("B").with_items(vec![ListItem::new("C")]),
            ])],
        };
        assert_eq!(md(vec![BlockData::List(data)]), "- A\n  - B\n    - C\n");
    }

    #[test]
    fn item_style_overrides_children() {
        let mut parent = ListItem::new("A").with_items(vec![ListItem::new("x"), ListItem::new("y")]);
        parent.style = Some(ListStyle::Ordered);
        let data = ListData {
            style: ListStyle::Unordered,
            items: vec![parent],
        };
        assert_eq!(md(vec![BlockData::List(data)]), "- A\n  1. x\n  2. y\n");
    }

    #[test]
    fn checklist_style_lists_use_item_meta() {
        let mut done = ListItem::new("Done");
        done.meta.checked = Some(true);
        let data = ListData {
            style: ListStyle::Checklist,
            items: vec![done, ListItem::new("Todo")],
        };
        assert_eq!(md(vec![BlockData::List(data)]), "- [x] Done\n- [ ] Todo\n");
    }

    #[test]
    fn adjacent_lists_alternate_markers() {
        let list = || {
            BlockData::List(ListData {
                style: ListStyle::Unordered,
                items: vec![ListItem::new("x")],
            })
        };
        assert_eq!(md(vec![list(), list(), list()]), "- x\n\n* x\n\n- x\n");
    }

    #[test]
    fn code_blocks_are_fenced_verbatim() {
        let code = BlockData::Code(CodeData {
            code: "console.log(\"Hello\");".into(),
            language: Some("javascript".into()),
        });
        assert_eq!(md(vec![code]), "```javascript\nconsole.log(\"Hello\");\n```\n");

        let plain = BlockData::Code(CodeData {
            code: "a_b *c*\n".into(),
            language: None,
        });
        assert_eq!(md(vec![plain]), "```\na_b *c*\n```\n");
    }

    #[test]
    fn quotes_with_and_without_caption() {
        let quote = BlockData::Quote(QuoteData {
            text: "To be<br>or not".into(),
            caption: Some("Shakespeare".into()),
        });
        assert_eq!(
            md(vec![quote]),
            "> To be\\\n> or not\n>\n> — Shakespeare\n"
        );
        let bare = BlockData::Quote(QuoteData {
            text: "Just this".into(),
            caption: None,
        });
        assert_eq!(md(vec![bare]), "> Just this\n");
    }

    #[test]
    fn warning_blocks() {
        let warning = BlockData::Warning(WarningData {
            title: None,
            message: "Mind the gap".into(),
        });
        assert_eq!(md(vec![warning]), "> ⚠️ **Warning**\n>\n> Mind the gap\n");
    }

    #[test]
    fn tables_get_a_separator_after_the_first_row() {
        let table = BlockData::Table(TableData {
            with_headings: true,
            content: vec![
                vec!["Name".into(), "Note".into()],
                vec!["a|b".into(), "<b>x</b>".into()],
                vec!["short".into()],
            ],
        });
        assert_eq!(
            md(vec![table]),
            "| Name | Note |\n| --- | --- |\n| a\\|b | **x** |\n| short |  |\n"
        );
    }

    #[test]
    fn checklist_drops_empty_items() {
        let list = BlockData::Checklist(ChecklistData {
            items: vec![
                ChecklistItem::new("Done", true),
                ChecklistItem::new("", false),
                ChecklistItem::new("Todo", false),
            ],
        });
        assert_eq!(md(vec![list]), "- [x] Done\n- [ ] Todo\n");
    }

    #[test]
    fn images() {
        let image = |caption: Option<&str>, alt: Option<&str>| {
            BlockData::Image(ImageData {
                url: "https://x.io/cat.png".into(),
                caption: caption.map(Into::into),
                alt: alt.map(Into::into),
                ..Default::default()
            })
        };
        assert_eq!(md(vec![image(None, None)]), "![Image](https://x.io/cat.png)\n");
        assert_eq!(
            md(vec![image(Some("A cat"), None)]),
            "![A cat](https://x.io/cat.png)\n"
        );
        assert_eq!(
            md(vec![image(Some("A cat"), Some("cat"))]),
            "![cat](https://x.io/cat.png)\n\n*A cat*\n"
        );
        assert_eq!(md(vec![BlockData::Image(ImageData::default())]), "");
    }

    #[test]
    fn embeds_and_link_cards() {
        let embed = BlockData::Embed(EmbedData {
            source: "https://video.example/1".into(),
            caption: Some("Clip".into()),
        });
        assert_eq!(
            md(vec![embed]),
            "[Embedded content](https://video.example/1)\n\n*Clip*\n"
        );

        let link: LinkToolData = serde_json::from_value(json!({
            "link": "https://x.io",
            "meta": {"title": "X", "description": "The X site"}
        }))
        .unwrap();
        assert_eq!(
            md(vec![BlockData::LinkTool(link)]),
            "[X](https://x.io)\n\nThe X site\n"
        );

        let untitled = LinkToolData {
            link: "https://x.io".into(),
            ..Default::default()
        };
        assert_eq!(
            md(vec![BlockData::LinkTool(untitled)]),
            "[https://x.io](https://x.io)\n"
        );
        assert_eq!(md(vec![BlockData::LinkTool(LinkToolData::default())]), "");
    }

    #[test]
    fn raw_html_is_unescaped() {
        let raw = BlockData::Raw(RawData {
            html: "<div class=\"x\">*hi*</div>".into(),
        });
        assert_eq!(md(vec![raw]), "<div class=\"x\">*hi*</div>\n");
    }

    #[test]
    fn unknown_blocks_leave_a_marker() {
        let with_text = BlockData::Unknown {
            kind: "poll".into(),
            data: json!({"text": "Vote now"}),
        };
        let without = BlockData::Unknown {
            kind: "spacer".into(),
            data: json!({"height": 20}),
        };
        assert_eq!(
            md(vec![with_text, without]),
            "<!-- Unknown block type: poll -->\nVote now\n\n<!-- Unsupported block type: spacer -->\n"
        );
    }

    #[test]
    fn malformed_block_contributes_nothing() {
        let doc: Document = serde_json::from_value(json!({
            "blocks": [
                {"type": "paragraph", "data": {}},
                {"type": "header", "data": {"text": "Kept"}}
            ]
        }))
        .unwrap();
        assert_eq!(
            serialize_to_markdown(&doc, &ExportOptions::default()),
            "# Kept\n"
        );
    }

    #[test]
    fn blocks_are_separated_by_one_blank_line() {
        assert_eq!(
            md(vec![
                BlockData::header("Main Title", 1),
                BlockData::header("Subtitle", 2),
                BlockData::Delimiter,
                BlockData::paragraph("End"),
            ]),
            "# Main Title\n\n## Subtitle\n\n---\n\nEnd\n"
        );
    }
}
