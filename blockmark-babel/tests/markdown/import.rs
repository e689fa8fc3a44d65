//! Import tests for Markdown format (Markdown → blocks)
//!
//! These tests verify that Markdown documents are correctly converted to
//! block-documents, with either parser strategy behind the importer.

use blockmark_babel::document::{
    BlockData, ChecklistData, ChecklistItem, ListData, ListItem, ListStyle, QuoteData,
};
use blockmark_babel::formats::markdown::parser::{BlockImporter, ImportOptions};
use blockmark_babel::formats::markdown::parsers::ParserChoice;
use blockmark_babel::{deserialize, Document};
use std::path::PathBuf;

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"))
}

fn importer(parser: ParserChoice) -> BlockImporter {
    BlockImporter::from_options(&ImportOptions {
        parser,
        ..Default::default()
    })
}

fn kinds(doc: &Document) -> Vec<&str> {
    doc.blocks.iter().map(|b| b.kind()).collect()
}

#[test]
fn test_empty_input() {
    assert_eq!(deserialize(""), Document::default());
}

#[test]
fn test_kitchensink_block_types() {
    let md = fixture("kitchensink.md");
    for parser in [ParserChoice::Comrak, ParserChoice::Lines] {
        let doc = importer(parser).import(&md);
        assert_eq!(
            kinds(&doc),
            vec![
                "header",
                "paragraph",
                "list",
                "checklist",
                "code",
                "quote",
                "delimiter",
                "table",
                "image",
                "warning",
                "paragraph",
            ],
            "parser {parser}"
        );
    }
}

#[test]
fn test_kitchensink_inline_markup() {
    let doc = deserialize(&fixture("kitchensink.md"));
    assert_eq!(
        doc.blocks[1].data,
        BlockData::paragraph(
            "Version <b>2.0</b> ships <i>today</i> &amp; brings \
             <code class=\"inline-code\">fast_mode</code>."
        )
    );
    assert_eq!(
        doc.blocks[2].data,
        BlockData::List(ListData {
            style: ListStyle::Ordered,
            items: vec![
                ListItem::new("Install"),
                ListItem::new("Configure").with_items(vec![ListItem::new(
                    "Edit <a href=\"https://x.io/cfg\">config</a>"
                )]),
            ],
        })
    );
}

#[test]
fn test_checklist_round_trip_states() {
    let doc = deserialize("- [x] Done\n- [ ] Todo\n");
    assert_eq!(
        doc.blocks[0].data,
        BlockData::Checklist(ChecklistData {
            items: vec![ChecklistItem::new("Done", true), ChecklistItem::new("Todo", false)],
        })
    );
}

#[test]
fn test_nested_unordered_list() {
    let doc = deserialize("- A\n  - B\n");
    assert_eq!(
        doc.blocks[0].data,
        BlockData::List(ListData {
            style: ListStyle::Unordered,
            items: vec![ListItem::new("A").with_items(vec![ListItem::new("B")])],
        })
    );
}

#[test]
fn test_source_numbering_is_ignored() {
    let doc = deserialize("7. seven\n8. eight\n");
    let md = blockmark_babel::serialize(&doc);
    assert_eq!(md, "1. seven\n2. eight\n");
}

#[test]
fn test_multi_line_quote_with_caption() {
    let doc = deserialize("> line one\n> line two\n>\n> — Someone Famous\n");
    assert_eq!(
        doc.blocks[0].data,
        BlockData::Quote(QuoteData {
            text: "line one\nline two".into(),
            caption: Some("Someone Famous".into()),
        })
    );
}

#[test]
fn test_hard_breaks_become_br() {
    let doc = deserialize("one\\\ntwo\n");
    assert_eq!(doc.blocks[0].data, BlockData::paragraph("one<br>two"));
}

#[test]
fn test_invalid_input_falls_back_to_raw_text() {
    let source = format!("{} ]]] **", ">".repeat(500));
    let doc = deserialize(&source);
    assert_eq!(doc.blocks.len(), 1);
    assert_eq!(doc.blocks[0].data, BlockData::paragraph(source));
}

#[test]
fn test_line_parser_fallback_is_also_total() {
    let source = format!("{} text", ">".repeat(500));
    let doc = importer(ParserChoice::Lines).import(&source);
    assert_eq!(doc.blocks[0].data, BlockData::paragraph(source));
}
