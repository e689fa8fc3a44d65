//! Export tests for Markdown format (blocks → Markdown)
//!
//! These tests verify that block-documents are correctly converted to Markdown,
//! both as exact text and by checking the Comrak AST of the output.

use blockmark_babel::document::{Block, BlockData, Document};
use blockmark_babel::format::Format;
use blockmark_babel::formats::json::JsonFormat;
use blockmark_babel::formats::markdown::MarkdownFormat;
use comrak::nodes::NodeValue;
use comrak::{parse_document, Arena, ComrakOptions};
use insta::assert_snapshot;
use serde_json::json;
use std::path::PathBuf;

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"))
}

fn blocks(value: serde_json::Value) -> Document {
    serde_json::from_value(json!({ "blocks": value })).expect("document to deserialize")
}

fn to_md(doc: &Document) -> String {
    MarkdownFormat::default().serialize(doc).unwrap()
}

/// Kinds of the top-level nodes comrak finds in `md`.
fn top_level_kinds(md: &str) -> Vec<&'static str> {
    let arena = Arena::new();
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.tasklist = true;
    let root = parse_document(&arena, md, &options);
    root.children()
        .map(|child| match &child.data.borrow().value {
            NodeValue::Heading(_) => "heading",
            NodeValue::Paragraph => "paragraph",
            NodeValue::List(_) => "list",
            NodeValue::CodeBlock(_) => "code",
            NodeValue::BlockQuote => "blockquote",
            NodeValue::ThematicBreak => "thematicBreak",
            NodeValue::Table(_) => "table",
            NodeValue::HtmlBlock(_) => "html",
            _ => "other",
        })
        .collect()
}

#[test]
fn test_kitchensink_matches_fixture() {
    let doc = JsonFormat::default()
        .parse(&fixture("kitchensink.json"))
        .unwrap();
    assert_eq!(to_md(&doc), fixture("kitchensink.md"));
}

#[test]
fn test_kitchensink_structure() {
    let md = fixture("kitchensink.md");
    assert_eq!(
        top_level_kinds(&md),
        vec![
            "heading",
            "paragraph",
            "list",
            "list",
            "code",
            "blockquote",
            "thematicBreak",
            "table",
            "paragraph",
            "blockquote",
            "html",
            "paragraph",
        ]
    );
}

#[test]
fn test_empty_document() {
    assert_eq!(to_md(&Document::default()), "");
    assert_eq!(to_md(&blocks(json!([{"type": "paragraph", "data": {}}]))), "");
}

#[test]
fn test_header_levels_are_clamped() {
    let doc = blocks(json!([
        {"type": "header", "data": {"text": "Deep", "level": 9}},
        {"type": "header", "data": {"text": "Shallow", "level": 0}},
        {"type": "header", "data": {"text": "Odd", "level": "x"}}
    ]));
    assert_snapshot!(to_md(&doc), @r###"
    ###### Deep

    # Shallow

    # Odd
    "###);
}

#[test]
fn test_nested_lists_renumber_per_level() {
    let doc = blocks(json!([{"type": "list", "data": {"style": "ordered", "items": [
        {"content": "one", "items": [
            {"content": "a", "items": []},
            {"content": "b", "items": [{"content": "deep", "items": []}]}
        ]},
        {"content": "two", "items": []}
    ]}}]));
    assert_snapshot!(to_md(&doc), @r###"
    1. one
       1. a
       2. b
          1. deep
    2. two
    "###);
}

#[test]
fn test_mixed_nested_styles() {
    let doc = blocks(json!([{"type": "list", "data": {"style": "unordered", "items": [
        {"content": "steps", "style": "ordered", "items": [
            {"content": "first", "items": []},
            {"content": "second", "items": []}
        ]}
    ]}}]));
    assert_snapshot!(to_md(&doc), @r###"
    - steps
      1. first
      2. second
    "###);
}

#[test]
fn test_adjacent_lists_stay_separate() {
    let doc = blocks(json!([
        {"type": "list", "data": {"style": "unordered", "items": ["a"]}},
        {"type": "list", "data": {"style": "unordered", "items": ["b"]}},
        {"type": "list", "data": {"style": "ordered", "items": ["c"]}},
        {"type": "list", "data": {"style": "ordered", "items": ["d"]}}
    ]));
    let md = to_md(&doc);
    assert_eq!(md, "- a\n\n* b\n\n1. c\n\n1) d\n");
    assert_eq!(top_level_kinds(&md), vec!["list"; 4]);
}

#[test]
fn test_escaped_text_stays_text() {
    let doc = Document::new(vec![
        Block::new(BlockData::paragraph("# not a heading")),
        Block::new(BlockData::paragraph("1. not a list")),
        Block::new(BlockData::paragraph("*not emphasis* and [not a link](x)")),
    ]);
    let md = to_md(&doc);
    assert_eq!(top_level_kinds(&md), vec!["paragraph"; 3]);
    assert_snapshot!(md, @r###"
    \# not a heading

    1\. not a list

    \*not emphasis\* and \[not a link\](x)
    "###);
}

#[test]
fn test_code_block_with_fences_inside() {
    let doc = blocks(json!([{"type": "code", "data": {"code": "```\ninner\n```"}}]));
    let md = to_md(&doc);
    assert_eq!(md, "````\n```\ninner\n```\n````\n");
    assert_eq!(top_level_kinds(&md), vec!["code"]);
}

#[test]
fn test_media_blocks() {
    let doc = blocks(json!([
        {"type": "image", "data": {"file": {"url": "a.png"}, "caption": "Sunset <b>at sea</b>", "alt": "sunset"}},
        {"type": "embed", "data": {"service": "youtube", "source": "https://youtu.be/x", "caption": "Talk"}},
        {"type": "linkTool", "data": {"link": "https://x.io", "meta": {"title": "X", "description": "An example"}}},
        {"type": "image", "data": {"caption": "no url"}}
    ]));
    assert_snapshot!(to_md(&doc), @r###"
    ![sunset](a.png)

    *Sunset **at sea***

    [Embedded content](https://youtu.be/x)

    *Talk*

    [X](https://x.io)

    An example
    "###);
}

#[test]
fn test_unknown_block_without_text() {
    let doc = blocks(json!([{"type": "attaches", "data": {"file": {"url": "f.pdf"}}}]));
    assert_eq!(to_md(&doc), "<!-- Unsupported block type: attaches -->\n");
}
