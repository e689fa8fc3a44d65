//! Round-trip property: plain paragraphs, headers and lists survive
//! serialize → deserialize unchanged, with either parser.

use blockmark_babel::document::{Block, BlockData, Document, ListData, ListItem, ListStyle};
use blockmark_babel::formats::markdown::parser::{BlockImporter, ImportOptions};
use blockmark_babel::formats::markdown::parsers::ParserChoice;
use blockmark_babel::serialize;
use proptest::prelude::*;

fn plain_text() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-zA-Z0-9]{1,8}[,.!?]?", 1..6).prop_map(|words| words.join(" "))
}

fn list_style() -> impl Strategy<Value = ListStyle> {
    prop_oneof![Just(ListStyle::Ordered), Just(ListStyle::Unordered)]
}

fn leaf_item() -> impl Strategy<Value = ListItem> {
    plain_text().prop_map(ListItem::new)
}

fn list_item() -> impl Strategy<Value = ListItem> {
    (plain_text(), prop::collection::vec(leaf_item(), 0..3))
        .prop_map(|(text, children)| ListItem::new(text).with_items(children))
}

fn block() -> impl Strategy<Value = BlockData> {
    prop_oneof![
        plain_text().prop_map(BlockData::paragraph),
        (plain_text(), 1i64..=6).prop_map(|(text, level)| BlockData::header(text, level)),
        (list_style(), prop::collection::vec(list_item(), 1..4))
            .prop_map(|(style, items)| BlockData::List(ListData { style, items })),
    ]
}

fn document() -> impl Strategy<Value = Document> {
    prop::collection::vec(block(), 0..8)
        .prop_map(|blocks| Document::new(blocks.into_iter().map(Block::new).collect()))
}

fn reimport(doc: &Document, parser: ParserChoice) -> Document {
    BlockImporter::from_options(&ImportOptions {
        parser,
        ..Default::default()
    })
    .import(&serialize(doc))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn plain_documents_round_trip_through_comrak(doc in document()) {
        prop_assert_eq!(reimport(&doc, ParserChoice::Comrak), doc);
    }

    #[test]
    fn plain_documents_round_trip_through_lines(doc in document()) {
        prop_assert_eq!(reimport(&doc, ParserChoice::Lines), doc);
    }
}

#[test]
fn leading_markers_survive() {
    let doc = Document::new(vec![
        Block::new(BlockData::paragraph("1. first")),
        Block::new(BlockData::paragraph("- dash")),
        Block::new(BlockData::header("2024", 2)),
        Block::new(BlockData::paragraph("~~~ wave")),
        Block::new(BlockData::header("After", 2)),
        Block::new(BlockData::paragraph("tail")),
    ]);
    for parser in [ParserChoice::Comrak, ParserChoice::Lines] {
        assert_eq!(reimport(&doc, parser), doc, "parser {parser}");
    }
}

#[test]
fn indented_text_stays_a_paragraph() {
    let doc = Document::new(vec![
        Block::new(BlockData::paragraph("    # x")),
        Block::new(BlockData::paragraph("  - not a bullet")),
        Block::new(BlockData::paragraph("tail")),
    ]);
    for parser in [ParserChoice::Comrak, ParserChoice::Lines] {
        assert_eq!(reimport(&doc, parser), doc, "parser {parser}");
    }
}
