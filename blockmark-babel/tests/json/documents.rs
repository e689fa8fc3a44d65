//! Editor JSON through the registry.

use blockmark_babel::document::BlockData;
use blockmark_babel::registry::FormatRegistry;
use serde_json::Value;

const LEGACY: &str = r#"{
    "time": 1550476186479,
    "version": "2.8.1",
    "blocks": [
        {"type": "header", "data": {"text": "Legacy", "level": "2"}},
        {"type": "list", "data": {"style": "unordered", "items": ["one", "two"]}},
        {"type": "checklist", "data": {"items": [{"text": "done", "checked": "true"}]}},
        {"type": "paragraph", "data": {"text": 42}}
    ]
}"#;

#[test]
fn legacy_payloads_are_read_leniently() {
    let registry = FormatRegistry::default();
    let doc = registry.parse(LEGACY, "json").unwrap();

    assert_eq!(doc.version, "2.8.1");
    assert_eq!(doc.blocks[0].data, BlockData::header("Legacy", 2));
    assert_eq!(doc.blocks[3].data, BlockData::paragraph("42"));
    assert_eq!(
        registry.serialize(&doc, "markdown").unwrap(),
        "## Legacy\n\n- one\n- two\n\n* [x] done\n\n42\n"
    );
}

#[test]
fn markdown_to_json_keeps_editor_shape() {
    let registry = FormatRegistry::default();
    let doc = registry.parse("# Hi\n\n- [ ] task\n", "markdown").unwrap();
    let json: Value = serde_json::from_str(&registry.serialize(&doc, "json").unwrap()).unwrap();

    assert_eq!(json["version"], "2.29.0");
    assert!(json.get("time").is_none());
    assert_eq!(json["blocks"][0]["type"], "header");
    assert_eq!(json["blocks"][0]["data"]["level"], 1);
    assert_eq!(json["blocks"][1]["type"], "checklist");
    assert_eq!(json["blocks"][1]["data"]["items"][0]["checked"], false);
}

#[test]
fn unknown_blocks_pass_through_json_untouched() {
    let source = r#"{"blocks":[{"id":"x","type":"poll","data":{"question":"?","options":[1,2]}}]}"#;
    let registry = FormatRegistry::default();
    let doc = registry.parse(source, "json").unwrap();
    let out: Value = serde_json::from_str(&registry.serialize(&doc, "json").unwrap()).unwrap();
    assert_eq!(out["blocks"][0]["data"]["options"][1], 2);
    assert_eq!(out["blocks"][0]["id"], "x");
}
