//! CLI-specific transforms
//!
//! Each transform is a stage + format combination (e.g., "ir-treeviz").
//!
//! ## Stages
//!
//! 1. **Parsing** - Markdown text → generic markdown AST (IR)
//!    - `ir-json`: the AST as JSON
//!    - `ir-treeviz`: the AST as a tree with Unicode icons
//!
//! 2. **Import** - IR → block-document
//!    - `blocks-json`: the block-document the importer builds from the AST
//!
//! ## Extra Parameters
//!
//! - `ast-full`: when "true", `ir-treeviz` also lists inline nodes and table rows.
//!
//! Example: `blockmark inspect notes.md ir-treeviz --extra-ast-full`

use blockmark_babel::formats::markdown::MarkdownFormat;
use blockmark_babel::formats::treeviz::to_treeviz_str_with_params;
use blockmark_babel::Format;
use std::collections::HashMap;

/// All available CLI transforms (stage + format combinations)
pub const AVAILABLE_TRANSFORMS: &[&str] = &["ir-json", "ir-treeviz", "blocks-json"];

/// Transform used when `inspect` is given none.
pub const DEFAULT_TRANSFORM: &str = "ir-treeviz";

/// Execute a named transform on markdown source.
///
/// The parser that `markdown` was configured with is the one inspected, so the
/// output shows exactly what `convert` would see.
pub fn execute_transform(
    source: &str,
    transform_name: &str,
    markdown: &MarkdownFormat,
    extra_params: &HashMap<String, String>,
) -> Result<String, String> {
    match transform_name {
        "ir-json" => {
            let nodes = markdown
                .parse_tree(source)
                .map_err(|e| format!("Transform failed: {e}"))?;
            let mut out = serde_json::to_string_pretty(&nodes)
                .map_err(|e| format!("JSON serialization failed: {e}"))?;
            out.push('\n');
            Ok(out)
        }
        "ir-treeviz" => {
            let nodes = markdown
                .parse_tree(source)
                .map_err(|e| format!("Transform failed: {e}"))?;
            Ok(to_treeviz_str_with_params(&nodes, extra_params))
        }
        "blocks-json" => {
            let doc = markdown
                .parse(source)
                .map_err(|e| format!("Transform failed: {e}"))?;
            let mut out = serde_json::to_string_pretty(&doc)
                .map_err(|e| format!("JSON serialization failed: {e}"))?;
            out.push('\n');
            Ok(out)
        }
        other => Err(format!(
            "Unknown transform '{other}'. Available: {}",
            AVAILABLE_TRANSFORMS.join(", ")
        )),
    }
}
