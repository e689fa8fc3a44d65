//! Shared icon mapping for tree visualization
//!
//! Keys are the mdast-style kinds reported by [`crate::ir::MdNode::kind`],
//! plus the inline kinds and a few synthetic rows (`root`, `listItem`,
//! `tableRow`).

/// Get the Unicode icon for a given AST node kind
///
/// Unmapped kinds, including whatever a parser reports through
/// `MdNode::Other`, share a neutral circle.
pub fn get_icon(node_kind: &str) -> &'static str {
    match node_kind {
        "root" => "⧉",
        "heading" => "#",
        "paragraph" => "¶",
        "list" => "☰",
        "listItem" => "•",
        "code" => "𝒱",
        "blockquote" => "❝",
        "thematicBreak" => "⎯",
        "table" => "▦",
        "tableRow" => "≡",
        "image" => "▣",
        "html" => "⟨",
        "text" => "◦",
        "strong" => "𝐁",
        "emphasis" => "𝐼",
        "inlineCode" => "ƒ",
        "link" => "⊕",
        "break" => "↵",
        _ => "○",
    }
}
