//! Markdown format implementation
//!
//! This module implements bidirectional conversion between block-documents and
//! CommonMark Markdown (with the GFM table and task-list extensions).
//!
//! # Library Choice
//!
//! Import goes through a [`parsers::MarkdownParser`]. The default is `comrak`,
//! which gives a CommonMark-compliant tree with the GFM extensions we need.
//! A line-based parser with no AST dependency covers builds without the
//! `comrak` feature, and can be picked explicitly from configuration.
//!
//! Export is written by hand: the block model is flat and small, and owning
//! the writer keeps escaping and list markers under our control.
//!
//! # Element Mapping Table
//!
//! | Block        | Markdown Equivalent         | Export Notes                          | Import Notes                               |
//! |--------------|-----------------------------|---------------------------------------|--------------------------------------------|
//! | paragraph    | Paragraph                   | Inline markup → emphasis/code/links   | Inlines → inline markup                    |
//! | header       | Heading (# .. ######)       | Level clamped to 1-6                  | Blank headings dropped                     |
//! | list         | List (- / 1.)               | Renumbered per level, nested by indent| Nesting rebuilt recursively                |
//! | checklist    | Task list (- [x])           | Empty items dropped                   | Flat bullet task lists only                |
//! | code         | Fenced code (```lang)       | Fence outgrows backtick runs          | First info word → language                 |
//! | quote        | Blockquote (>)              | Caption as `> — caption`              | Trailing `— ` line → caption               |
//! | warning      | Blockquote (> ⚠️ **Title**) | Title defaults to "Warning"           | `⚠️ **Title**` first line → warning        |
//! | delimiter    | Thematic break (---)        | Direct                                | Direct                                     |
//! | table        | GFM pipe table              | Separator after first row             | Header row kept as first row               |
//! | image        | ![alt](url)                 | Italic caption line when it differs   | Title, else alt → caption                  |
//! | embed        | [Embedded content](src)     | Optional italic caption               | Reads back as a paragraph link             |
//! | linkTool     | [title](link)               | Description as its own paragraph      | Reads back as a paragraph link             |
//! | raw          | HTML block                  | Verbatim                              | HTML blocks → raw                          |
//! | (unknown)    | HTML comment marker + text  | Text from `text`/`content`/`html`     | Marker comments dropped                    |
//!
//! # Lossy Conversions
//!
//! - Embeds and link cards come back as paragraphs holding a link.
//! - Image captions that differ from the alt text come back as a separate paragraph.
//! - Unknown block types keep their text but not their type or data.
//! - Markdown nodes with no block counterpart become `[kind] text` paragraphs.

pub mod parser;
pub mod parsers;
pub mod serializer;

use crate::document::Document;
use crate::error::FormatError;
use crate::format::{Format, SerializedDocument};
use crate::ir::MdNode;
use parser::{BlockImporter, ImportOptions};
use serializer::ExportOptions;
use std::collections::HashMap;

/// Format implementation for Markdown
#[derive(Debug, Default)]
pub struct MarkdownFormat {
    importer: BlockImporter,
    export: ExportOptions,
}

impl MarkdownFormat {
    pub fn new(import: &ImportOptions, export: ExportOptions) -> Self {
        MarkdownFormat {
            importer: BlockImporter::from_options(import),
            export,
        }
    }

    /// Use an already-built importer, e.g. one holding a custom parser.
    pub fn with_importer(importer: BlockImporter, export: ExportOptions) -> Self {
        MarkdownFormat { importer, export }
    }

    pub fn parser_name(&self) -> &str {
        self.importer.parser_name()
    }

    /// The intermediate markdown AST for `source`.
    pub fn parse_tree(&self, source: &str) -> Result<Vec<MdNode>, FormatError> {
        self.importer.parse_tree(source)
    }

    fn export_options(
        &self,
        options: &HashMap<String, String>,
    ) -> Result<ExportOptions, FormatError> {
        let mut export = self.export.clone();
        for (key, value) in options {
            match key.as_str() {
                "escape" | "escape-text" | "escape_text" => {
                    export.escape_text = parse_flag(key, value)?;
                }
                other => {
                    return Err(FormatError::NotSupported(format!(
                        "Format 'markdown' does not support parameter '{other}'"
                    )))
                }
            }
        }
        Ok(export)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, FormatError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => Err(FormatError::SerializationError(format!(
            "invalid value '{other}' for '{key}' (expected true or false)"
        ))),
    }
}

impl Format for MarkdownFormat {
    fn name(&self) -> &str {
        "markdown"
    }

    fn description(&self) -> &str {
        "CommonMark Markdown with GFM tables and task lists"
    }

    fn file_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Document, FormatError> {
        Ok(self.importer.import(source))
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        Ok(serializer::serialize_to_markdown(doc, &self.export))
    }

    fn serialize_with_options(
        &self,
        doc: &Document,
        options: &HashMap<String, String>,
    ) -> Result<SerializedDocument, FormatError> {
        let export = self.export_options(options)?;
        Ok(SerializedDocument::Text(serializer::serialize_to_markdown(
            doc, &export,
        )))
    }
}
