//! Block-document JSON format
//!
//! The editor's own save format. Parsing is lenient in the same way the model
//! is (see [`crate::document::lenient`]); a bare array of blocks is accepted
//! as a document with default metadata.
//!
//! Serialize parameters: `pretty=true|false`.

use crate::document::{Block, Document};
use crate::error::FormatError;
use crate::format::{Format, SerializedDocument};
use serde::Deserialize;
use std::collections::HashMap;

/// Options for JSON output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonOptions {
    pub pretty: bool,
}

impl Default for JsonOptions {
    fn default() -> Self {
        JsonOptions { pretty: true }
    }
}

/// Format implementation for block-document JSON
#[derive(Debug, Default)]
pub struct JsonFormat {
    options: JsonOptions,
}

/// Arrays are tried first: a derived struct would also accept a sequence.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonInput {
    Blocks(Vec<Block>),
    Document(Document),
}

impl JsonFormat {
    pub fn new(options: JsonOptions) -> Self {
        JsonFormat { options }
    }

    fn write(doc: &Document, pretty: bool) -> Result<String, FormatError> {
        let mut out = if pretty {
            serde_json::to_string_pretty(doc)
        } else {
            serde_json::to_string(doc)
        }
        .map_err(|e| FormatError::SerializationError(e.to_string()))?;
        out.push('\n');
        Ok(out)
    }
}

impl Format for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Block-editor JSON save format"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Document, FormatError> {
        if source.trim().is_empty() {
            return Ok(Document::default());
        }
        let input: JsonInput = serde_json::from_str(source)
            .map_err(|e| FormatError::ParseError(format!("invalid block JSON: {e}")))?;
        Ok(match input {
            JsonInput::Document(doc) => doc,
            JsonInput::Blocks(blocks) => Document::new(blocks),
        })
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        Self::write(doc, self.options.pretty)
    }

    fn serialize_with_options(
        &self,
        doc: &Document,
        options: &HashMap<String, String>,
    ) -> Result<SerializedDocument, FormatError> {
        let mut pretty = self.options.pretty;
        for (key, value) in options {
            match (key.as_str(), value.trim()) {
                ("pretty", "" | "true") => pretty = true,
                ("pretty", "false") => pretty = false,
                ("pretty", other) => {
                    return Err(FormatError::SerializationError(format!(
                        "invalid value '{other}' for 'pretty' (expected true or false)"
                    )))
                }
                (other, _) => {
                    return Err(FormatError::NotSupported(format!(
                        "Format 'json' does not support parameter '{other}'"
                    )))
                }
            }
        }
        Self::write(doc, pretty).map(SerializedDocument::Text)
    }
}
