//! The `Format` trait: one text representation of a block-document.
//!
//! A format reads text into a [`Document`], writes a [`Document`] back out,
//! or both. Formats are looked up by name through the
//! [`FormatRegistry`](crate::registry::FormatRegistry).

use crate::document::Document;
use crate::error::FormatError;
use std::collections::HashMap;

/// Output of [`Format::serialize_with_options`].
///
/// Every format here writes UTF-8 text; the wrapper keeps the call sites that
/// write files independent of that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerializedDocument {
    Text(String),
}

impl SerializedDocument {
    pub fn into_bytes(self) -> Vec<u8> {
        self.into_text().into_bytes()
    }

    pub fn into_text(self) -> String {
        match self {
            SerializedDocument::Text(text) => text,
        }
    }
}

/// A text representation of block-documents.
///
/// Only `name` is required. A format that overrides neither `parse` nor
/// `serialize` is inert: both default to [`FormatError::NotSupported`].
///
/// ```ignore
/// struct PlainText;
///
/// impl Format for PlainText {
///     fn name(&self) -> &str { "plain" }
///     fn file_extensions(&self) -> &[&str] { &["txt"] }
///     fn supports_serialization(&self) -> bool { true }
///     fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
///         Ok(doc.blocks.iter().map(|b| b.kind()).collect::<Vec<_>>().join("\n"))
///     }
/// }
/// ```
pub trait Format: Send + Sync {
    /// Registry key, e.g. `"markdown"`.
    fn name(&self) -> &str;

    /// One line shown by `--list-formats`.
    fn description(&self) -> &str {
        ""
    }

    /// Extensions without the leading dot, lowercase.
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    /// Whether `extension` (any case, no dot) belongs to this format.
    fn matches_extension(&self, extension: &str) -> bool {
        self.file_extensions()
            .iter()
            .any(|known| known.eq_ignore_ascii_case(extension))
    }

    fn supports_parsing(&self) -> bool {
        false
    }

    fn supports_serialization(&self) -> bool {
        false
    }

    /// Read `source` into a block-document.
    fn parse(&self, _source: &str) -> Result<Document, FormatError> {
        Err(self.unsupported("parsing"))
    }

    /// Write a block-document with this format's configured options.
    fn serialize(&self, _doc: &Document) -> Result<String, FormatError> {
        Err(self.unsupported("serialization"))
    }

    /// Write a block-document with per-call parameters layered on top of the
    /// configured options.
    ///
    /// Formats without parameters reject any non-empty map, so a typo on the
    /// command line surfaces instead of being ignored.
    fn serialize_with_options(
        &self,
        doc: &Document,
        options: &HashMap<String, String>,
    ) -> Result<SerializedDocument, FormatError> {
        match options.keys().next() {
            None => self.serialize(doc).map(SerializedDocument::Text),
            Some(key) => Err(FormatError::NotSupported(format!(
                "Format '{}' does not support parameter '{key}'",
                self.name()
            ))),
        }
    }

    #[doc(hidden)]
    fn unsupported(&self, what: &str) -> FormatError {
        FormatError::NotSupported(format!(
            "Format '{}' does not support {what}",
            self.name()
        ))
    }
}
