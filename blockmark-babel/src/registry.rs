//! Name-keyed collection of formats.
//!
//! The CLI builds one registry from configuration and routes every
//! conversion through it: look the source format up by name (or by file
//! extension), parse, then serialize with the target format.

use crate::document::Document;
use crate::error::FormatError;
use crate::format::{Format, SerializedDocument};
use crate::formats::{JsonFormat, MarkdownFormat};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Formats by name, iterated in name order.
///
/// ```ignore
/// let mut registry = FormatRegistry::new();
/// registry.register(MarkdownFormat::default());
/// let doc = registry.parse("# Title\n", "markdown")?;
/// ```
pub struct FormatRegistry {
    formats: BTreeMap<String, Box<dyn Format>>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        FormatRegistry {
            formats: BTreeMap::new(),
        }
    }

    /// Markdown and JSON with their default options.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(MarkdownFormat::default());
        registry.register(JsonFormat::default());
        registry
    }

    /// Add a format, replacing any format already registered under its name.
    pub fn register<F: Format + 'static>(&mut self, format: F) {
        let name = format.name().to_string();
        if self.formats.insert(name.clone(), Box::new(format)).is_some() {
            log::debug!("format '{name}' re-registered");
        }
    }

    pub fn get(&self, name: &str) -> Result<&dyn Format, FormatError> {
        self.formats
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| FormatError::FormatNotFound(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn list_formats(&self) -> Vec<String> {
        self.formats.keys().cloned().collect()
    }

    /// Registered formats in name order.
    pub fn formats(&self) -> impl Iterator<Item = &dyn Format> {
        self.formats.values().map(|f| f.as_ref())
    }

    /// Name of the first format (in name order) claiming the file's extension.
    ///
    /// `None` for paths without an extension, including `-` for stdin.
    pub fn detect_format_from_filename(&self, filename: &str) -> Option<String> {
        let extension = Path::new(filename).extension()?.to_str()?;
        self.formats()
            .find(|format| format.matches_extension(extension))
            .map(|format| format.name().to_string())
    }

    pub fn parse(&self, source: &str, format: &str) -> Result<Document, FormatError> {
        let fmt = self.get(format)?;
        if !fmt.supports_parsing() {
            return Err(fmt.unsupported("parsing"));
        }
        fmt.parse(source)
    }

    pub fn serialize(&self, doc: &Document, format: &str) -> Result<String, FormatError> {
        self.serialize_with_options(doc, format, &HashMap::new())
            .map(SerializedDocument::into_text)
    }

    pub fn serialize_with_options(
        &self,
        doc: &Document,
        format: &str,
        options: &HashMap<String, String>,
    ) -> Result<SerializedDocument, FormatError> {
        let fmt = self.get(format)?;
        if !fmt.supports_serialization() {
            return Err(fmt.unsupported("serialization"));
        }
        fmt.serialize_with_options(doc, options)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
