//! Conversion between block-editor documents and markdown
//!
//!     This crate converts between the block-document model a block editor saves
//!     (an ordered list of typed blocks whose text fields hold inline-markup) and
//!     CommonMark markdown. Both directions are total: malformed blocks degrade to
//!     empty or best-effort output, and markdown that cannot be parsed comes back
//!     as one paragraph holding the raw text.
//!
//!     This is a pure lib: no I/O, no clock, no global state. The CLI and the
//!     config crate sit on top of it.
//!
//! Architecture
//!
//!     Export walks blocks and writes markdown directly. Import goes through a
//!     generic markdown AST (./ir/mod.rs) produced by an injected MarkdownParser,
//!     so the block mapping never depends on which parser ran. The shared pieces
//!     both directions need (inline-markup, list and table reconstruction,
//!     escaping) live in ./common.
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── document                # Block-document model (editor save format)
//!     ├── ir                      # Generic markdown AST
//!     ├── common                  # Inline-markup, lists, tables, escaping
//!     ├── formats
//!     │   ├── markdown
//!     │   │   ├── parsers         # MarkdownParser: comrak and line-based
//!     │   │   ├── parser.rs       # AST → blocks
//!     │   │   ├── serializer.rs   # blocks → markdown
//!     │   │   └── mod.rs
//!     │   ├── json                # Editor JSON
//!     │   └── treeviz             # AST tree view for inspection
//!     └── lib.rs
//!
//! Testing
//!     tests
//!     └── <format>
//!         └── <testname>.rs
//!
//!     Note that rust does not by default discover tests in subdirectories, so we need to include these
//!     in the mod.

pub mod common;
pub mod document;
pub mod error;
pub mod format;
pub mod formats;
pub mod ir;
pub mod registry;

pub use document::{Block, BlockData, Document};
pub use error::FormatError;
pub use format::{Format, SerializedDocument};
pub use formats::markdown::parser::{BlockImporter, ImportOptions};
pub use formats::markdown::parsers::{MarkdownParser, ParserChoice};
pub use formats::markdown::serializer::ExportOptions;
pub use registry::FormatRegistry;

/// Serialize a block-document to markdown with default options.
pub fn serialize(doc: &Document) -> String {
    formats::markdown::serializer::serialize_to_markdown(doc, &ExportOptions::default())
}

/// Deserialize markdown into a block-document with the default parser.
pub fn deserialize(markdown: &str) -> Document {
    BlockImporter::default().import(markdown)
}
