//! Markdown format tests
//!
//! Tests for bidirectional Markdown ↔ block-document conversion.

#[cfg(feature = "comrak")]
mod export;
mod import;
mod roundtrip;
