//! Error types for format operations

use thiserror::Error;

/// Errors that can occur during format operations
///
/// The markdown converter itself never surfaces these to callers: parse failures
/// are absorbed into the raw-text fallback. They show up at the `Format` and
/// registry seams, and from the JSON format.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    /// Format not found in registry
    #[error("Format '{0}' not found")]
    FormatNotFound(String),
    /// Error during parsing
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Error during serialization
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// Format does not support the operation
    #[error("Operation not supported: {0}")]
    NotSupported(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_variants() {
        assert_eq!(
            FormatError::FormatNotFound("docx".into()).to_string(),
            "Format 'docx' not found"
        );
        assert_eq!(
            FormatError::ParseError("nesting too deep".into()).to_string(),
            "Parse error: nesting too deep"
        );
    }
}
