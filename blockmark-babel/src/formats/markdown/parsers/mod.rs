//! Markdown parser strategies.
//!
//! Both strategies turn markdown text into the generic AST in [`crate::ir`];
//! the block importer never sees which one ran. The choice is made once,
//! from [`ParserChoice`], and handed to the importer as a trait object.

#[cfg(feature = "comrak")]
pub mod cmark;
pub mod lines;

use crate::error::FormatError;
use crate::ir::MdNode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "comrak")]
pub use self::cmark::ComrakParser;
pub use self::lines::LineParser;

/// Default limit on container nesting while building the AST.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 64;

/// Turns markdown text into top-level AST nodes.
pub trait MarkdownParser: Send + Sync {
    /// Short name used in logs and by `inspect`.
    fn name(&self) -> &str;

    /// Parse a whole document.
    ///
    /// An error means the input could not be turned into a tree at all; the
    /// importer then falls back to a single raw-text paragraph.
    fn parse(&self, source: &str) -> Result<Vec<MdNode>, FormatError>;
}

/// Which parser strategy to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserChoice {
    /// comrak when compiled in, otherwise the line parser.
    #[default]
    Auto,
    Comrak,
    Lines,
}

impl ParserChoice {
    /// Build the selected parser.
    pub fn build(self, max_nesting_depth: usize) -> Box<dyn MarkdownParser> {
        match self {
            ParserChoice::Lines => Box::new(LineParser::new(max_nesting_depth)),
            ParserChoice::Auto | ParserChoice::Comrak => structured(self, max_nesting_depth),
        }
    }
}

#[cfg(feature = "comrak")]
fn structured(_choice: ParserChoice, max_nesting_depth: usize) -> Box<dyn MarkdownParser> {
    Box::new(ComrakParser::new(max_nesting_depth))
}

#[cfg(not(feature = "comrak"))]
fn structured(choice: ParserChoice, max_nesting_depth: usize) -> Box<dyn MarkdownParser> {
    if choice == ParserChoice::Comrak {
        log::warn!("comrak support is not compiled in; using the line parser");
    }
    Box::new(LineParser::new(max_nesting_depth))
}

impl FromStr for ParserChoice {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ParserChoice::Auto),
            "comrak" => Ok(ParserChoice::Comrak),
            "lines" | "line" => Ok(ParserChoice::Lines),
            other => Err(FormatError::NotSupported(format!(
                "unknown markdown parser '{other}' (expected auto, comrak or lines)"
            ))),
        }
    }
}

impl fmt::Display for ParserChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParserChoice::Auto => "auto",
            ParserChoice::Comrak => "comrak",
            ParserChoice::Lines => "lines",
        };
        f.write_str(name)
    }
}
