//! Format implementations
//!
//! This module contains the format implementations that convert between the
//! block-document model and text representations, plus the tree view used
//! for inspecting the intermediate markdown AST.

pub mod icons;
pub mod json;
pub mod markdown;
pub mod treeviz;

pub use json::{JsonFormat, JsonOptions};
pub use markdown::MarkdownFormat;
