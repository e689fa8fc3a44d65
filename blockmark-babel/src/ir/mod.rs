//! Intermediate Representation: the generic markdown AST.
//!
//! Both markdown parser strategies produce this tree, and the block importer
//! only ever reads this tree, so the parsers stay interchangeable.

pub mod nodes;

pub use nodes::{Inline, MdList, MdListItem, MdNode, MdTable, MdTableCell, MdTableRow};
