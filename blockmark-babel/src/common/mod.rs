//! Helpers shared by the markdown reader and writer.

pub mod escape;
pub mod inline;
pub mod lists;
pub mod markup;
pub mod table;
