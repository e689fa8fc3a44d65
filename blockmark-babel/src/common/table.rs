//! TableExtractor: parsed table → row-major grid of inline-markup cells.
//!
//! Rows shorter than the widest row are padded with empty cells so the grid
//! is rectangular.

use super::inline::render_inlines;
use crate::ir::MdTable;

pub fn extract_table(table: &MdTable) -> Vec<Vec<String>> {
    let mut grid: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| {
            row.cells
                .iter()
                .map(|cell| render_inlines(&cell.children).trim().to_string())
                .collect()
        })
        .collect();

    let width = grid.iter().map(Vec::len).max().unwrap_or(0);
    for row in &mut grid {
        row.resize(width, String::new());
    }
    grid
}
