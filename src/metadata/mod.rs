//! Structural side-data (formatting, formulas, merges, links) carried
//! alongside the tables during a conversion.

pub mod coordinate;
pub mod types;

pub use coordinate::{column_index_to_letter, parse_cell, parse_range, to_a1, CellRange};
pub use types::*;
