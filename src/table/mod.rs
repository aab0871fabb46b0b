//! In-memory tables shared by every reader and writer.

pub mod cleaning;
pub mod dates;
pub mod types;

pub use cleaning::{build_table, CleanOptions};
pub use dates::{serial_to_value, DateSystem};
pub use types::*;
