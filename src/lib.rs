//! Spreadsheet and tabular format conversion with metadata preservation
//! and file-safety checks.
//!
//! This crate provides:
//! - Readers for .xlsx/.xlsm, legacy .xls, .csv and .tsv
//! - Writers for .xlsx/.xlsm, .csv, .tsv, .json, .yaml and .md
//! - Formatting, formulas, merges, links and comments carried as metadata
//! - Hashing, backups, collision detection and overwrite confirmation

pub mod config;
pub mod converter;
pub mod error;
pub mod formats;
pub mod metadata;
pub mod safety;
pub mod table;

// Re-export commonly used types and functions
pub use config::{create_sample_config, load_config_file, ConversionConfig, JsonOrient, MdAlignment};
pub use converter::{ConversionReport, Converter};
pub use error::{ConvertError, Result};
pub use formats::{planned_outputs, read_file, write_file, FileFormat, WriteReport};
pub use metadata::{CellFormat, SheetMetadata, WorkbookMetadata};
pub use safety::{AssumeYes, OverwritePrompt, SafetyConfig, SafetyGate, StdinPrompt};
pub use table::{CellValue, Table, TableSet};
