//! Readers and writers for each supported file format.

pub mod delimited;
pub mod markdown;
pub mod reader;
pub mod structured;
pub mod writer;
pub mod xls;
pub mod xlsx;

use std::path::Path;

use crate::error::{ConvertError, Result};

pub use reader::read_file;
pub use writer::{planned_outputs, write_file, WriteReport};

/// File format, decided by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Tsv,
    Xlsx,
    Xls,
    Json,
    Yaml,
    Markdown,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "tsv" => Ok(FileFormat::Tsv),
            "xlsx" | "xlsm" => Ok(FileFormat::Xlsx),
            "xls" => Ok(FileFormat::Xls),
            "json" => Ok(FileFormat::Json),
            "yaml" | "yml" => Ok(FileFormat::Yaml),
            "md" => Ok(FileFormat::Markdown),
            _ => Err(ConvertError::unsupported(path)),
        }
    }

    /// Single-table formats that need one file per sheet
    pub fn is_flat(&self) -> bool {
        matches!(self, FileFormat::Csv | FileFormat::Tsv)
    }

    pub fn is_readable(&self) -> bool {
        matches!(
            self,
            FileFormat::Csv | FileFormat::Tsv | FileFormat::Xlsx | FileFormat::Xls
        )
    }

    pub fn is_writable(&self) -> bool {
        !matches!(self, FileFormat::Xls)
    }
}

/// Lower-cased extension of `path` with its leading dot, e.g. `.xlsx`
pub(crate) fn extension_tag(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_ascii_lowercase()))
        .unwrap_or_default()
}
