use std::path::{Path, PathBuf};

use crate::config::ConversionConfig;
use crate::error::{ConvertError, Result};
use crate::metadata::WorkbookMetadata;
use crate::table::{Table, TableSet};

use super::{delimited, markdown, structured, xlsx, FileFormat};

/// Name of the table produced by combining sheets
pub const COMBINED_SHEET: &str = "Combined";

/// Files produced by a write and metadata that could not be reapplied
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteReport {
    pub files: Vec<PathBuf>,
    pub skipped: Vec<String>,
}

/// Write a table set to `path` in the format its extension names
pub fn write_file(
    tables: &TableSet,
    path: impl AsRef<Path>,
    metadata: Option<&WorkbookMetadata>,
    config: &ConversionConfig,
) -> Result<WriteReport> {
    let path = path.as_ref();
    let format = FileFormat::from_path(path)?;
    if !format.is_writable() {
        return Err(ConvertError::unsupported(path));
    }
    tracing::debug!("Writing {} sheet(s) to {} as {:?}", tables.len(), path.display(), format);

    let mut report = WriteReport::default();

    match format {
        FileFormat::Csv | FileFormat::Tsv => {
            report.files = write_flat(tables, path, config, format)?;
            if let Some(meta) = metadata.filter(|_| config.preserve_formatting) {
                report.files.push(write_sidecar(path, meta)?);
            }
        }
        FileFormat::Xlsx => {
            report.skipped = xlsx::write_xlsx(tables, path, metadata, config)?;
            report.files.push(path.to_path_buf());
        }
        FileFormat::Json => {
            structured::write_json(tables, path, metadata, config)?;
            report.files.push(path.to_path_buf());
        }
        FileFormat::Yaml => {
            structured::write_yaml(tables, path, metadata, config)?;
            report.files.push(path.to_path_buf());
        }
        FileFormat::Markdown => {
            markdown::write_markdown(tables, path, metadata, config)?;
            report.files.push(path.to_path_buf());
        }
        FileFormat::Xls => return Err(ConvertError::unsupported(path)),
    }

    Ok(report)
}

/// Every file `write_file` would create or replace, in the order it writes them
pub fn planned_outputs(
    tables: &TableSet,
    path: impl AsRef<Path>,
    metadata: Option<&WorkbookMetadata>,
    config: &ConversionConfig,
) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    let format = FileFormat::from_path(path)?;
    if !format.is_writable() {
        return Err(ConvertError::unsupported(path));
    }
    if !format.is_flat() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = if splits_per_sheet(tables, config) {
        tables.iter().map(|t| sheet_file(path, &t.name)).collect()
    } else {
        vec![path.to_path_buf()]
    };
    if metadata.is_some() && config.preserve_formatting {
        files.push(sidecar_path(path));
    }
    Ok(files)
}

fn splits_per_sheet(tables: &TableSet, config: &ConversionConfig) -> bool {
    tables.len() > 1 && !config.combine_sheets
}

/// Single-table formats: combined, single, or one file per sheet
fn write_flat(
    tables: &TableSet,
    path: &Path,
    config: &ConversionConfig,
    format: FileFormat,
) -> Result<Vec<PathBuf>> {
    if config.combine_sheets && tables.len() > 1 {
        let combined = tables.combine(COMBINED_SHEET, &config.sheet_name_column);
        delimited::write_delimited(&combined, path, config, format)?;
        return Ok(vec![path.to_path_buf()]);
    }

    if !splits_per_sheet(tables, config) {
        let empty = Table::default();
        let table = tables.first().unwrap_or(&empty);
        delimited::write_delimited(table, path, config, format)?;
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::with_capacity(tables.len());
    for table in tables.iter() {
        let sheet_path = sheet_file(path, &table.name);
        delimited::write_delimited(table, &sheet_path, config, format)?;
        tracing::debug!("Wrote sheet '{}' to {}", table.name, sheet_path.display());
        files.push(sheet_path);
    }
    Ok(files)
}

/// `<dir>/<stem>_<sheet>.<ext>`, with path-unsafe characters in the sheet name replaced
pub fn sheet_file(path: &Path, sheet: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let safe: String = sheet
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let mut name = format!("{}_{}", stem, safe);
    if let Some(ext) = path.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    path.with_file_name(name)
}

/// Companion file `<stem>.metadata.json` holding the workbook metadata
pub fn sidecar_path(path: &Path) -> PathBuf {
    path.with_extension("metadata.json")
}

fn write_sidecar(path: &Path, metadata: &WorkbookMetadata) -> Result<PathBuf> {
    let sidecar = sidecar_path(path);
    let text = serde_json::to_string_pretty(metadata)
        .map_err(|e| ConvertError::write(&sidecar, e.to_string()))?;
    std::fs::write(&sidecar, text).map_err(|e| ConvertError::write(&sidecar, e.to_string()))?;
    tracing::debug!("Metadata written to {}", sidecar.display());
    Ok(sidecar)
}
