use std::path::Path;

use crate::config::ConversionConfig;
use crate::error::{ConvertError, Result};
use crate::table::{build_table, CellValue, CleanOptions, Table};

use super::FileFormat;

/// Name given to the single sheet of a delimited file
pub const DEFAULT_SHEET: &str = "Sheet1";

fn delimiter(config: &ConversionConfig, format: FileFormat) -> Result<u8> {
    match format {
        FileFormat::Tsv => Ok(b'\t'),
        _ => config.delimiter_byte(),
    }
}

/// Read a CSV/TSV file into one table
pub fn read_delimited(path: &Path, config: &ConversionConfig, format: FileFormat) -> Result<Table> {
    config.check_encoding()?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter(config, format)?)
        .quote(config.quote_byte()?)
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| ConvertError::parse(path, e.to_string()))?;

    let mut raw: Vec<Vec<CellValue>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ConvertError::parse(path, e.to_string()))?;
        let mut row: Vec<CellValue> = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::String(field.to_string())
                }
            })
            .collect();

        if config.csv_include_index && !row.is_empty() {
            row.remove(0);
        }
        raw.push(row);
    }

    // Byte order mark on the very first field
    if let Some(CellValue::String(first)) = raw.first_mut().and_then(|r| r.first_mut()) {
        if let Some(stripped) = first.strip_prefix('\u{feff}') {
            *first = stripped.to_string();
        }
    }

    Ok(build_table(DEFAULT_SHEET, raw, &CleanOptions::from(config)))
}

/// Write one table as CSV/TSV
pub fn write_delimited(
    table: &Table,
    path: &Path,
    config: &ConversionConfig,
    format: FileFormat,
) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter(config, format)?)
        .quote(config.quote_byte()?)
        .flexible(true)
        .from_path(path)
        .map_err(|e| ConvertError::write(path, e.to_string()))?;

    let width = table.column_count();

    if config.csv_include_header && width > 0 {
        let mut header = Vec::with_capacity(width + 1);
        if config.csv_include_index {
            header.push(String::new());
        }
        header.extend(table.header());
        writer
            .write_record(&header)
            .map_err(|e| ConvertError::write(path, e.to_string()))?;
    }

    for (idx, row) in table.rows.iter().enumerate() {
        let mut record = Vec::with_capacity(width + 1);
        if config.csv_include_index {
            record.push(idx.to_string());
        }
        for col in 0..width {
            let value = row.get(col).unwrap_or(&CellValue::Empty);
            record.push(value.to_text(&config.date_format, &config.datetime_format));
        }
        writer
            .write_record(&record)
            .map_err(|e| ConvertError::write(path, e.to_string()))?;
    }

    writer
        .flush()
        .map_err(|e| ConvertError::write(path, e.to_string()))?;
    Ok(())
}
