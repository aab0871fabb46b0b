use std::io::Read;
use std::path::Path;

use calamine::{open_workbook, Data, Range, Reader, Xls};

use crate::config::ConversionConfig;
use crate::error::{ConvertError, Result};
use crate::metadata::{to_a1, SheetMetadata, WorkbookMetadata, FORMULA_PLACEHOLDER};
use crate::table::{build_table, serial_to_value, CellValue, CleanOptions, DateSystem, Table, TableSet};

/// Data rows kept per legacy sheet, header excluded
pub const MAX_DATA_ROWS: usize = 10_000;
/// Columns kept per legacy sheet
pub const MAX_COLUMNS: usize = 256;

/// Marker written in place of error cells
pub const ERROR_MARKER: &str = "#ERROR";

const RECORD_DATEMODE: u16 = 0x0022;
const RECORD_EOF: u16 = 0x000A;

/// Read every worksheet of a legacy .xls workbook
pub fn read_xls(path: &Path, config: &ConversionConfig) -> Result<(TableSet, WorkbookMetadata)> {
    let mut workbook: Xls<_> = open_workbook(path)
        .map_err(|e| ConvertError::parse(path, format!("Failed to open workbook: {}", e)))?;

    let system = read_date_system(path);
    tracing::debug!("{} uses {:?} dates", path.display(), system);

    let mut tables = TableSet::new();
    let mut metadata = WorkbookMetadata::new(".xls");

    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ConvertError::parse(path, format!("Failed to read sheet '{}': {}", name, e)))?;

        let formulas = if config.preserve_formulas {
            match workbook.worksheet_formula(&name) {
                Ok(formulas) => Some(formulas),
                Err(e) => {
                    tracing::warn!("Formulas of sheet '{}' unavailable: {}", name, e);
                    None
                }
            }
        } else {
            None
        };

        let (table, sheet_meta) = legacy_sheet(&name, &range, formulas.as_ref(), system, config);
        tables.insert(table);
        metadata.sheets.insert(name, sheet_meta);
    }

    for (name, address) in workbook.defined_names() {
        metadata.defined_names.insert(name.clone(), address.clone());
    }

    Ok((tables, metadata))
}

/// Convert one legacy worksheet, keeping at most `MAX_DATA_ROWS` data rows
/// and `MAX_COLUMNS` columns.
///
/// Formula cells keep their cached result; their coordinates are recorded
/// with `FORMULA_PLACEHOLDER` since the formula text is not carried over.
pub fn legacy_sheet(
    name: &str,
    range: &Range<Data>,
    formulas: Option<&Range<String>>,
    system: DateSystem,
    config: &ConversionConfig,
) -> (Table, SheetMetadata) {
    let mut meta = SheetMetadata::new(name);
    let (height, width) = range.get_size();
    let (start_row, start_col) = range.start().unwrap_or((0, 0));

    let row_limit = MAX_DATA_ROWS + usize::from(config.csv_include_header);
    let kept_rows = height.min(row_limit);
    let kept_cols = width.min(MAX_COLUMNS);
    if kept_rows < height || kept_cols < width {
        tracing::debug!(
            "Sheet '{}' truncated from {}x{} to {}x{}",
            name,
            height,
            width,
            kept_rows,
            kept_cols
        );
    }

    let raw: Vec<Vec<CellValue>> = range
        .rows()
        .take(kept_rows)
        .map(|row| {
            row.iter()
                .take(kept_cols)
                .map(|data| legacy_value(data, system))
                .collect()
        })
        .collect();

    if let Some(formulas) = formulas {
        let (f_row, f_col) = formulas.start().unwrap_or((0, 0));
        for (row, col, text) in formulas.used_cells() {
            if text.is_empty() {
                continue;
            }
            let abs_row = f_row as usize + row;
            let abs_col = f_col as usize + col;
            let inside = abs_row >= start_row as usize
                && abs_row < start_row as usize + kept_rows
                && abs_col >= start_col as usize
                && abs_col < start_col as usize + kept_cols;
            if inside {
                meta.formulas.insert(
                    to_a1(abs_col as u32 + 1, abs_row as u32 + 1),
                    FORMULA_PLACEHOLDER.to_string(),
                );
            }
        }
    }

    (build_table(name, raw, &CleanOptions::from(config)), meta)
}

fn legacy_value(data: &Data, system: DateSystem) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                CellValue::Empty
            } else {
                CellValue::String(trimmed.to_string())
            }
        }
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::DateTime(dt) => serial_to_value(dt.as_f64(), system),
        Data::DateTimeIso(s) => parse_iso(s),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(_) => CellValue::String(ERROR_MARKER.to_string()),
    }
}

fn parse_iso(text: &str) -> CellValue {
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
        return CellValue::DateTime(dt);
    }
    if let Ok(d) = chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return CellValue::Date(d);
    }
    CellValue::String(text.to_string())
}

/// Date system of a legacy workbook, defaulting to 1900 when the
/// container or its globals stream cannot be read
pub fn read_date_system(path: &Path) -> DateSystem {
    let stream = cfb::open(path).and_then(|mut file| {
        let name = if file.exists("/Workbook") { "/Workbook" } else { "/Book" };
        let mut stream = file.open_stream(name)?;
        let mut bytes = Vec::new();
        stream.read_to_end(&mut bytes)?;
        Ok(bytes)
    });

    match stream {
        Ok(bytes) => date_system_from_biff(&bytes),
        Err(e) => {
            tracing::warn!("Cannot read date system of {}: {}", path.display(), e);
            DateSystem::default()
        }
    }
}

/// Scan the workbook globals substream for the `DATEMODE` record
pub fn date_system_from_biff(bytes: &[u8]) -> DateSystem {
    let mut offset = 0;
    let mut records = 0;

    while offset + 4 <= bytes.len() {
        let kind = u16::from_le_bytes([bytes[offset], bytes[offset + 1]]);
        let len = u16::from_le_bytes([bytes[offset + 2], bytes[offset + 3]]) as usize;
        let body = offset + 4;
        if body + len > bytes.len() {
            break;
        }

        match kind {
            RECORD_DATEMODE if len >= 2 => {
                let flag = u16::from_le_bytes([bytes[body], bytes[body + 1]]);
                return if flag == 1 {
                    DateSystem::Excel1904
                } else {
                    DateSystem::Excel1900
                };
            }
            // End of the globals substream, first record is BOF
            RECORD_EOF if records > 0 => break,
            _ => {}
        }

        offset = body + len;
        records += 1;
    }

    DateSystem::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(kind: u16, body: &[u8]) -> Vec<u8> {
        let mut bytes = kind.to_le_bytes().to_vec();
        bytes.extend((body.len() as u16).to_le_bytes());
        bytes.extend(body);
        bytes
    }

    fn biff(datemode: Option<u16>) -> Vec<u8> {
        let mut bytes = record(0x0809, &[0u8; 16]);
        bytes.extend(record(0x0042, &[0xE4, 0x04]));
        if let Some(flag) = datemode {
            bytes.extend(record(RECORD_DATEMODE, &flag.to_le_bytes()));
        }
        bytes.extend(record(RECORD_EOF, &[]));
        // A sheet substream that must never be scanned
        bytes.extend(record(RECORD_DATEMODE, &1u16.to_le_bytes()));
        bytes
    }

    #[test]
    fn test_date_system_from_biff() {
        assert_eq!(date_system_from_biff(&biff(Some(1))), DateSystem::Excel1904);
        assert_eq!(date_system_from_biff(&biff(Some(0))), DateSystem::Excel1900);
        assert_eq!(date_system_from_biff(&biff(None)), DateSystem::Excel1900);
        assert_eq!(date_system_from_biff(&[0x22, 0x00]), DateSystem::Excel1900);
    }

    #[test]
    fn test_truncates_to_row_cap() {
        let mut range: Range<Data> = Range::new((0, 0), (15_000, 1));
        range.set_value((0, 0), Data::String("id".to_string()));
        range.set_value((0, 1), Data::String("label".to_string()));
        for row in 1..=15_000u32 {
            range.set_value((row, 0), Data::Float(row as f64));
            range.set_value((row, 1), Data::String(format!("row {}", row)));
        }

        let (table, _) = legacy_sheet(
            "Big",
            &range,
            None,
            DateSystem::Excel1900,
            &ConversionConfig::default(),
        );
        assert_eq!(table.row_count(), MAX_DATA_ROWS);
        assert_eq!(table.columns, vec!["id", "label"]);
        assert_eq!(table.cell(9_999, 0), &CellValue::Number(10_000.0));
    }

    #[test]
    fn test_truncates_to_column_cap() {
        let mut range: Range<Data> = Range::new((0, 0), (1, 299));
        for col in 0..300u32 {
            range.set_value((0, col), Data::String(format!("c{}", col)));
            range.set_value((1, col), Data::Int(col as i64));
        }

        let (table, _) = legacy_sheet(
            "Wide",
            &range,
            None,
            DateSystem::Excel1900,
            &ConversionConfig::default(),
        );
        assert_eq!(table.column_count(), MAX_COLUMNS);
    }

    #[test]
    fn test_cell_type_mapping() {
        let mut range: Range<Data> = Range::new((0, 0), (1, 4));
        for (col, title) in ["text", "flag", "when", "err", "n"].iter().enumerate() {
            range.set_value((0, col as u32), Data::String(title.to_string()));
        }
        range.set_value((1, 0), Data::String("  padded  ".to_string()));
        range.set_value((1, 1), Data::Bool(true));
        range.set_value(
            (1, 2),
            Data::DateTime(calamine::ExcelDateTime::new(
                0.0,
                calamine::ExcelDateTimeType::DateTime,
                true,
            )),
        );
        range.set_value((1, 3), Data::Error(calamine::CellErrorType::Div0));
        range.set_value((1, 4), Data::Float(2.5));

        let config = ConversionConfig {
            convert_numeric: false,
            ..Default::default()
        };
        let (table, _) = legacy_sheet("T", &range, None, DateSystem::Excel1904, &config);

        assert_eq!(table.cell(0, 0), &CellValue::String("padded".to_string()));
        assert_eq!(table.cell(0, 1), &CellValue::Boolean(true));
        assert_eq!(
            table.cell(0, 2),
            &CellValue::Number(0.0),
            "serial 0 is not a calendar date"
        );
        assert_eq!(table.cell(0, 3), &CellValue::String(ERROR_MARKER.to_string()));
        assert_eq!(table.cell(0, 4), &CellValue::Number(2.5));
    }

    #[test]
    fn test_1904_serials() {
        assert_eq!(
            legacy_value(
                &Data::DateTime(calamine::ExcelDateTime::new(
                    1.0,
                    calamine::ExcelDateTimeType::DateTime,
                    true,
                )),
                DateSystem::Excel1904,
            ),
            CellValue::Date(NaiveDate::from_ymd_opt(1904, 1, 2).unwrap())
        );
    }

    #[test]
    fn test_formula_placeholders() {
        let mut range: Range<Data> = Range::new((0, 0), (1, 1));
        range.set_value((0, 0), Data::String("a".to_string()));
        range.set_value((0, 1), Data::String("b".to_string()));
        range.set_value((1, 0), Data::Float(1.0));
        range.set_value((1, 1), Data::Float(2.0));

        let mut formulas: Range<String> = Range::new((1, 1), (1, 1));
        formulas.set_value((1, 1), "A2*2".to_string());

        let (_, meta) = legacy_sheet(
            "F",
            &range,
            Some(&formulas),
            DateSystem::Excel1900,
            &ConversionConfig::default(),
        );
        assert_eq!(meta.formulas.get("B2").map(String::as_str), Some(FORMULA_PLACEHOLDER));
        assert_eq!(meta.formulas.len(), 1);
    }
}
