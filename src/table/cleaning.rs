use crate::config::ConversionConfig;

use super::types::{CellValue, Table};

/// Post-processing applied to every table a reader produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanOptions {
    pub has_header: bool,
    pub skip_empty_rows: bool,
    pub skip_empty_columns: bool,
    pub trim_whitespace: bool,
    pub convert_numeric: bool,
}

impl From<&ConversionConfig> for CleanOptions {
    fn from(config: &ConversionConfig) -> Self {
        CleanOptions {
            has_header: config.csv_include_header,
            skip_empty_rows: config.skip_empty_rows,
            skip_empty_columns: config.skip_empty_columns,
            trim_whitespace: config.trim_whitespace,
            convert_numeric: config.convert_numeric,
        }
    }
}

/// Build a table from raw grid rows.
///
/// The first row becomes the header when `has_header` is set; blank header
/// cells are named `Column_<n>` and duplicates get a `.<k>` suffix.
pub fn build_table(name: &str, mut raw: Vec<Vec<CellValue>>, options: &CleanOptions) -> Table {
    let width = raw.iter().map(|r| r.len()).max().unwrap_or(0);

    let mut columns = Vec::with_capacity(width);
    if options.has_header && !raw.is_empty() {
        let header_row = raw.remove(0);
        for idx in 0..width {
            let text = header_row
                .get(idx)
                .map(|v| v.to_text("%Y-%m-%d", "%Y-%m-%d %H:%M:%S"))
                .unwrap_or_default();
            let text = text.trim();
            if text.is_empty() {
                columns.push(format!("Column_{}", idx + 1));
            } else {
                columns.push(text.to_string());
            }
        }
        dedupe_columns(&mut columns);
    } else {
        for idx in 0..width {
            columns.push(idx.to_string());
        }
    }

    for row in raw.iter_mut() {
        row.resize(width, CellValue::Empty);
    }

    let mut table = Table::with_data(name, columns, raw);

    if options.trim_whitespace {
        trim_whitespace(&mut table);
    }
    if options.skip_empty_rows {
        drop_empty_rows(&mut table);
    }
    if options.skip_empty_columns {
        drop_empty_columns(&mut table);
    }
    if options.convert_numeric {
        coerce_numeric(&mut table);
    }

    table
}

fn dedupe_columns(columns: &mut [String]) {
    for idx in 1..columns.len() {
        let base = columns[idx].clone();
        let mut candidate = base.clone();
        let mut k = 1;
        while columns[..idx].contains(&candidate) {
            candidate = format!("{}.{}", base, k);
            k += 1;
        }
        columns[idx] = candidate;
    }
}

/// Trim surrounding whitespace from text cells; cells left empty become `Empty`
pub fn trim_whitespace(table: &mut Table) {
    for row in table.rows.iter_mut() {
        for cell in row.iter_mut() {
            if let CellValue::String(s) = cell {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    *cell = CellValue::Empty;
                } else if trimmed.len() != s.len() {
                    *cell = CellValue::String(trimmed.to_string());
                }
            }
        }
    }
}

pub fn drop_empty_rows(table: &mut Table) {
    table.rows.retain(|row| row.iter().any(|c| !c.is_empty()));
}

/// Drop columns whose data cells are all empty, whatever the header says
pub fn drop_empty_columns(table: &mut Table) {
    let width = table.column_count();
    let keep: Vec<bool> = (0..width)
        .map(|col| (0..table.row_count()).any(|row| !table.cell(row, col).is_empty()))
        .collect();

    if keep.iter().all(|k| *k) {
        return;
    }

    let header = table.header();
    table.columns = header
        .into_iter()
        .zip(keep.iter())
        .filter(|(_, k)| **k)
        .map(|(c, _)| c)
        .collect();

    for row in table.rows.iter_mut() {
        let mut col = 0;
        row.retain(|_| {
            let kept = keep.get(col).copied().unwrap_or(false);
            col += 1;
            kept
        });
    }
}

/// Best-effort per-column coercion of text into numbers or booleans.
///
/// A column converts only when every non-empty text cell parses; otherwise
/// it is left untouched. Never fails.
pub fn coerce_numeric(table: &mut Table) {
    for col in 0..table.column_count() {
        let texts: Vec<&str> = table
            .rows
            .iter()
            .filter_map(|row| match row.get(col) {
                Some(CellValue::String(s)) if !s.is_empty() => Some(s.as_str()),
                _ => None,
            })
            .collect();

        if texts.is_empty() {
            continue;
        }

        if texts.iter().all(|s| parse_number(s).is_some()) {
            for row in table.rows.iter_mut() {
                if let Some(cell) = row.get_mut(col) {
                    if let CellValue::String(s) = cell {
                        if let Some(n) = parse_number(s) {
                            *cell = CellValue::Number(n);
                        }
                    }
                }
            }
        } else if texts.iter().all(|s| parse_bool(s).is_some()) {
            for row in table.rows.iter_mut() {
                if let Some(cell) = row.get_mut(col) {
                    if let CellValue::String(s) = cell {
                        if let Some(b) = parse_bool(s) {
                            *cell = CellValue::Boolean(b);
                        }
                    }
                }
            }
        }
    }
}

/// Parse a finite number, tolerating surrounding whitespace
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
