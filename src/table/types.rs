use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

static EMPTY: CellValue = CellValue::Empty;

/// A single scalar value in a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    Empty,
    String(String),
    Number(f64),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl CellValue {
    /// True for `Empty` and for empty strings
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Plain text rendering used by delimited and markdown output
    pub fn to_text(&self, date_format: &str, datetime_format: &str) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::String(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::Date(d) => d.format(date_format).to_string(),
            CellValue::DateTime(dt) => dt.format(datetime_format).to_string(),
        }
    }

    /// JSON scalar rendering used by structured output
    pub fn to_json(&self, date_format: &str, datetime_format: &str) -> serde_json::Value {
        match self {
            CellValue::Empty => serde_json::Value::Null,
            CellValue::String(s) => serde_json::Value::String(s.clone()),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    serde_json::Value::from(*n as i64)
                } else {
                    serde_json::Number::from_f64(*n)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                }
            }
            CellValue::Boolean(b) => serde_json::Value::Bool(*b),
            CellValue::Date(_) | CellValue::DateTime(_) => {
                serde_json::Value::String(self.to_text(date_format, datetime_format))
            }
        }
    }
}

/// Render a number without a trailing `.0` when it is integral
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// A named grid of values with ordered, named columns
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Table {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn with_data(
        name: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<CellValue>>,
    ) -> Self {
        Table {
            name: name.into(),
            columns,
            rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns, including cells beyond the header in ragged rows
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.len())
            .max()
            .unwrap_or(0)
            .max(self.columns.len())
    }

    /// A table with no rows and no columns
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.columns.is_empty()
    }

    /// Cell at (row, col); out-of-range positions read as `Empty`
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Column names padded with `Column_<n>` for unnamed trailing columns
    pub fn header(&self) -> Vec<String> {
        let mut header = self.columns.clone();
        for idx in header.len()..self.column_count() {
            header.push(format!("Column_{}", idx + 1));
        }
        header
    }
}

/// Ordered mapping of sheet name to table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableSet {
    tables: IndexMap<String, Table>,
}

impl TableSet {
    pub fn new() -> Self {
        TableSet::default()
    }

    /// Insert a table under its own name, replacing any table with the same name
    pub fn insert(&mut self, table: Table) -> Option<Table> {
        self.tables.insert(table.name.clone(), table)
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn first(&self) -> Option<&Table> {
        self.tables.values().next()
    }

    /// Keep only the named sheets, in their original order
    pub fn retain(&mut self, names: &[String]) {
        self.tables.retain(|name, _| names.iter().any(|n| n == name));
    }

    /// Concatenate every table into one, tagging rows with their sheet name.
    ///
    /// Columns are the union of all headers in first-seen order, followed by
    /// `tag_column`. Cells missing from a sheet read as `Empty`.
    pub fn combine(&self, name: &str, tag_column: &str) -> Table {
        let mut columns: Vec<String> = Vec::new();
        for table in self.tables.values() {
            for col in table.header() {
                if col != tag_column && !columns.contains(&col) {
                    columns.push(col);
                }
            }
        }

        let mut rows = Vec::new();
        for table in self.tables.values() {
            let header = table.header();
            let positions: Vec<Option<usize>> = columns
                .iter()
                .map(|c| header.iter().position(|h| h == c))
                .collect();

            for row_idx in 0..table.row_count() {
                let mut row: Vec<CellValue> = positions
                    .iter()
                    .map(|pos| match pos {
                        Some(col_idx) => table.cell(row_idx, *col_idx).clone(),
                        None => CellValue::Empty,
                    })
                    .collect();
                row.push(CellValue::String(table.name.clone()));
                rows.push(row);
            }
        }

        columns.push(tag_column.to_string());
        Table::with_data(name, columns, rows)
    }
}

impl IntoIterator for TableSet {
    type Item = Table;
    type IntoIter = indexmap::map::IntoValues<String, Table>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.into_values()
    }
}

impl FromIterator<Table> for TableSet {
    fn from_iter<I: IntoIterator<Item = Table>>(iter: I) -> Self {
        let mut set = TableSet::new();
        for table in iter {
            set.insert(table);
        }
        set
    }
}
