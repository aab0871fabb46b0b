use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};

/// Shape of JSON output for each table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonOrient {
    /// `[{column: value}, ...]`
    #[default]
    Records,
    /// `{row_index: {column: value}}`
    Index,
    /// `[[value, ...], ...]`
    Values,
    /// `{column: {row_index: value}}`
    Columns,
}

/// Text alignment of markdown table columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MdAlignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Options for reading and writing every supported format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    // Metadata preservation
    pub preserve_formatting: bool,
    pub preserve_formulas: bool,
    pub preserve_comments: bool,
    pub preserve_hyperlinks: bool,

    // Delimited text
    pub csv_delimiter: char,
    pub csv_quotechar: char,
    pub csv_encoding: String,
    pub csv_include_index: bool,
    pub csv_include_header: bool,

    // JSON
    pub json_orient: JsonOrient,
    pub json_indent: usize,
    pub json_include_metadata: bool,

    // YAML (also controls the markdown metadata block)
    pub yaml_include_metadata: bool,

    // Markdown
    pub md_table_alignment: MdAlignment,
    pub md_max_col_width: usize,
    pub md_include_sheet_names: bool,

    // Spreadsheet output
    pub excel_header: bool,
    pub excel_freeze_panes: bool,
    pub excel_autofilter: bool,
    pub excel_table_style: String,

    // Data processing
    pub skip_empty_rows: bool,
    pub skip_empty_columns: bool,
    pub trim_whitespace: bool,
    pub convert_numeric: bool,
    pub date_format: String,
    pub datetime_format: String,

    // Multi-sheet handling
    /// `None` converts every sheet
    pub sheet_selection: Option<Vec<String>>,
    pub combine_sheets: bool,
    pub sheet_name_column: String,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        ConversionConfig {
            preserve_formatting: true,
            preserve_formulas: true,
            preserve_comments: true,
            preserve_hyperlinks: true,
            csv_delimiter: ',',
            csv_quotechar: '"',
            csv_encoding: "utf-8".to_string(),
            csv_include_index: false,
            csv_include_header: true,
            json_orient: JsonOrient::Records,
            json_indent: 2,
            json_include_metadata: true,
            yaml_include_metadata: true,
            md_table_alignment: MdAlignment::Left,
            md_max_col_width: 50,
            md_include_sheet_names: true,
            excel_header: true,
            excel_freeze_panes: true,
            excel_autofilter: true,
            excel_table_style: "TableStyleMedium2".to_string(),
            skip_empty_rows: true,
            skip_empty_columns: true,
            trim_whitespace: true,
            convert_numeric: true,
            date_format: "%Y-%m-%d".to_string(),
            datetime_format: "%Y-%m-%d %H:%M:%S".to_string(),
            sheet_selection: None,
            combine_sheets: false,
            sheet_name_column: "sheet_name".to_string(),
        }
    }
}

impl ConversionConfig {
    pub fn delimiter_byte(&self) -> Result<u8> {
        ascii_byte(self.csv_delimiter, "csv_delimiter")
    }

    pub fn quote_byte(&self) -> Result<u8> {
        ascii_byte(self.csv_quotechar, "csv_quotechar")
    }

    /// Only UTF-8 text is supported
    pub fn check_encoding(&self) -> Result<()> {
        match self.csv_encoding.to_ascii_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" | "utf-8-sig" => Ok(()),
            other => Err(ConvertError::Config(format!(
                "unsupported encoding '{}', only utf-8 is supported",
                other
            ))),
        }
    }
}

fn ascii_byte(c: char, field: &str) -> Result<u8> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(ConvertError::Config(format!(
            "{} must be a single ASCII character, got '{}'",
            field, c
        )))
    }
}
