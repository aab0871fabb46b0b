use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Formula marker recorded for legacy cells whose formula text is unavailable
pub const FORMULA_PLACEHOLDER: &str = "FORMULA_PRESENT";

const DEFAULT_FONT_NAME: &str = "Calibri";
const DEFAULT_FONT_SIZE: f64 = 11.0;

/// Font attributes of a cell
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FontFormat {
    pub name: Option<String>,
    pub size: Option<f64>,
    pub bold: bool,
    pub italic: bool,
    /// ARGB hex, e.g. `FFFF0000`
    pub color: Option<String>,
}

impl FontFormat {
    pub fn is_default(&self) -> bool {
        !self.bold
            && !self.italic
            && self.name.as_deref().map_or(true, |n| n == DEFAULT_FONT_NAME)
            && self.size.map_or(true, |s| s == DEFAULT_FONT_SIZE)
            && self
                .color
                .as_deref()
                .map_or(true, |c| c.is_empty() || c.eq_ignore_ascii_case("FF000000"))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FillFormat {
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentFormat {
    pub horizontal: Option<String>,
    pub vertical: Option<String>,
}

/// Formatting of one cell; absent parts mean "leave as default"
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CellFormat {
    pub font: Option<FontFormat>,
    pub fill: Option<FillFormat>,
    pub alignment: Option<AlignmentFormat>,
}

impl CellFormat {
    /// True when applying this format would change nothing
    pub fn is_default(&self) -> bool {
        self.font.as_ref().map_or(true, FontFormat::is_default)
            && self
                .fill
                .as_ref()
                .map_or(true, |f| f.color.as_deref().map_or(true, str::is_empty))
            && self
                .alignment
                .as_ref()
                .map_or(true, |a| a.horizontal.is_none() && a.vertical.is_none())
    }
}

/// A worksheet table (list object) definition
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TableDefinition {
    pub name: String,
    pub range: String,
    pub style: Option<String>,
}

/// Formatting and structure of one sheet that a plain table cannot hold.
///
/// Every collection starts empty, so lookups never need a presence check.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetMetadata {
    pub name: String,
    /// Keyed by A1 coordinate, only cells with non-default formatting
    pub cell_formats: IndexMap<String, CellFormat>,
    /// Keyed by column letter
    pub column_widths: IndexMap<String, f64>,
    /// Keyed by 1-based row number
    pub row_heights: IndexMap<String, f64>,
    pub merged_cells: Vec<String>,
    pub tables: Vec<TableDefinition>,
    pub formulas: IndexMap<String, String>,
    pub hyperlinks: IndexMap<String, String>,
    pub comments: IndexMap<String, String>,
}

impl SheetMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        SheetMetadata {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cell_formats.is_empty()
            && self.column_widths.is_empty()
            && self.row_heights.is_empty()
            && self.merged_cells.is_empty()
            && self.tables.is_empty()
            && self.formulas.is_empty()
            && self.hyperlinks.is_empty()
            && self.comments.is_empty()
    }
}

/// Workbook-level metadata plus one `SheetMetadata` per sheet
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbookMetadata {
    pub sheets: IndexMap<String, SheetMetadata>,
    pub defined_names: IndexMap<String, String>,
    /// User-defined document properties (`docProps/custom.xml`)
    pub custom_properties: IndexMap<String, String>,
    /// Core document properties such as creator and title
    pub document_properties: IndexMap<String, String>,
    pub file_hash: String,
    pub conversion_timestamp: String,
    /// Source extension including the dot, e.g. `.xlsx`
    pub original_format: String,
}

impl WorkbookMetadata {
    pub fn new(original_format: impl Into<String>) -> Self {
        WorkbookMetadata {
            original_format: original_format.into(),
            ..Default::default()
        }
    }

    /// Sheet metadata by name, created empty on first access
    pub fn sheet_mut(&mut self, name: &str) -> &mut SheetMetadata {
        self.sheets
            .entry(name.to_string())
            .or_insert_with(|| SheetMetadata::new(name))
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetMetadata> {
        self.sheets.get(name)
    }

    /// Keep only the named sheets and create empty entries for missing ones,
    /// so the keys match `names` exactly and in order
    pub fn align_sheets(&mut self, names: &[String]) {
        let mut aligned = IndexMap::with_capacity(names.len());
        for name in names {
            let sheet = self
                .sheets
                .shift_remove(name)
                .unwrap_or_else(|| SheetMetadata::new(name.as_str()));
            aligned.insert(name.clone(), sheet);
        }
        self.sheets = aligned;
    }
}
