use std::path::Path;

use regex::Regex;
use std::sync::OnceLock;
use umya_spreadsheet::{
    reader, writer, CellRawValue, HorizontalAlignmentValues, Hyperlink, Pane,
    PaneStateValues, PaneValues, SheetView, Spreadsheet, Table as ListObject, TableColumn,
    TableStyleInfo, VerticalAlignmentValues, Worksheet,
};

use crate::config::ConversionConfig;
use crate::error::{ConvertError, Result};
use crate::metadata::coordinate::{column_letter_to_number, MAX_COLUMN, MAX_ROW};
use crate::metadata::{
    parse_cell, parse_range, to_a1, AlignmentFormat, CellFormat, CellRange, FillFormat,
    FontFormat, SheetMetadata, TableDefinition, WorkbookMetadata, FORMULA_PLACEHOLDER,
};
use crate::table::dates::{datetime_to_serial, is_date_format};
use crate::table::{build_table, serial_to_value, CellValue, CleanOptions, DateSystem, Table, TableSet};

const MAX_COLUMN_WIDTH: f64 = 255.0;
const MAX_ROW_HEIGHT: f64 = 409.0;
const MAX_SHEET_TITLE: usize = 31;

const DATE_CODE: &str = "yyyy-mm-dd";
const DATETIME_CODE: &str = "yyyy-mm-dd hh:mm:ss";

fn defined_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_\\][A-Za-z0-9_.]{0,254}$").expect("defined name pattern is valid")
    })
}

/// Read every worksheet of an .xlsx/.xlsm workbook
pub fn read_xlsx(path: &Path, config: &ConversionConfig) -> Result<(TableSet, WorkbookMetadata)> {
    let book = reader::xlsx::read(path)
        .map_err(|e| ConvertError::parse(path, format!("Failed to open workbook: {}", e)))?;

    let options = CleanOptions::from(config);
    let mut tables = TableSet::new();
    let mut metadata = WorkbookMetadata::new(super::extension_tag(path));

    for worksheet in book.get_sheet_collection() {
        let name = worksheet.get_name().to_string();
        let (raw, sheet_meta) = read_worksheet(worksheet, config);

        tracing::debug!("Read sheet '{}' ({} raw rows)", name, raw.len());
        tables.insert(build_table(&name, raw, &options));
        metadata.sheets.insert(name, sheet_meta);
    }

    for defined in book.get_defined_names() {
        metadata
            .defined_names
            .insert(defined.get_name().to_string(), defined.get_address());
    }
    for worksheet in book.get_sheet_collection() {
        for defined in worksheet.get_defined_names() {
            metadata
                .defined_names
                .entry(defined.get_name().to_string())
                .or_insert_with(|| defined.get_address());
        }
    }

    let props = book.get_properties();
    let properties = [
        ("creator", props.get_creator()),
        ("last_modified_by", props.get_last_modified_by()),
        ("created", props.get_created()),
        ("modified", props.get_modified()),
        ("title", props.get_title()),
        ("subject", props.get_subject()),
        ("description", props.get_description()),
        ("keywords", props.get_keywords()),
        ("category", props.get_category()),
    ];
    for (key, value) in properties {
        if !value.is_empty() {
            metadata
                .document_properties
                .insert(key.to_string(), value.to_string());
        }
    }

    for property in props
        .get_custom_properties()
        .get_custom_document_property_list()
    {
        if !property.get_name().is_empty() {
            metadata
                .custom_properties
                .insert(property.get_name().to_string(), property.get_value().to_string());
        }
    }

    Ok((tables, metadata))
}

fn read_worksheet(
    worksheet: &Worksheet,
    config: &ConversionConfig,
) -> (Vec<Vec<CellValue>>, SheetMetadata) {
    let mut meta = SheetMetadata::new(worksheet.get_name());
    let (max_col, max_row) = worksheet.get_highest_column_and_row();

    let mut raw = Vec::with_capacity(max_row as usize);
    for row in 1..=max_row {
        let mut values = Vec::with_capacity(max_col as usize);
        for col in 1..=max_col {
            let Some(cell) = worksheet.get_cell((col, row)) else {
                values.push(CellValue::Empty);
                continue;
            };
            let coordinate = to_a1(col, row);

            values.push(cell_value(cell));

            let formula = cell.get_formula();
            if config.preserve_formulas && !formula.is_empty() {
                let text = if formula.starts_with('=') {
                    formula.to_string()
                } else {
                    format!("={}", formula)
                };
                meta.formulas.insert(coordinate.clone(), text);
            }

            if config.preserve_hyperlinks {
                if let Some(link) = cell.get_hyperlink() {
                    if !link.get_url().is_empty() {
                        meta.hyperlinks
                            .insert(coordinate.clone(), link.get_url().to_string());
                    }
                }
            }

            if config.preserve_formatting {
                let format = cell_format(cell.get_style());
                if !format.is_default() {
                    meta.cell_formats.insert(coordinate, format);
                }
            }
        }
        raw.push(values);
    }

    if config.preserve_comments {
        for comment in worksheet.get_comments() {
            let coordinate = comment.get_coordinate();
            meta.comments.insert(
                to_a1(*coordinate.get_col_num(), *coordinate.get_row_num()),
                comment.get_text().get_text().to_string(),
            );
        }
    }

    if config.preserve_formatting {
        for column in worksheet.get_column_dimensions() {
            let width = *column.get_width();
            if width > 0.0 {
                meta.column_widths.insert(
                    crate::metadata::column_index_to_letter(column.get_col_num().saturating_sub(1)),
                    width,
                );
            }
        }
        for row in worksheet.get_row_dimensions() {
            let height = *row.get_height();
            if height > 0.0 {
                meta.row_heights.insert(row.get_row_num().to_string(), height);
            }
        }
    }

    meta.merged_cells = worksheet
        .get_merge_cells()
        .iter()
        .map(|range| range.get_range())
        .collect();

    for list in worksheet.get_tables() {
        let (start, end) = list.get_area();
        meta.tables.push(TableDefinition {
            name: list.get_name().to_string(),
            range: format!(
                "{}:{}",
                to_a1(*start.get_col_num(), *start.get_row_num()),
                to_a1(*end.get_col_num(), *end.get_row_num())
            ),
            style: list.get_style_info().map(|s| s.get_name().to_string()),
        });
    }

    (raw, meta)
}

fn cell_value(cell: &umya_spreadsheet::Cell) -> CellValue {
    let number = match cell.get_raw_value() {
        CellRawValue::Null => return CellValue::Empty,
        CellRawValue::Bool(b) => return CellValue::Boolean(*b),
        CellRawValue::Numeric(n) => Some(*n),
        _ => None,
    };

    let number = number.or_else(|| match cell.get_data_type() {
        "n" => cell.get_value().trim().parse::<f64>().ok(),
        _ => None,
    });

    match number {
        Some(n) => {
            let is_date = cell
                .get_style()
                .get_number_format()
                .map_or(false, |nf| is_date_format(nf.get_format_code()));
            if is_date {
                serial_to_value(n, DateSystem::Excel1900)
            } else {
                CellValue::Number(n)
            }
        }
        None => {
            let text = cell.get_value();
            match (cell.get_data_type(), &*text) {
                (_, "") => CellValue::Empty,
                ("b", "1") | ("b", "TRUE") => CellValue::Boolean(true),
                ("b", "0") | ("b", "FALSE") => CellValue::Boolean(false),
                _ => CellValue::String(text.to_string()),
            }
        }
    }
}

fn cell_format(style: &umya_spreadsheet::Style) -> CellFormat {
    let font = style.get_font().map(|font| FontFormat {
        name: non_empty(font.get_name()),
        size: Some(*font.get_size()).filter(|s| *s > 0.0),
        bold: *font.get_bold(),
        italic: *font.get_italic(),
        color: non_empty(font.get_color().get_argb()),
    });

    let fill = style
        .get_background_color()
        .and_then(|c| non_empty(c.get_argb()))
        .map(|color| FillFormat { color: Some(color) });

    let alignment = style.get_alignment().map(|a| AlignmentFormat {
        horizontal: enum_name(a.get_horizontal()).filter(|h| h != "general"),
        vertical: enum_name(a.get_vertical()).filter(|v| v != "bottom"),
    });

    CellFormat {
        font,
        fill,
        alignment,
    }
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Lower-camel name of an alignment variant, e.g. `centerContinuous`
fn enum_name(value: &impl std::fmt::Debug) -> Option<String> {
    let name = format!("{:?}", value);
    let mut chars = name.chars();
    let first = chars.next()?;
    Some(first.to_ascii_lowercase().to_string() + chars.as_str())
}

/// Write a table set as a workbook, one worksheet per table, then reapply
/// whatever metadata applies to each sheet.
///
/// Metadata that cannot be applied is logged and returned, never fatal.
pub fn write_xlsx(
    tables: &TableSet,
    path: &Path,
    metadata: Option<&WorkbookMetadata>,
    config: &ConversionConfig,
) -> Result<Vec<String>> {
    let mut book = umya_spreadsheet::new_file_empty_worksheet();
    let mut skipped = Vec::new();
    let mut used_titles: Vec<String> = Vec::new();
    let mut used_table_names: Vec<String> = Vec::new();

    if tables.is_empty() {
        book.new_sheet("Sheet1")
            .map_err(|e| ConvertError::write(path, e.to_string()))?;
    }

    for table in tables.iter() {
        let title = unique_title(&table.name, &used_titles);
        used_titles.push(title.clone());
        if title != table.name {
            tracing::debug!("Sheet '{}' written as '{}'", table.name, title);
        }

        let worksheet = book
            .new_sheet(title.as_str())
            .map_err(|e| ConvertError::write(path, format!("Cannot add sheet '{}': {}", title, e)))?;

        write_values(worksheet, table, config);

        let sheet_meta = metadata.and_then(|m| m.sheet(&table.name));
        let mut log = SkipLog {
            sheet: &table.name,
            skipped: &mut skipped,
        };

        if let Some(meta) = sheet_meta {
            apply_cell_formats(worksheet, meta, &mut log);
            apply_formulas(worksheet, meta, &mut log);
            apply_hyperlinks(worksheet, meta, &mut log);
            apply_column_widths(worksheet, meta, &mut log);
            apply_row_heights(worksheet, meta, &mut log);
            apply_merges(worksheet, meta, &mut log);
        }

        if config.excel_autofilter && !table.is_empty() {
            apply_table_region(worksheet, table, config, &mut used_table_names, &mut log);
        }
        if config.excel_freeze_panes && config.excel_header && !table.is_empty() {
            freeze_header_row(worksheet);
        }
    }

    if let Some(meta) = metadata {
        apply_defined_names(&mut book, meta, &mut skipped);
    }

    writer::xlsx::write(&book, path)
        .map_err(|e| ConvertError::write(path, format!("Failed to write workbook: {}", e)))?;

    Ok(skipped)
}

/// Collects skipped metadata attributes for one sheet
struct SkipLog<'a> {
    sheet: &'a str,
    skipped: &'a mut Vec<String>,
}

impl SkipLog<'_> {
    fn skip(&mut self, message: String) {
        tracing::warn!("Sheet '{}': {}", self.sheet, message);
        self.skipped.push(format!("{}: {}", self.sheet, message));
    }
}

/// Sheet titles are at most 31 characters and cannot contain `[]:*?/\`
fn unique_title(name: &str, used: &[String]) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if "[]:*?/\\".contains(c) { '_' } else { c })
        .take(MAX_SHEET_TITLE)
        .collect();
    let cleaned = if cleaned.trim().is_empty() {
        "Sheet".to_string()
    } else {
        cleaned
    };

    let taken = |t: &str| used.iter().any(|u| u.eq_ignore_ascii_case(t));
    if !taken(&cleaned) {
        return cleaned;
    }

    let mut counter = 1;
    loop {
        let suffix = format!("_{}", counter);
        let base: String = cleaned
            .chars()
            .take(MAX_SHEET_TITLE - suffix.len())
            .collect();
        let candidate = format!("{}{}", base, suffix);
        if !taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

fn write_values(worksheet: &mut Worksheet, table: &Table, config: &ConversionConfig) {
    let data_start_row = if config.excel_header { 2u32 } else { 1u32 };

    if config.excel_header {
        for (col_idx, title) in table.header().iter().enumerate() {
            let cell = worksheet.get_cell_mut((col_idx as u32 + 1, 1));
            cell.set_value_string(title.as_str());
            cell.get_style_mut().get_font_mut().set_bold(true);
        }
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let row_num = data_start_row + row_idx as u32;

        for (col_idx, value) in row.iter().enumerate() {
            let col_num = col_idx as u32 + 1;

            match value {
                CellValue::Empty => {}
                CellValue::String(s) => {
                    worksheet.get_cell_mut((col_num, row_num)).set_value_string(s.as_str());
                }
                CellValue::Number(n) => {
                    worksheet.get_cell_mut((col_num, row_num)).set_value_number(*n);
                }
                CellValue::Boolean(b) => {
                    worksheet.get_cell_mut((col_num, row_num)).set_value_bool(*b);
                }
                CellValue::Date(d) => {
                    let cell = worksheet.get_cell_mut((col_num, row_num));
                    cell.set_value_number(datetime_to_serial(d.and_time(chrono::NaiveTime::MIN)));
                    cell.get_style_mut()
                        .get_number_format_mut()
                        .set_format_code(DATE_CODE);
                }
                CellValue::DateTime(dt) => {
                    let cell = worksheet.get_cell_mut((col_num, row_num));
                    cell.set_value_number(datetime_to_serial(*dt));
                    cell.get_style_mut()
                        .get_number_format_mut()
                        .set_format_code(DATETIME_CODE);
                }
            }
        }
    }
}

/// Normalize `RRGGBB` or `AARRGGBB` (optionally `#`-prefixed) to upper-case ARGB
fn normalize_argb(color: &str) -> Option<String> {
    let hex = color.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => Some(format!("FF{}", hex.to_ascii_uppercase())),
        8 => Some(hex.to_ascii_uppercase()),
        _ => None,
    }
}

fn horizontal_alignment(name: &str) -> Option<HorizontalAlignmentValues> {
    match name.to_ascii_lowercase().as_str() {
        "general" => Some(HorizontalAlignmentValues::General),
        "left" => Some(HorizontalAlignmentValues::Left),
        "center" => Some(HorizontalAlignmentValues::Center),
        "right" => Some(HorizontalAlignmentValues::Right),
        "fill" => Some(HorizontalAlignmentValues::Fill),
        "justify" => Some(HorizontalAlignmentValues::Justify),
        "centercontinuous" => Some(HorizontalAlignmentValues::CenterContinuous),
        "distributed" => Some(HorizontalAlignmentValues::Distributed),
        _ => None,
    }
}

fn vertical_alignment(name: &str) -> Option<VerticalAlignmentValues> {
    match name.to_ascii_lowercase().as_str() {
        "top" => Some(VerticalAlignmentValues::Top),
        "center" => Some(VerticalAlignmentValues::Center),
        "bottom" => Some(VerticalAlignmentValues::Bottom),
        "justify" => Some(VerticalAlignmentValues::Justify),
        "distributed" => Some(VerticalAlignmentValues::Distributed),
        _ => None,
    }
}

fn apply_cell_formats(worksheet: &mut Worksheet, meta: &SheetMetadata, log: &mut SkipLog) {
    for (coordinate, format) in &meta.cell_formats {
        let Some(position) = parse_cell(coordinate) else {
            log.skip(format!("invalid cell format coordinate '{}'", coordinate));
            continue;
        };

        let style = worksheet.get_cell_mut(position).get_style_mut();

        if let Some(font) = &format.font {
            // Flags only add emphasis so a styled header cell stays bold
            let target = style.get_font_mut();
            if font.bold {
                target.set_bold(true);
            }
            if font.italic {
                target.set_italic(true);
            }
            if let Some(name) = font.name.as_deref().filter(|n| !n.is_empty()) {
                target.set_name(name);
            }
            match font.size {
                Some(size) if size > 0.0 && size <= 409.0 => {
                    target.set_size(size);
                }
                Some(size) => log.skip(format!("invalid font size {} at {}", size, coordinate)),
                None => {}
            }
            if let Some(color) = font.color.as_deref().filter(|c| !c.is_empty()) {
                match normalize_argb(color) {
                    Some(argb) => {
                        target.get_color_mut().set_argb(argb);
                    }
                    None => log.skip(format!("invalid font color '{}' at {}", color, coordinate)),
                }
            }
        }

        if let Some(color) = format
            .fill
            .as_ref()
            .and_then(|f| f.color.as_deref())
            .filter(|c| !c.is_empty())
        {
            match normalize_argb(color) {
                Some(argb) => {
                    style.set_background_color(argb);
                }
                None => log.skip(format!("invalid fill color '{}' at {}", color, coordinate)),
            }
        }

        if let Some(alignment) = &format.alignment {
            if let Some(h) = alignment.horizontal.as_deref() {
                match horizontal_alignment(h) {
                    Some(value) => {
                        style.get_alignment_mut().set_horizontal(value);
                    }
                    None => log.skip(format!("unknown horizontal alignment '{}' at {}", h, coordinate)),
                }
            }
            if let Some(v) = alignment.vertical.as_deref() {
                match vertical_alignment(v) {
                    Some(value) => {
                        style.get_alignment_mut().set_vertical(value);
                    }
                    None => log.skip(format!("unknown vertical alignment '{}' at {}", v, coordinate)),
                }
            }
        }
    }
}

fn apply_formulas(worksheet: &mut Worksheet, meta: &SheetMetadata, log: &mut SkipLog) {
    for (coordinate, formula) in &meta.formulas {
        if formula == FORMULA_PLACEHOLDER {
            tracing::debug!("Skipping formula placeholder at {}", coordinate);
            continue;
        }
        let Some(position) = parse_cell(coordinate) else {
            log.skip(format!("invalid formula coordinate '{}'", coordinate));
            continue;
        };
        let text = formula.strip_prefix('=').unwrap_or(formula).trim();
        if text.is_empty() {
            log.skip(format!("empty formula at {}", coordinate));
            continue;
        }
        worksheet.get_cell_mut(position).set_formula(text);
    }
}

fn apply_hyperlinks(worksheet: &mut Worksheet, meta: &SheetMetadata, log: &mut SkipLog) {
    for (coordinate, url) in &meta.hyperlinks {
        let Some(position) = parse_cell(coordinate) else {
            log.skip(format!("invalid hyperlink coordinate '{}'", coordinate));
            continue;
        };
        if url.trim().is_empty() {
            log.skip(format!("empty hyperlink target at {}", coordinate));
            continue;
        }

        let mut link = Hyperlink::default();
        link.set_url(url.as_str());
        let cell = worksheet.get_cell_mut(position);
        cell.set_hyperlink(link);
        let font = cell.get_style_mut().get_font_mut();
        font.set_underline("single");
        font.get_color_mut().set_argb("FF0563C1");
    }
}

fn apply_column_widths(worksheet: &mut Worksheet, meta: &SheetMetadata, log: &mut SkipLog) {
    for (letter, width) in &meta.column_widths {
        if column_letter_to_number(letter).is_none() {
            log.skip(format!("invalid column '{}'", letter));
            continue;
        }
        if !width.is_finite() || *width <= 0.0 || *width > MAX_COLUMN_WIDTH {
            log.skip(format!("invalid width {} for column {}", width, letter));
            continue;
        }
        worksheet
            .get_column_dimension_mut(&letter.to_ascii_uppercase())
            .set_width(*width);
    }
}

fn apply_row_heights(worksheet: &mut Worksheet, meta: &SheetMetadata, log: &mut SkipLog) {
    for (row, height) in &meta.row_heights {
        let row_num = match row.trim().parse::<u32>() {
            Ok(n) if (1..=MAX_ROW).contains(&n) => n,
            _ => {
                log.skip(format!("invalid row number '{}'", row));
                continue;
            }
        };
        if !height.is_finite() || *height <= 0.0 || *height > MAX_ROW_HEIGHT {
            log.skip(format!("invalid height {} for row {}", height, row));
            continue;
        }
        worksheet.get_row_dimension_mut(&row_num).set_height(*height);
    }
}

fn apply_merges(worksheet: &mut Worksheet, meta: &SheetMetadata, log: &mut SkipLog) {
    let mut applied: Vec<CellRange> = Vec::new();

    for text in &meta.merged_cells {
        let Some(range) = parse_range(text) else {
            log.skip(format!("invalid merge range '{}'", text));
            continue;
        };
        if range.is_single_cell() {
            log.skip(format!("merge range '{}' covers a single cell", text));
            continue;
        }
        if applied.iter().any(|r| r.overlaps(&range)) {
            log.skip(format!("merge range '{}' overlaps an earlier merge", text));
            continue;
        }

        worksheet.add_merge_cells(range.to_string());
        applied.push(range);
    }
}

/// Table names start with a letter or underscore and hold only word characters
fn table_name(sheet: &str, used: &[String]) -> String {
    let cleaned: String = sheet
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let base = format!("Table_{}", cleaned);

    let taken = |n: &str| used.iter().any(|u| u.eq_ignore_ascii_case(n));
    if !taken(&base) {
        return base;
    }
    (1..)
        .map(|k| format!("{}_{}", base, k))
        .find(|n| !taken(n))
        .unwrap_or(base)
}

fn apply_table_region(
    worksheet: &mut Worksheet,
    table: &Table,
    config: &ConversionConfig,
    used_names: &mut Vec<String>,
    log: &mut SkipLog,
) {
    let width = table.column_count() as u32;
    let height = table.row_count() as u32 + u32::from(config.excel_header);
    if width == 0 || height == 0 || width > MAX_COLUMN || height > MAX_ROW {
        return;
    }
    let region = format!("A1:{}", to_a1(width, height));

    let header = table.header();
    let unique_header = header
        .iter()
        .enumerate()
        .all(|(i, h)| !h.is_empty() && !header[..i].iter().any(|o| o.eq_ignore_ascii_case(h)));

    if !config.excel_header || !unique_header {
        if config.excel_header {
            log.skip(format!("header names are not unique, using a plain filter on {}", region));
        }
        worksheet.set_auto_filter(region);
        return;
    }

    let name = table_name(log.sheet, used_names);
    let mut list = ListObject::new(&name, ((1, 1), (width, height)));
    for title in &header {
        list.add_column(TableColumn::new(title));
    }
    list.set_style_info(Some(TableStyleInfo::new(
        &config.excel_table_style,
        false,
        false,
        true,
        false,
    )));
    worksheet.add_table(list);
    used_names.push(name);
}

fn freeze_header_row(worksheet: &mut Worksheet) {
    let mut pane = Pane::default();
    pane.set_horizontal_split(1.0);
    pane.get_top_left_cell_mut().set_coordinate("A2");
    pane.set_active_pane(PaneValues::BottomLeft);
    pane.set_state(PaneStateValues::Frozen);

    let views = worksheet.get_sheet_views_mut();
    if views.get_sheet_view_list().is_empty() {
        views.add_sheet_view_list_mut(SheetView::default());
    }
    if let Some(view) = views.get_sheet_view_list_mut().first_mut() {
        view.set_pane(pane);
    }
}

fn apply_defined_names(book: &mut Spreadsheet, meta: &WorkbookMetadata, skipped: &mut Vec<String>) {
    for (name, address) in &meta.defined_names {
        if !defined_name_pattern().is_match(name) || parse_cell(name).is_some() {
            tracing::warn!("Invalid defined name '{}'", name);
            skipped.push(format!("defined name '{}': invalid name", name));
            continue;
        }
        let address = address.trim().trim_start_matches('=');
        if address.is_empty() {
            tracing::warn!("Defined name '{}' has no address", name);
            skipped.push(format!("defined name '{}': empty address", name));
            continue;
        }

        let owner = address_sheet(address).and_then(|sheet| {
            book.get_sheet_collection()
                .iter()
                .position(|ws| ws.get_name() == sheet)
        });
        let Some(worksheet) = book.get_sheet_collection_mut().get_mut(owner.unwrap_or(0)) else {
            tracing::warn!("No worksheet to hold defined name '{}'", name);
            skipped.push(format!("defined name '{}': no worksheet", name));
            continue;
        };
        if let Err(e) = worksheet.add_defined_name(name.as_str(), address) {
            tracing::warn!("Defined name '{}' rejected: {}", name, e);
            skipped.push(format!("defined name '{}': {}", name, e));
        }
    }
}

/// Sheet named by an address's `Sheet!` or `'My Sheet'!` prefix
fn address_sheet(address: &str) -> Option<String> {
    let (sheet, _) = address.rsplit_once('!')?;
    let sheet = sheet
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .map(|s| s.replace("''", "'"))
        .unwrap_or_else(|| sheet.to_string());
    Some(sheet).filter(|s| !s.is_empty())
}
