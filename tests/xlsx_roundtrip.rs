use std::path::Path;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use sheetsafe::metadata::{FontFormat, FORMULA_PLACEHOLDER};
use umya_spreadsheet::structs::custom_properties::CustomDocumentProperty;
use umya_spreadsheet::{Comment, Hyperlink, PaneStateValues};
use sheetsafe::{
    read_file, write_file, CellFormat, CellValue, ConversionConfig, Converter, Table, TableSet,
    WorkbookMetadata,
};

fn s(text: &str) -> CellValue {
    CellValue::String(text.to_string())
}

fn inventory() -> Table {
    Table::with_data(
        "Inventory",
        vec![
            "sku".to_string(),
            "name".to_string(),
            "price".to_string(),
            "in_stock".to_string(),
        ],
        vec![
            vec![CellValue::Number(101.0), s("bolt"), CellValue::Number(0.25), CellValue::Boolean(true)],
            vec![CellValue::Number(102.0), s("nut"), CellValue::Number(0.1), CellValue::Boolean(false)],
            vec![CellValue::Number(103.0), s("washer"), CellValue::Number(12.5), CellValue::Boolean(true)],
        ],
    )
}

fn write_fixture(path: &Path, tables: &TableSet, metadata: Option<&WorkbookMetadata>) -> Vec<String> {
    write_file(tables, path, metadata, &ConversionConfig::default())
        .unwrap()
        .skipped
}

#[test]
fn test_xlsx_to_csv_to_xlsx_keeps_values() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("inventory.xlsx");
    let middle = dir.path().join("inventory_flat.csv");
    let back = dir.path().join("inventory_back.xlsx");

    let tables: TableSet = vec![inventory()].into_iter().collect();
    write_fixture(&source, &tables, None);

    let converter = Converter::non_interactive(ConversionConfig::default());
    converter.convert(&source, &middle).unwrap();
    converter.convert(&middle, &back).unwrap();

    let (original, _) = read_file(&source, &ConversionConfig::default()).unwrap();
    let (restored, _) = read_file(&back, &ConversionConfig::default()).unwrap();

    let original = original.first().unwrap();
    let restored = restored.first().unwrap();
    assert_eq!(original.columns, restored.columns);
    assert_eq!(original.rows, restored.rows);
    assert_eq!(original.rows, inventory().rows);
}

#[test]
fn test_bold_and_size_survive_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("styled.xlsx");

    let tables: TableSet = vec![inventory()].into_iter().collect();
    let mut metadata = WorkbookMetadata::new(".xlsx");
    metadata.sheet_mut("Inventory").cell_formats.insert(
        "A1".to_string(),
        CellFormat {
            font: Some(FontFormat {
                bold: true,
                size: Some(14.0),
                ..Default::default()
            }),
            ..Default::default()
        },
    );

    let skipped = write_fixture(&path, &tables, Some(&metadata));
    assert!(skipped.is_empty(), "unexpected skips: {:?}", skipped);

    let (_, reloaded) = read_file(&path, &ConversionConfig::default()).unwrap();
    let font = reloaded.sheets["Inventory"].cell_formats["A1"]
        .font
        .clone()
        .unwrap();
    assert!(font.bold);
    assert_eq!(font.size, Some(14.0));
}

#[test]
fn test_malformed_merge_does_not_abort() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("merged.xlsx");

    let tables: TableSet = vec![inventory()].into_iter().collect();
    let mut metadata = WorkbookMetadata::new(".xlsx");
    let sheet = metadata.sheet_mut("Inventory");
    sheet.merged_cells = vec![
        "not-a-range".to_string(),
        "B2:C2".to_string(),
        "C2:D3".to_string(),
    ];
    sheet.column_widths.insert("B".to_string(), 24.0);
    sheet.column_widths.insert("??".to_string(), 10.0);

    let skipped = write_fixture(&path, &tables, Some(&metadata));
    assert_eq!(skipped.len(), 3);
    assert!(skipped.iter().any(|s| s.contains("not-a-range")));
    assert!(skipped.iter().any(|s| s.contains("overlaps")));

    let config = ConversionConfig {
        skip_empty_rows: false,
        skip_empty_columns: false,
        ..Default::default()
    };
    let (tables, reloaded) = read_file(&path, &config).unwrap();
    let sheet = &reloaded.sheets["Inventory"];
    assert_eq!(sheet.merged_cells, vec!["B2:C2"]);
    assert_eq!(sheet.column_widths.get("B"), Some(&24.0));
    assert_eq!(tables.first().unwrap().cell(2, 1), &s("washer"));
}

#[test]
fn test_formulas_restored_and_placeholders_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("formulas.xlsx");

    let tables: TableSet = vec![inventory()].into_iter().collect();
    let mut metadata = WorkbookMetadata::new(".xls");
    let sheet = metadata.sheet_mut("Inventory");
    sheet.formulas.insert("E2".to_string(), "=C2*2".to_string());
    sheet.formulas.insert("E3".to_string(), FORMULA_PLACEHOLDER.to_string());

    write_fixture(&path, &tables, Some(&metadata));

    let (_, reloaded) = read_file(&path, &ConversionConfig::default()).unwrap();
    let formulas = &reloaded.sheets["Inventory"].formulas;
    assert_eq!(formulas.get("E2").map(String::as_str), Some("=C2*2"));
    assert!(!formulas.contains_key("E3"));
}

#[test]
fn test_hyperlinks_and_auto_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("linked.xlsx");

    let tables: TableSet = vec![inventory()].into_iter().collect();
    let mut metadata = WorkbookMetadata::new(".xlsx");
    metadata
        .sheet_mut("Inventory")
        .hyperlinks
        .insert("B2".to_string(), "https://example.com/bolt".to_string());

    write_fixture(&path, &tables, Some(&metadata));

    let (_, reloaded) = read_file(&path, &ConversionConfig::default()).unwrap();
    let sheet = &reloaded.sheets["Inventory"];
    assert_eq!(
        sheet.hyperlinks.get("B2").map(String::as_str),
        Some("https://example.com/bolt")
    );
    assert_eq!(sheet.tables.len(), 1);
    assert_eq!(sheet.tables[0].name, "Table_Inventory");
    assert_eq!(sheet.tables[0].range, "A1:D4");
}

#[test]
fn test_dates_round_trip_through_xlsx() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dates.xlsx");

    let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    let moment = day.and_hms_opt(9, 30, 0).unwrap();
    let table = Table::with_data(
        "Log",
        vec!["day".to_string(), "at".to_string()],
        vec![vec![CellValue::Date(day), CellValue::DateTime(moment)]],
    );
    let tables: TableSet = vec![table.clone()].into_iter().collect();
    write_fixture(&path, &tables, None);

    let (reloaded, _) = read_file(&path, &ConversionConfig::default()).unwrap();
    assert_eq!(reloaded.get("Log").unwrap().rows, table.rows);
}

#[test]
fn test_every_sheet_written_and_selectable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("multi.xlsx");

    let mut second = inventory();
    second.name = "Archive".to_string();
    let tables: TableSet = vec![inventory(), second].into_iter().collect();
    write_fixture(&path, &tables, None);

    let (all, metadata) = read_file(&path, &ConversionConfig::default()).unwrap();
    assert_eq!(all.names(), vec!["Inventory", "Archive"]);
    assert_eq!(metadata.sheets.keys().collect::<Vec<_>>(), vec!["Inventory", "Archive"]);

    let config = ConversionConfig {
        sheet_selection: Some(vec!["Archive".to_string()]),
        ..Default::default()
    };
    let (selected, metadata) = read_file(&path, &config).unwrap();
    assert_eq!(selected.names(), vec!["Archive"]);
    assert_eq!(metadata.sheets.len(), 1);
}

/// Workbook carrying one of each captured structure, written with umya directly
fn annotated_workbook(path: &Path) {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book.get_sheet_by_name_mut("Sheet1").unwrap();
    sheet.get_cell_mut("A1").set_value_string("item");
    sheet.get_cell_mut("B1").set_value_string("qty");
    sheet.get_cell_mut("C1").set_value_string("double");
    sheet.get_cell_mut("A2").set_value_string("bolt");
    sheet.get_cell_mut("B2").set_value_number(4.0);
    sheet.get_cell_mut("C2").set_formula("B2*2");
    sheet.get_cell_mut("A2").get_style_mut().get_font_mut().set_italic(true);

    let mut link = Hyperlink::default();
    link.set_url("https://example.com/bolt");
    sheet.get_cell_mut("A2").set_hyperlink(link);
    sheet.get_column_dimension_mut("A").set_width(30.0);

    let mut comment = Comment::default();
    comment.get_coordinate_mut().set_coordinate("B2");
    comment.set_author("qa");
    comment.get_text_mut().set_text("recounted");
    sheet.add_comments(comment);

    let mut property = CustomDocumentProperty::default();
    property.set_name("Department");
    property.set_value_string("Logistics");
    book.get_properties_mut()
        .get_custom_properties_mut()
        .add_custom_document_property_list(property);
    book.get_properties_mut().set_creator("warehouse");

    umya_spreadsheet::writer::xlsx::write(&book, path).unwrap();
}

#[test]
fn test_preserve_flags_gate_captured_structures() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("annotated.xlsx");
    annotated_workbook(&path);

    let (_, captured) = read_file(&path, &ConversionConfig::default()).unwrap();
    let sheet = &captured.sheets["Sheet1"];
    assert!(sheet.cell_formats["A2"].font.as_ref().unwrap().italic);
    assert_eq!(sheet.column_widths.get("A"), Some(&30.0));
    assert_eq!(sheet.formulas.get("C2").map(String::as_str), Some("=B2*2"));
    assert_eq!(
        sheet.hyperlinks.get("A2").map(String::as_str),
        Some("https://example.com/bolt")
    );
    assert_eq!(sheet.comments.get("B2").map(String::as_str), Some("recounted"));

    let config = ConversionConfig {
        preserve_formatting: false,
        preserve_formulas: false,
        preserve_hyperlinks: false,
        preserve_comments: false,
        ..Default::default()
    };
    let (tables, bare) = read_file(&path, &config).unwrap();
    let sheet = &bare.sheets["Sheet1"];
    assert!(sheet.cell_formats.is_empty());
    assert!(sheet.column_widths.is_empty());
    assert!(sheet.row_heights.is_empty());
    assert!(sheet.formulas.is_empty());
    assert!(sheet.hyperlinks.is_empty());
    assert!(sheet.comments.is_empty());
    assert_eq!(tables.first().unwrap().cell(0, 0), &s("bolt"));
}

#[test]
fn test_custom_properties_kept_apart_from_core_properties() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("annotated.xlsx");
    annotated_workbook(&path);

    let (_, metadata) = read_file(&path, &ConversionConfig::default()).unwrap();
    assert_eq!(
        metadata.custom_properties.get("Department").map(String::as_str),
        Some("Logistics")
    );
    assert!(!metadata.custom_properties.contains_key("creator"));
    assert_eq!(
        metadata.document_properties.get("creator").map(String::as_str),
        Some("warehouse")
    );
}

#[test]
fn test_defined_names_survive_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("named.xlsx");

    let tables: TableSet = vec![inventory()].into_iter().collect();
    let mut metadata = WorkbookMetadata::new(".xlsx");
    metadata
        .defined_names
        .insert("PriceList".to_string(), "Inventory!$C$2:$C$4".to_string());
    metadata
        .defined_names
        .insert("1bad name".to_string(), "Inventory!$A$1".to_string());

    let skipped = write_fixture(&path, &tables, Some(&metadata));
    assert_eq!(skipped.len(), 1);
    assert!(skipped[0].contains("1bad name"));

    let (_, reloaded) = read_file(&path, &ConversionConfig::default()).unwrap();
    assert_eq!(
        reloaded.defined_names.get("PriceList").map(String::as_str),
        Some("Inventory!$C$2:$C$4")
    );
    assert!(!reloaded.defined_names.contains_key("1bad name"));
}

#[test]
fn test_header_row_frozen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frozen.xlsx");
    let tables: TableSet = vec![inventory()].into_iter().collect();
    write_fixture(&path, &tables, None);

    let book = umya_spreadsheet::reader::xlsx::read(&path).unwrap();
    let sheet = book.get_sheet_by_name("Inventory").unwrap();
    let view = sheet.get_sheets_views().get_sheet_view_list().first().unwrap();
    let pane = view.get_pane().unwrap();
    assert_eq!(pane.get_top_left_cell().get_coordinate(), "A2");
    assert_eq!(*pane.get_horizontal_split(), 1.0);
    assert!(matches!(pane.get_state(), PaneStateValues::Frozen));
}

#[test]
fn test_duplicate_header_gets_plain_filter() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("filtered.xlsx");
    let table = Table::with_data(
        "Readings",
        vec!["value".to_string(), "Value".to_string()],
        vec![
            vec![CellValue::Number(1.0), CellValue::Number(2.0)],
            vec![CellValue::Number(3.0), CellValue::Number(4.0)],
        ],
    );
    let tables: TableSet = vec![table].into_iter().collect();

    let skipped = write_fixture(&path, &tables, None);
    assert_eq!(skipped.len(), 1);
    assert!(skipped[0].contains("not unique"));

    let book = umya_spreadsheet::reader::xlsx::read(&path).unwrap();
    let sheet = book.get_sheet_by_name("Readings").unwrap();
    assert!(sheet.get_tables().is_empty());
    assert_eq!(
        sheet.get_auto_filter().unwrap().get_range().get_range(),
        "A1:B3"
    );
}

#[test]
fn test_italic_entry_keeps_header_bold() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("emphasis.xlsx");

    let tables: TableSet = vec![inventory()].into_iter().collect();
    let mut metadata = WorkbookMetadata::new(".xlsx");
    metadata.sheet_mut("Inventory").cell_formats.insert(
        "A1".to_string(),
        CellFormat {
            font: Some(FontFormat {
                italic: true,
                ..Default::default()
            }),
            ..Default::default()
        },
    );
    write_fixture(&path, &tables, Some(&metadata));

    let (_, reloaded) = read_file(&path, &ConversionConfig::default()).unwrap();
    let font = reloaded.sheets["Inventory"].cell_formats["A1"]
        .font
        .clone()
        .unwrap();
    assert!(font.bold);
    assert!(font.italic);
}
