use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::{ConversionConfig, JsonOrient};
use crate::error::{ConvertError, Result};
use crate::metadata::WorkbookMetadata;
use crate::table::{Table, TableSet};

/// Key tagging each combined record with its sheet
pub const SHEET_KEY: &str = "_sheet_name";
/// Key of the embedded metadata block
pub const METADATA_KEY: &str = "_metadata";

fn records(table: &Table, config: &ConversionConfig) -> Vec<Map<String, Value>> {
    let header = table.header();
    (0..table.row_count())
        .map(|row| {
            header
                .iter()
                .enumerate()
                .map(|(col, name)| (name.clone(), json_cell(table, row, col, config)))
                .collect()
        })
        .collect()
}

fn json_cell(table: &Table, row: usize, col: usize, config: &ConversionConfig) -> Value {
    table
        .cell(row, col)
        .to_json(&config.date_format, &config.datetime_format)
}

/// One table in the requested JSON orientation
pub fn table_payload(table: &Table, orient: JsonOrient, config: &ConversionConfig) -> Value {
    match orient {
        JsonOrient::Records => Value::Array(records(table, config).into_iter().map(Value::Object).collect()),
        JsonOrient::Index => Value::Object(
            records(table, config)
                .into_iter()
                .enumerate()
                .map(|(idx, record)| (idx.to_string(), Value::Object(record)))
                .collect(),
        ),
        JsonOrient::Values => {
            let width = table.column_count();
            Value::Array(
                (0..table.row_count())
                    .map(|row| {
                        Value::Array((0..width).map(|col| json_cell(table, row, col, config)).collect())
                    })
                    .collect(),
            )
        }
        JsonOrient::Columns => Value::Object(
            table
                .header()
                .into_iter()
                .enumerate()
                .map(|(col, name)| {
                    let cells: Map<String, Value> = (0..table.row_count())
                        .map(|row| (row.to_string(), json_cell(table, row, col, config)))
                        .collect();
                    (name, Value::Object(cells))
                })
                .collect(),
        ),
    }
}

fn metadata_value(metadata: &WorkbookMetadata) -> Value {
    serde_json::to_value(metadata).unwrap_or_else(|e| {
        tracing::warn!("Cannot serialize metadata: {}", e);
        Value::Null
    })
}

/// Records of every sheet in one list, each tagged with its sheet name
fn tagged_records(tables: &TableSet, config: &ConversionConfig) -> Vec<Value> {
    tables
        .iter()
        .flat_map(|table| {
            records(table, config).into_iter().map(move |mut record| {
                record.insert(SHEET_KEY.to_string(), Value::String(table.name.clone()));
                Value::Object(record)
            })
        })
        .collect()
}

/// Build the JSON document for a table set.
///
/// Separate sheets become `{sheet: payload}`. With `combine_sheets` and more
/// than one sheet, `records` output is one tagged list and other orientations
/// a list of `{sheet: payload}`; a requested metadata block then wraps the
/// list as `{"data": [...], "_metadata": {...}}`.
pub fn json_document(
    tables: &TableSet,
    metadata: Option<&WorkbookMetadata>,
    config: &ConversionConfig,
) -> Value {
    let metadata = metadata.filter(|_| config.json_include_metadata);

    if config.combine_sheets && tables.len() > 1 {
        let combined = match config.json_orient {
            JsonOrient::Records => tagged_records(tables, config),
            orient => tables
                .iter()
                .map(|table| {
                    let mut entry = Map::new();
                    entry.insert(table.name.clone(), table_payload(table, orient, config));
                    Value::Object(entry)
                })
                .collect(),
        };

        return match metadata {
            Some(meta) => {
                let mut wrapper = Map::new();
                wrapper.insert("data".to_string(), Value::Array(combined));
                wrapper.insert(METADATA_KEY.to_string(), metadata_value(meta));
                Value::Object(wrapper)
            }
            None => Value::Array(combined),
        };
    }

    let mut document = Map::new();
    for table in tables.iter() {
        document.insert(table.name.clone(), table_payload(table, config.json_orient, config));
    }
    if let Some(meta) = metadata {
        document.insert(METADATA_KEY.to_string(), metadata_value(meta));
    }
    Value::Object(document)
}

/// Build the YAML document: per-sheet record lists, or `{data: [...]}` when combined
pub fn yaml_document(
    tables: &TableSet,
    metadata: Option<&WorkbookMetadata>,
    config: &ConversionConfig,
) -> Value {
    let mut document = Map::new();

    if config.combine_sheets && tables.len() > 1 {
        document.insert("data".to_string(), Value::Array(tagged_records(tables, config)));
    } else {
        for table in tables.iter() {
            document.insert(
                table.name.clone(),
                table_payload(table, JsonOrient::Records, config),
            );
        }
    }

    if let Some(meta) = metadata.filter(|_| config.yaml_include_metadata) {
        document.insert(METADATA_KEY.to_string(), metadata_value(meta));
    }
    Value::Object(document)
}

pub fn write_json(
    tables: &TableSet,
    path: &Path,
    metadata: Option<&WorkbookMetadata>,
    config: &ConversionConfig,
) -> Result<()> {
    let document = json_document(tables, metadata, config);

    let indent = vec![b' '; config.json_indent];
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    document
        .serialize(&mut serializer)
        .map_err(|e| ConvertError::write(path, e.to_string()))?;
    buffer.push(b'\n');

    std::fs::write(path, buffer).map_err(|e| ConvertError::write(path, e.to_string()))
}

pub fn write_yaml(
    tables: &TableSet,
    path: &Path,
    metadata: Option<&WorkbookMetadata>,
    config: &ConversionConfig,
) -> Result<()> {
    let text = serde_yaml::to_string(&yaml_document(tables, metadata, config))
        .map_err(|e| ConvertError::write(path, e.to_string()))?;
    std::fs::write(path, text).map_err(|e| ConvertError::write(path, e.to_string()))
}
