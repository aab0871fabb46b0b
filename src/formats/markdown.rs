use std::path::Path;

use unicode_width::UnicodeWidthStr;

use crate::config::{ConversionConfig, MdAlignment};
use crate::error::{ConvertError, Result};
use crate::metadata::WorkbookMetadata;
use crate::table::{CellValue, Table, TableSet};

const ELLIPSIS: &str = "...";
const MIN_RULE_WIDTH: usize = 3;

/// Cut text cells longer than `max_width` characters, marking the cut with `...`
fn truncate(text: &str, max_width: usize) -> String {
    if text.chars().count() > max_width {
        let kept: String = text.chars().take(max_width).collect();
        kept + ELLIPSIS
    } else {
        text.to_string()
    }
}

fn escape(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

fn pad(text: &str, width: usize, alignment: MdAlignment) -> String {
    let fill = width.saturating_sub(text.width());
    match alignment {
        MdAlignment::Left => format!("{}{}", text, " ".repeat(fill)),
        MdAlignment::Right => format!("{}{}", " ".repeat(fill), text),
        MdAlignment::Center => {
            let left = fill / 2;
            format!("{}{}{}", " ".repeat(left), text, " ".repeat(fill - left))
        }
    }
}

/// Separator cell spanning a padded column of `width`
fn rule(width: usize, alignment: MdAlignment) -> String {
    match alignment {
        MdAlignment::Left => format!(":{}", "-".repeat(width + 1)),
        MdAlignment::Right => format!("{}:", "-".repeat(width + 1)),
        MdAlignment::Center => format!(":{}:", "-".repeat(width)),
    }
}

/// Render one table as a GitHub pipe table
pub fn pipe_table(table: &Table, config: &ConversionConfig) -> String {
    let header: Vec<String> = table.header().iter().map(|h| escape(h)).collect();
    let alignment = config.md_table_alignment;

    let body: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| {
            (0..header.len())
                .map(|col| {
                    let text = match row.get(col).unwrap_or(&CellValue::Empty) {
                        CellValue::String(s) => truncate(s, config.md_max_col_width),
                        other => other.to_text(&config.date_format, &config.datetime_format),
                    };
                    escape(&text)
                })
                .collect()
        })
        .collect();

    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(col, title)| {
            body.iter()
                .map(|row| row[col].width())
                .chain(std::iter::once(title.width()))
                .max()
                .unwrap_or(0)
                .max(MIN_RULE_WIDTH)
        })
        .collect();

    let line = |cells: &[String]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| pad(cell, *width, alignment))
            .collect();
        format!("| {} |", padded.join(" | "))
    };

    let mut lines = Vec::with_capacity(body.len() + 2);
    lines.push(line(&header[..]));
    let rules: Vec<String> = widths.iter().map(|w| rule(*w, alignment)).collect();
    lines.push(format!("|{}|", rules.join("|")));
    for row in &body {
        lines.push(line(&row[..]));
    }
    lines.join("\n")
}

/// Render a table set as a markdown document
pub fn render_markdown(
    tables: &TableSet,
    metadata: Option<&WorkbookMetadata>,
    config: &ConversionConfig,
) -> Result<String> {
    let mut lines: Vec<String> = Vec::new();
    let multi = tables.len() > 1;

    if multi {
        lines.push("# Spreadsheet Data\n".to_string());
    }

    for table in tables.iter() {
        if multi || config.md_include_sheet_names {
            lines.push(format!("## {}\n", table.name));
        }

        if table.row_count() == 0 || table.column_count() == 0 {
            lines.push("*No data in this sheet*\n".to_string());
            continue;
        }

        lines.push(pipe_table(table, config));
        lines.push("\n".to_string());
    }

    if let Some(meta) = metadata.filter(|_| config.yaml_include_metadata) {
        let yaml = serde_yaml::to_string(meta)
            .map_err(|e| ConvertError::Config(format!("Cannot render metadata: {}", e)))?;
        lines.push("## Metadata\n".to_string());
        lines.push("```yaml".to_string());
        lines.push(yaml);
        lines.push("```\n".to_string());
    }

    Ok(lines.join("\n"))
}

pub fn write_markdown(
    tables: &TableSet,
    path: &Path,
    metadata: Option<&WorkbookMetadata>,
    config: &ConversionConfig,
) -> Result<()> {
    let text = render_markdown(tables, metadata, config)
        .map_err(|e| ConvertError::write(path, e.to_string()))?;
    std::fs::write(path, text).map_err(|e| ConvertError::write(path, e.to_string()))
}
