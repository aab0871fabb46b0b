use std::path::Path;

use crate::config::ConversionConfig;
use crate::error::{ConvertError, Result};
use crate::metadata::WorkbookMetadata;
use crate::table::TableSet;

use super::{delimited, extension_tag, xls, xlsx, FileFormat};

/// Read any supported input into a table set and its metadata.
///
/// The returned metadata holds exactly one sheet entry per table, in the
/// same order.
pub fn read_file(path: impl AsRef<Path>, config: &ConversionConfig) -> Result<(TableSet, WorkbookMetadata)> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConvertError::not_found(path));
    }

    let format = FileFormat::from_path(path)?;
    if !format.is_readable() {
        return Err(ConvertError::unsupported(path));
    }
    tracing::debug!("Reading {} as {:?}", path.display(), format);

    let (mut tables, mut metadata) = match format {
        FileFormat::Csv | FileFormat::Tsv => {
            let table = delimited::read_delimited(path, config, format)?;
            let mut metadata = WorkbookMetadata::new(extension_tag(path));
            metadata.sheet_mut(&table.name);
            (TableSet::from_iter([table]), metadata)
        }
        FileFormat::Xlsx => xlsx::read_xlsx(path, config)?,
        FileFormat::Xls => xls::read_xls(path, config)?,
        FileFormat::Json | FileFormat::Yaml | FileFormat::Markdown => {
            return Err(ConvertError::unsupported(path));
        }
    };

    if let Some(selection) = &config.sheet_selection {
        select_sheets(&mut tables, selection, path)?;
    }

    metadata.align_sheets(&tables.names());
    Ok((tables, metadata))
}

/// Keep only the selected sheets; unknown names are logged and ignored
fn select_sheets(tables: &mut TableSet, selection: &[String], path: &Path) -> Result<()> {
    for name in selection {
        if tables.get(name).is_none() {
            tracing::warn!("Sheet '{}' not found in {}", name, path.display());
        }
    }

    tables.retain(selection);
    if tables.is_empty() {
        return Err(ConvertError::parse(
            path,
            format!("none of the selected sheets exist: {}", selection.join(", ")),
        ));
    }
    Ok(())
}
