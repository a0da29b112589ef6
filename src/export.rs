use std::fs;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::{debug, info};

use crate::domain::TVError;
use crate::record::{Field, Record};

fn build_column(records: &[Record], rows: &[usize], field: Field) -> Column {
    let name: PlSmallStr = field.key().into();
    match field {
        Field::Id => Column::new(name, rows.iter().map(|&r| records[r].id).collect::<Vec<u64>>()),
        // Written as shown in the table, so 5.0 becomes 5
        Field::Rating | Field::Price => {
            let values: Vec<String> = rows
                .iter()
                .map(|&r| records[r].display(field).into_owned())
                .collect();
            Column::new(name, values)
        }
        Field::Brand | Field::Title | Field::Category => {
            let values: Vec<&str> = rows
                .iter()
                .map(|&r| match field {
                    Field::Brand => records[r].brand.as_str(),
                    Field::Title => records[r].title.as_str(),
                    _ => records[r].category.as_str(),
                })
                .collect();
            Column::new(name, values)
        }
    }
}

/// Serializes the given rows as csv.
///
/// The header holds the field keys in `fields` order, values are separated
/// by `,` and numbers use `.` as decimal point. All given rows are written,
/// paging is not taken into account.
pub fn to_csv(records: &[Record], rows: &[usize], fields: &[Field]) -> Result<Vec<u8>, TVError> {
    let columns: Vec<Column> = fields
        .iter()
        .map(|&field| build_column(records, rows, field))
        .collect();
    let mut df = DataFrame::new(columns)?;

    let mut buffer: Vec<u8> = Vec::new();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .with_separator(b',')
        .finish(&mut df)?;
    debug!("Serialized {} rows ({} bytes) as csv", rows.len(), buffer.len());
    Ok(buffer)
}

/// Expands `~` and environment variables in a user supplied path.
pub fn expand_path(raw: &str) -> Result<PathBuf, TVError> {
    let expanded = shellexpand::full(raw)
        .map_err(|e| TVError::InvalidArgument(format!("Can not expand path \"{raw}\": {e}")))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Writes an export to disk, creating missing parent directories.
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<(), TVError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    info!("Exported {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
