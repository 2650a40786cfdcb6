use crate::table::{Column, Table, TableError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Reads a delimited file with a header row into a [`Table`].
///
/// Column kinds are inferred from the cells (see [`Column::parse`]).
pub fn load_csv<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Table, LoadError> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "loading dataset");
    if !path.is_file() {
        return Err(LoadError::NotFound {
            path: path.to_owned(),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_path(path)?;
    let names = reader.headers()?.clone();

    let mut cells = vec![Vec::new(); names.len()];
    for record in reader.records() {
        let record = record?;
        for (column, cell) in cells.iter_mut().zip(record.iter()) {
            column.push(cell.to_owned());
        }
    }

    let columns = names
        .iter()
        .zip(cells.iter())
        .map(|(name, cells)| Column::parse(name, &cells[..]))
        .collect();
    let table = Table::new(columns)?;
    tracing::info!(
        rows = table.rows_len(),
        columns = table.columns_len(),
        "dataset loaded"
    );
    Ok(table)
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("dataset not found at {path:?}; make sure the file exists or pass a valid path")]
    NotFound { path: PathBuf },

    #[error("cannot parse dataset")]
    Csv(#[from] csv::Error),

    #[error("invalid dataset")]
    Table(#[from] TableError),
}
