use crate::splitter::Split;
use crate::table::{Column, Table};
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const FEATURES_TRAIN_FILE: &str = "X_train.csv";
pub const FEATURES_TEST_FILE: &str = "X_test.csv";
pub const TARGET_TRAIN_FILE: &str = "y_train.csv";
pub const TARGET_TEST_FILE: &str = "y_test.csv";

/// Writes the four parts of `split` as CSV files under `dir`, creating it if needed.
pub fn write_split<P: AsRef<Path>>(dir: P, split: &Split) -> Result<(), WriteError> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).map_err(|source| WriteError::Io {
        path: dir.to_owned(),
        source,
    })?;

    write_table(dir.join(FEATURES_TRAIN_FILE), &split.features_train)?;
    write_table(dir.join(FEATURES_TEST_FILE), &split.features_test)?;
    write_column(dir.join(TARGET_TRAIN_FILE), &split.target_train)?;
    write_column(dir.join(TARGET_TEST_FILE), &split.target_test)?;
    tracing::info!(dir = %dir.display(), "split data saved");
    Ok(())
}

/// Writes `table` with a header row.
///
/// A table without columns has nothing to write, so it gives an empty file.
pub fn write_table<P: AsRef<Path>>(path: P, table: &Table) -> Result<(), WriteError> {
    let mut writer = create(path.as_ref())?;
    if table.columns_len() == 0 {
        return flush(writer, path.as_ref());
    }
    writer.write_record(table.column_names())?;
    for i in 0..table.rows_len() {
        let row = table
            .columns()
            .iter()
            .map(|c| c.values()[i].to_string());
        writer.write_record(row)?;
    }
    flush(writer, path.as_ref())
}

pub fn write_column<P: AsRef<Path>>(path: P, column: &Column) -> Result<(), WriteError> {
    let mut writer = create(path.as_ref())?;
    writer.write_record([column.name()])?;
    for v in column.values() {
        writer.write_record([v.to_string()])?;
    }
    flush(writer, path.as_ref())
}

fn create(path: &Path) -> Result<csv::Writer<File>, WriteError> {
    let file = File::create(path).map_err(|source| WriteError::Io {
        path: path.to_owned(),
        source,
    })?;
    Ok(csv::Writer::from_writer(file))
}

fn flush(mut writer: csv::Writer<File>, path: &Path) -> Result<(), WriteError> {
    writer.flush().map_err(|source| WriteError::Io {
        path: path.to_owned(),
        source,
    })
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("cannot write {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write CSV")]
    Csv(#[from] csv::Error),
}
