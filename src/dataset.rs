use crate::config::DatasetConfig;
use crate::loader::{self, LoadError};
use crate::splitter::{self, Split, SplitError, SplitOptions};
use crate::table::Table;
use std::path::Path;

/// Loads and splits the dataset described by a [`DatasetConfig`].
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    config: DatasetConfig,
}

impl Dataset {
    pub fn new(config: DatasetConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    /// Loads `path`, or the configured data path when `path` is `None`.
    pub fn load(&self, path: Option<&Path>) -> Result<Table, LoadError> {
        let path = path.unwrap_or_else(|| self.config.get_data_path());
        loader::load_csv(path, self.config.get_delimiter())
    }

    /// Splits `table` on the configured target column.
    pub fn split(&self, table: &Table, options: &SplitOptions) -> Result<Split, SplitError> {
        splitter::split_table(table, self.config.get_target_column(), options)
    }
}
