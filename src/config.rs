use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_DATA_PATH: &str = "data/raw/used-cars-dataset.csv";
pub const DEFAULT_TARGET_COLUMN: &str = "selling_price";

/// Where the dataset lives and which column is predicted.
///
/// Built once and handed to [`Dataset`](crate::Dataset); nothing in the crate
/// reads process-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatasetConfig {
    data_path: PathBuf,
    target_column: String,
    #[serde(deserialize_with = "deserialize_delimiter")]
    delimiter: u8,
}

impl DatasetConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a TOML file; keys that are absent keep their default value.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Ok(toml::from_str(&text)?)
    }

    pub fn data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }

    pub fn target_column(mut self, name: impl Into<String>) -> Self {
        self.target_column = name.into();
        self
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn get_data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn get_target_column(&self) -> &str {
        &self.target_column
    }

    pub fn get_delimiter(&self) -> u8 {
        self.delimiter
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            target_column: DEFAULT_TARGET_COLUMN.to_owned(),
            delimiter: b',',
        }
    }
}

fn deserialize_delimiter<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    match s.as_bytes() {
        [b] => Ok(*b),
        _ => Err(serde::de::Error::custom(format!(
            "delimiter must be a single byte, got {:?}",
            s
        ))),
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file")]
    Toml(#[from] toml::de::Error),
}
