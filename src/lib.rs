pub use config::{ConfigError, DatasetConfig};
pub use dataset::Dataset;
pub use loader::{load_csv, LoadError};
pub use splitter::{split_table, Partition, Split, SplitError, SplitOptions};
pub use table::{Column, ColumnKind, Row, Table, TableError, Value};
pub use writer::{write_split, WriteError};

pub mod config;
pub mod table;
pub mod writer;

mod dataset;
mod loader;
mod splitter;
mod stratify;
