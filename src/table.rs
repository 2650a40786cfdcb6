use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Cell contents treated as missing values when a file is parsed.
pub const NA_MARKERS: &[&str] = &[
    "", "#N/A", "-NaN", "-nan", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Missing,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Missing => Ok(()),
            Self::Integer(v) => write!(f, "{}", v),
            // `{:?}` keeps integral floats apart from integers: `2.0`, `1e17`.
            Self::Float(v) => write!(f, "{:?}", v),
            Self::Text(v) => f.write_str(v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    kind: ColumnKind,
    values: Vec<Value>,
}

impl Column {
    /// Builds a column from already typed values.
    ///
    /// The kind is the widest one found among the values; a column without
    /// any present value is `Float`.
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        let mut kind = None;
        for v in &values {
            kind = match (kind, v) {
                (_, Value::Text(_)) => Some(ColumnKind::Text),
                (Some(ColumnKind::Text), _) => Some(ColumnKind::Text),
                (_, Value::Float(_)) => Some(ColumnKind::Float),
                (None, Value::Integer(_)) => Some(ColumnKind::Integer),
                (k, _) => k,
            };
        }
        Self {
            name: name.into(),
            kind: kind.unwrap_or(ColumnKind::Float),
            values,
        }
    }

    /// Builds a column from raw cells, inferring its kind.
    ///
    /// Every non-missing cell must parse as an integer for the column to be
    /// `Integer`, or as a float for it to be `Float`; otherwise it is `Text`.
    pub fn parse<S: AsRef<str>>(name: impl Into<String>, cells: &[S]) -> Self {
        let kind = infer_kind(cells);
        let values = cells
            .iter()
            .map(|c| parse_cell(kind, c.as_ref()))
            .collect();
        Self {
            name: name.into(),
            kind,
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns a column holding the rows at `rows`, in that order.
    ///
    /// Panics if an index is out of range.
    pub fn take(&self, rows: &[usize]) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind,
            values: rows.iter().map(|&i| self.values[i].clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows_len: usize,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        if columns.is_empty() {
            return Err(TableError::NoColumns);
        }

        let rows_len = columns[0].len();
        if columns.iter().skip(1).any(|c| c.len() != rows_len) {
            return Err(TableError::RowSizeMismatch);
        }

        let duplicate = {
            let mut names = HashSet::new();
            columns
                .iter()
                .map(Column::name)
                .find(|name| !names.insert(*name))
                .map(str::to_owned)
        };
        if let Some(name) = duplicate {
            return Err(TableError::DuplicateColumn { name });
        }

        Ok(Self { columns, rows_len })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl '_ + Iterator<Item = &str> + Clone {
        self.columns.iter().map(Column::name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn columns_len(&self) -> usize {
        self.columns.len()
    }

    pub fn rows_len(&self) -> usize {
        self.rows_len
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        if index < self.rows_len {
            Some(Row { table: self, index })
        } else {
            None
        }
    }

    /// Returns a table holding the rows at `rows`, in that order.
    ///
    /// Panics if an index is out of range.
    pub fn take_rows(&self, rows: &[usize]) -> Self {
        Self {
            columns: self.columns.iter().map(|c| c.take(rows)).collect(),
            rows_len: rows.len(),
        }
    }

    /// Detaches the column named `name`, returning the remaining table and the column.
    ///
    /// The remaining table may have no columns; it keeps the row count.
    pub fn without_column(&self, name: &str) -> Option<(Self, Column)> {
        let position = self.columns.iter().position(|c| c.name() == name)?;
        let mut columns = self.columns.clone();
        let column = columns.remove(position);
        Some((
            Self {
                columns,
                rows_len: self.rows_len,
            },
            column,
        ))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Row<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.table.column(column).map(|c| &c.values[self.index])
    }

    pub fn iter(&self) -> impl 'a + Iterator<Item = (&'a str, &'a Value)> {
        let index = self.index;
        self.table
            .columns
            .iter()
            .map(move |c| (c.name(), &c.values[index]))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("table must have at least one column")]
    NoColumns,

    #[error("some of columns have a different row count from others")]
    RowSizeMismatch,

    #[error("column {name:?} appears more than once")]
    DuplicateColumn { name: String },
}

fn is_missing(cell: &str) -> bool {
    NA_MARKERS.contains(&cell)
}

fn infer_kind<S: AsRef<str>>(cells: &[S]) -> ColumnKind {
    let present = cells
        .iter()
        .map(|c| c.as_ref())
        .filter(|c| !is_missing(c));
    if present.clone().next().is_none() {
        ColumnKind::Float
    } else if present.clone().all(|c| c.trim().parse::<i64>().is_ok()) {
        ColumnKind::Integer
    } else if present.clone().all(|c| c.trim().parse::<f64>().is_ok()) {
        ColumnKind::Float
    } else {
        ColumnKind::Text
    }
}

fn parse_cell(kind: ColumnKind, cell: &str) -> Value {
    if is_missing(cell) {
        return Value::Missing;
    }
    match kind {
        ColumnKind::Integer => cell
            .trim()
            .parse()
            .map_or_else(|_| Value::Text(cell.to_owned()), Value::Integer),
        ColumnKind::Float => cell
            .trim()
            .parse()
            .map_or_else(|_| Value::Text(cell.to_owned()), Value::Float),
        ColumnKind::Text => Value::Text(cell.to_owned()),
    }
}
