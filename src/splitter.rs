use crate::stratify;
use crate::table::{Column, Table};
use rand::rngs::StdRng;
use rand::seq::SliceRandom as _;
use rand::{Rng, SeedableRng as _};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct SplitOptions {
    test_fraction: f64,
    seed: u64,
    stratify: bool,
}

impl SplitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Proportion of rows assigned to the test partition; must be in `(0, 1)`.
    pub fn test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Preserves the relative frequency of each target value in both partitions.
    pub fn stratify(mut self, enabled: bool) -> Self {
        self.stratify = enabled;
        self
    }
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            test_fraction: 0.3,
            seed: 42,
            stratify: true,
        }
    }
}

/// Train and test partitions of a table.
///
/// Row `k` of `features_train` belongs with element `k` of `target_train`,
/// and was row `train_indices[k]` of the source table (likewise for test).
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub features_train: Table,
    pub features_test: Table,
    pub target_train: Column,
    pub target_test: Column,
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Splits `table` into train and test partitions on `target_column`.
///
/// The same table, options and seed always produce the same partition.
pub fn split_table(
    table: &Table,
    target_column: &str,
    options: &SplitOptions,
) -> Result<Split, SplitError> {
    let fraction = options.test_fraction;
    if !(fraction > 0.0 && fraction < 1.0) {
        return Err(SplitError::InvalidTestFraction { fraction });
    }

    let (features, target) =
        table
            .without_column(target_column)
            .ok_or_else(|| SplitError::MissingTargetColumn {
                column: target_column.to_owned(),
                available: table.column_names().map(str::to_owned).collect(),
            })?;

    let rows = table.rows_len();
    let test_len = test_rows(rows, fraction);
    let train_len = rows - test_len;
    if test_len == 0 || train_len == 0 {
        return Err(SplitError::EmptyPartition { rows, fraction });
    }

    let mut rng = StdRng::seed_from_u64(options.seed);
    let (train_indices, test_indices) = if options.stratify {
        stratified_indices(&mut rng, &target, test_len)?
    } else {
        shuffled_indices(&mut rng, rows, test_len)
    };
    debug_assert_eq!(train_indices.len(), train_len);
    debug_assert_eq!(test_indices.len(), test_len);

    tracing::debug!(
        train = train_indices.len(),
        test = test_indices.len(),
        stratify = options.stratify,
        seed = options.seed,
        "dataset split"
    );

    Ok(Split {
        features_train: features.take_rows(&train_indices),
        features_test: features.take_rows(&test_indices),
        target_train: target.take(&train_indices),
        target_test: target.take(&test_indices),
        train_indices,
        test_indices,
    })
}

fn test_rows(rows: usize, fraction: f64) -> usize {
    let exact = fraction * rows as f64;
    let nearest = exact.round();
    // `0.7 * 100` is `70.00000000000001`, which must still give 70 rows.
    if nearest >= 1.0 && (exact - nearest).abs() <= nearest * 1e-12 {
        nearest as usize
    } else {
        exact.ceil() as usize
    }
}

fn shuffled_indices<R: Rng + ?Sized>(
    rng: &mut R,
    rows: usize,
    test_len: usize,
) -> (Vec<usize>, Vec<usize>) {
    let mut test = (0..rows).collect::<Vec<_>>();
    test.shuffle(rng);
    let train = test.split_off(test_len);
    (train, test)
}

fn stratified_indices<R: Rng + ?Sized>(
    rng: &mut R,
    target: &Column,
    test_len: usize,
) -> Result<(Vec<usize>, Vec<usize>), SplitError> {
    let classes = stratify::classes(target.values());
    if let Some((class, rows)) = classes.iter().find(|(_, rows)| rows.len() < 2) {
        return Err(SplitError::SingletonClass {
            class: class.to_string(),
            count: rows.len(),
        });
    }

    let rows = target.len();
    let train_len = rows - test_len;
    for (partition, len) in [(Partition::Train, train_len), (Partition::Test, test_len)] {
        if len < classes.len() {
            return Err(SplitError::TooFewRowsForClasses {
                partition,
                rows: len,
                classes: classes.len(),
            });
        }
    }

    let counts = classes.values().map(Vec::len).collect::<Vec<_>>();
    let allocation = stratify::allocate(rng, &counts, test_len);

    let mut train = Vec::with_capacity(train_len);
    let mut test = Vec::with_capacity(test_len);
    for ((_, mut members), n) in classes.into_iter().zip(allocation) {
        members.shuffle(rng);
        test.extend_from_slice(&members[..n]);
        train.extend_from_slice(&members[n..]);
    }
    train.shuffle(rng);
    test.shuffle(rng);
    Ok((train, test))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    Train,
    Test,
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Train => f.write_str("train"),
            Self::Test => f.write_str("test"),
        }
    }
}

#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SplitError {
    #[error("target column {column:?} not found in table columns: {available:?}")]
    MissingTargetColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("test fraction must be greater than 0 and less than 1, got {fraction}")]
    InvalidTestFraction { fraction: f64 },

    #[error("a test fraction of {fraction} leaves one partition of {rows} rows empty")]
    EmptyPartition { rows: usize, fraction: f64 },

    #[error(
        "cannot stratify: target value {class} occurs {count} time(s), at least 2 are required"
    )]
    SingletonClass { class: String, count: usize },

    #[error("cannot stratify: the {partition} partition has {rows} rows for {classes} classes")]
    TooFewRowsForClasses {
        partition: Partition,
        rows: usize,
        classes: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;
    use std::collections::{BTreeMap, BTreeSet};

    /// Table with an `id` column equal to the row number and a `label` column.
    fn labelled_table(labels: &[&str]) -> Table {
        let ids = (0..labels.len())
            .map(|i| Value::Integer(i as i64))
            .collect();
        let labels = labels.iter().map(|l| Value::Text(l.to_string())).collect();
        Table::new(vec![Column::new("id", ids), Column::new("label", labels)])
            .expect("valid table")
    }

    fn counts(column: &Column) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for v in column.values() {
            *counts.entry(v.to_string()).or_insert(0) += 1;
        }
        counts
    }

    fn ids(table: &Table) -> Vec<usize> {
        table
            .column("id")
            .expect("id column")
            .values()
            .iter()
            .map(|v| match v {
                Value::Integer(i) => *i as usize,
                other => panic!("unexpected id {:?}", other),
            })
            .collect()
    }

    fn assert_partition(split: &Split, rows: usize) {
        let train = split.train_indices.iter().copied().collect::<BTreeSet<_>>();
        let test = split.test_indices.iter().copied().collect::<BTreeSet<_>>();
        assert_eq!(train.len(), split.train_indices.len());
        assert_eq!(test.len(), split.test_indices.len());
        assert!(train.is_disjoint(&test));
        assert_eq!(
            train.union(&test).copied().collect::<Vec<_>>(),
            (0..rows).collect::<Vec<_>>()
        );
        assert_eq!(ids(&split.features_train), split.train_indices);
        assert_eq!(ids(&split.features_test), split.test_indices);
    }

    #[test]
    fn plain_split_sizes() -> Result<(), anyhow::Error> {
        let labels = (0..100)
            .map(|i| if i % 3 == 0 { "x" } else { "y" })
            .collect::<Vec<_>>();
        let table = labelled_table(&labels);

        let options = SplitOptions::new().stratify(false);
        let split = split_table(&table, "label", &options)?;
        assert_eq!(split.features_train.rows_len(), 70);
        assert_eq!(split.features_test.rows_len(), 30);
        assert_eq!(split.target_train.len(), 70);
        assert_eq!(split.target_test.len(), 30);
        assert_partition(&split, 100);

        let split = split_table(&table, "label", &options.test_fraction(0.25))?;
        assert_eq!(split.test_indices.len(), 25);
        assert_eq!(split.train_indices.len(), 75);

        let split = split_table(&table, "label", &SplitOptions::new().test_fraction(0.333))?;
        assert_eq!(split.test_indices.len(), 34);
        assert_eq!(split.train_indices.len(), 66);
        Ok(())
    }

    #[test]
    fn target_is_detached_from_features() -> Result<(), anyhow::Error> {
        let table = labelled_table(&["a", "b", "a", "b", "a", "b"]);
        let split = split_table(&table, "label", &SplitOptions::new().test_fraction(0.5))?;
        assert_eq!(
            split.features_train.column_names().collect::<Vec<_>>(),
            ["id"]
        );
        assert_eq!(split.target_train.name(), "label");

        let labels = table.column("label").expect("label column");
        for (k, &row) in split.train_indices.iter().enumerate() {
            assert_eq!(split.target_train.get(k), labels.get(row));
        }
        for (k, &row) in split.test_indices.iter().enumerate() {
            assert_eq!(split.target_test.get(k), labels.get(row));
        }
        Ok(())
    }

    #[test]
    fn same_seed_same_split() -> Result<(), anyhow::Error> {
        let labels = (0..50)
            .map(|i| ["a", "b", "c"][i % 3])
            .collect::<Vec<_>>();
        let table = labelled_table(&labels);

        for stratify in [false, true] {
            let options = SplitOptions::new().seed(7).stratify(stratify);
            let first = split_table(&table, "label", &options)?;
            let second = split_table(&table, "label", &options)?;
            assert_eq!(first, second);

            let other = split_table(&table, "label", &options.seed(8))?;
            assert_ne!(first.test_indices, other.test_indices);
        }
        Ok(())
    }

    #[test]
    fn stratified_split_keeps_proportions() -> Result<(), anyhow::Error> {
        let labels = (0..60)
            .map(|i| match i % 6 {
                0..=2 => "a",
                3 | 4 => "b",
                _ => "c",
            })
            .collect::<Vec<_>>();
        let table = labelled_table(&labels);

        for seed in 0..20 {
            for &fraction in &[0.1, 0.25, 0.3, 0.5, 0.77] {
                let options = SplitOptions::new().test_fraction(fraction).seed(seed);
                let split = split_table(&table, "label", &options)?;
                assert_partition(&split, 60);

                let test_len = split.test_indices.len() as f64;
                let test_counts = counts(&split.target_test);
                for (label, total) in counts(table.column("label").expect("label column")) {
                    let expected = test_len * total as f64 / 60.0;
                    let actual = test_counts.get(&label).copied().unwrap_or(0) as f64;
                    assert!(
                        (actual - expected).abs() <= 1.0,
                        "label={} fraction={} seed={} actual={} expected={}",
                        label,
                        fraction,
                        seed,
                        actual,
                        expected
                    );
                }
            }
        }
        Ok(())
    }

    #[test]
    fn balanced_binary_target_of_ten_rows() -> Result<(), anyhow::Error> {
        let table = labelled_table(&["0", "1", "0", "1", "0", "1", "0", "1", "0", "1"]);
        let options = SplitOptions::new().test_fraction(0.3).stratify(true);
        let split = split_table(&table, "label", &options)?;

        assert_eq!(split.features_train.rows_len(), 7);
        assert_eq!(split.features_test.rows_len(), 3);
        assert_partition(&split, 10);

        let train = counts(&split.target_train);
        let test = counts(&split.target_test);
        for label in ["0", "1"] {
            let n_train = train.get(label).copied().unwrap_or(0) as f64;
            let n_test = test.get(label).copied().unwrap_or(0) as f64;
            assert!((n_train - 3.5).abs() <= 1.0);
            assert!((n_test - 1.5).abs() <= 1.0);
        }
        Ok(())
    }

    #[test]
    fn numeric_and_missing_targets_can_be_stratified() -> Result<(), anyhow::Error> {
        let target = vec![
            Value::Float(1.5),
            Value::Missing,
            Value::Float(1.5),
            Value::Missing,
            Value::Float(2.0),
            Value::Float(2.0),
            Value::Float(1.5),
            Value::Missing,
        ];
        let ids = (0..8).map(Value::Integer).collect();
        let table = Table::new(vec![Column::new("id", ids), Column::new("y", target)])?;

        let split = split_table(&table, "y", &SplitOptions::new().test_fraction(0.4))?;
        assert_partition(&split, 8);
        let test = counts(&split.target_test);
        assert_eq!(test.values().sum::<usize>(), 4);
        assert_eq!(test.len(), 3);
        Ok(())
    }

    #[test]
    fn missing_target_column_lists_available_columns() {
        let table = labelled_table(&["a", "b", "a", "b"]);
        let e = split_table(&table, "selling_price", &SplitOptions::new())
            .expect_err("no such column");
        assert_eq!(
            e,
            SplitError::MissingTargetColumn {
                column: "selling_price".into(),
                available: vec!["id".into(), "label".into()],
            }
        );
        let message = e.to_string();
        assert!(message.contains("selling_price"));
        assert!(message.contains("\"id\""));
        assert!(message.contains("\"label\""));
    }

    #[test]
    fn singleton_classes_cannot_be_stratified() -> Result<(), anyhow::Error> {
        let table = labelled_table(&["a", "a", "b", "b", "c", "a", "b"]);
        let e = split_table(&table, "label", &SplitOptions::new()).expect_err("singleton");
        assert_eq!(
            e,
            SplitError::SingletonClass {
                class: "\"c\"".into(),
                count: 1,
            }
        );

        // Without stratification the same table splits fine.
        let split = split_table(&table, "label", &SplitOptions::new().stratify(false))?;
        assert_partition(&split, 7);
        Ok(())
    }

    #[test]
    fn partitions_must_hold_every_class() {
        let table = labelled_table(&["a", "a", "b", "b", "c", "c"]);
        let e = split_table(&table, "label", &SplitOptions::new()).expect_err("too small");
        assert_eq!(
            e,
            SplitError::TooFewRowsForClasses {
                partition: Partition::Test,
                rows: 2,
                classes: 3,
            }
        );

        let e = split_table(&table, "label", &SplitOptions::new().test_fraction(0.8))
            .expect_err("too small");
        assert!(matches!(
            e,
            SplitError::TooFewRowsForClasses {
                partition: Partition::Train,
                ..
            }
        ));
    }

    #[test]
    fn invalid_fractions_are_rejected() {
        let table = labelled_table(&["a", "b", "a", "b"]);
        for &fraction in &[0.0, 1.0, -0.1, 1.5, f64::NAN] {
            let options = SplitOptions::new().test_fraction(fraction);
            assert!(matches!(
                split_table(&table, "label", &options),
                Err(SplitError::InvalidTestFraction { .. })
            ));
        }
    }

    #[test]
    fn tiny_tables_leave_a_partition_empty() {
        let options = SplitOptions::new().stratify(false);
        assert!(matches!(
            split_table(&labelled_table(&["a"]), "label", &options),
            Err(SplitError::EmptyPartition { rows: 1, .. })
        ));
        assert!(matches!(
            split_table(&labelled_table(&[]), "label", &options),
            Err(SplitError::EmptyPartition { rows: 0, .. })
        ));
    }

    #[test]
    fn test_rows_rounds_up() {
        assert_eq!(test_rows(10, 0.3), 3);
        assert_eq!(test_rows(10, 0.25), 3);
        assert_eq!(test_rows(3, 0.1), 1);
        assert_eq!(test_rows(100, 0.7), 70);
        assert_eq!(test_rows(10, 5e-11), 1);
        assert_eq!(test_rows(1000, 1e-9), 1);
    }
}
